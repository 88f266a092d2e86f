//! walldump - build a small demo map and print how every wall is divided.
//!
//! USAGE:
//! ```bash
//! cargo run --bin walldump -- [--no-divisions] [--no-smoothing] [-vv]
//! ```

use anyhow::Context;
use clap::Parser;
use log::{LevelFilter, debug, info};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use walledge_rs::engine::{WallEdgeArena, WallEdgeConfig};
use walledge_rs::renderer::{WallPolygon, WallSinkExt, WallVertex};
use walledge_rs::world::{HEdgeId, Map, MapBuilder, Material, SideDef};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Never split walls at neighbouring plane heights
    #[arg(long)]
    no_divisions: bool,

    /// Use the flat side normal at every edge
    #[arg(long)]
    no_smoothing: bool,

    /// Keep sections sandwiched between sky planes
    #[arg(long)]
    no_sky_clip: bool,

    /// Clip masked middles at sky ceilings like any other middle
    #[arg(long)]
    no_masked_extension: bool,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Opts {
    fn config(&self) -> WallEdgeConfig {
        WallEdgeConfig {
            edge_divisions: !self.no_divisions,
            normal_smoothing: !self.no_smoothing,
            sky_clip: !self.no_sky_clip,
            extend_masked_middle: !self.no_masked_extension,
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    TermLogger::init(
        opts.log_level(),
        ConfigBuilder::default().build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let map = demo_map().context("building demo map")?;
    info!(
        "map {}: {} lines, {} half-edges",
        map.name,
        map.lines.len(),
        map.mesh.hedges.len()
    );

    let config = opts.config();
    let mut arena = WallEdgeArena::with_capacity(map.mesh.hedges.len() * 2);
    let mut walls: Vec<WallPolygon> = Vec::new();
    let hedges = 0..map.mesh.hedges.len() as HEdgeId;
    let drawn = walls.draw_walls(&map, &mut arena, &config, hedges)?;

    for wall in &walls {
        print_wall(&map, wall);
    }
    println!("{drawn} wall polygons");
    Ok(())
}

fn print_wall(map: &Map, wall: &WallPolygon) {
    let line = map
        .mesh
        .hedge(wall.hedge)
        .segment
        .map_or_else(|| "-".to_string(), |s| format!("line {} side {}", s.line, s.side));
    let heights = |vs: &[WallVertex]| {
        vs.iter()
            .map(|v| format!("{:.1}", v.pos.z))
            .collect::<Vec<_>>()
            .join(" ")
    };

    println!(
        "hedge {:3}  {:16} {:<6} {}  left [{}]  right [{}]",
        wall.hedge,
        line,
        format!("{:?}", wall.section),
        if wall.opaque { "opaque" } else { "masked" },
        heights(&wall.left),
        heights(&wall.right),
    );
    debug!(
        "hedge {}: normals {:?} / {:?}",
        wall.hedge, wall.normals[0], wall.normals[1]
    );
}

/// A hall with a raised alcove to the west and an open-sky yard to the north.
///
/// ```text
///   v6 ───────────────────────────── v7        y = 256
///    │            yard                │
///   v5 ──────────── v1 ──────────── v2        y = 128
///    │    alcove     │      hall      │
///   v4 ──────────── v0 ──────────── v3        y = 0
/// ```
fn demo_map() -> anyhow::Result<Map> {
    let mut b = MapBuilder::new("DEMO");
    let brick = b.material(Material::solid("BRICK", 64.0, 128.0))?;
    let grate = b.material(Material::masked("MIDGRATE", 64.0, 128.0))?;
    let sky = b.material(Material::sky("F_SKY1"))?;

    let hall = b.sector(0.0, 128.0);
    let alcove = b.sector(24.0, 96.0);
    let yard = b.sector(0.0, 192.0);
    // A walkway running across the yard.
    b.extra_plane(yard, 72.0);
    let yard_sky = b.ceiling_of(yard);
    b.plane_mut(yard_sky).surface.material = Some(sky);

    let ss_hall = b.subsector(hall);
    let ss_alcove = b.subsector(alcove);
    let ss_yard = b.subsector(yard);

    let v0 = b.vertex(0.0, 0.0);
    let v1 = b.vertex(0.0, 128.0);
    let v2 = b.vertex(128.0, 128.0);
    let v3 = b.vertex(128.0, 0.0);
    let v4 = b.vertex(-128.0, 0.0);
    let v5 = b.vertex(-128.0, 128.0);
    let v6 = b.vertex(-128.0, 256.0);
    let v7 = b.vertex(128.0, 256.0);

    let wall = |sector| SideDef::new(sector).middle(brick).bottom(brick).top(brick);

    b.line(v0, v1, wall(hall), Some(wall(alcove)));
    b.line(
        v1,
        v2,
        SideDef::new(hall).middle(grate).top(brick),
        Some(wall(yard)),
    );
    b.line(v2, v3, wall(hall), None);
    b.line(v3, v0, wall(hall), None);
    b.line(v0, v4, wall(alcove), None);
    b.line(v4, v5, wall(alcove), None);
    b.line(v5, v1, wall(alcove), Some(wall(yard)));
    b.line(v5, v6, wall(yard), None);
    b.line(v6, v7, wall(yard), None);
    b.line(v7, v2, wall(yard), None);

    b.face(Some(ss_hall), &[v0, v1, v2, v3]);
    b.face(Some(ss_alcove), &[v1, v0, v4, v5]);
    b.face(Some(ss_yard), &[v5, v6, v7, v2, v1]);

    Ok(b.build()?)
}

//! Wall geometry consumer.
//!
//! *The engine never emits triangles itself.*
//! [`build_wall`] turns the two edges of a wall section into a
//! [`WallPolygon`]: one vertex per intercept on each edge, so a wall that a
//! neighbouring plane splits on one side only still shares every vertex
//! with the walls around it. Polygons are handed to a type that implements
//! [`WallSink`].
//!
//! * Any back-end (a GL batcher, a debug dumper, a test `Vec`) can be
//!   plugged in without touching the engine.
//! * The blanket-impl [`WallSinkExt`] adds `draw_walls` so call-sites stay
//!   short.

use glam::{DVec3, Vec2, Vec3};

use crate::engine::{
    EdgeSide, SectionId, WallEdge, WallEdgeArena, WallEdgeConfig, WallEdgeError, WallEdgeKey,
    WallSpecFlags,
};
use crate::world::{HEdgeId, Map};

/// One corner of a wall polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallVertex {
    pub pos: DVec3,
    /// Material-space coordinates, map units.
    pub uv: Vec2,
}

/// A divided wall quad.
///
/// `left` runs up the near edge and `right` up the far edge, bottom to top;
/// the two lists may differ in length.
#[derive(Clone, Debug, PartialEq)]
pub struct WallPolygon {
    pub hedge: HEdgeId,
    pub section: SectionId,
    pub opaque: bool,
    pub left: Vec<WallVertex>,
    pub right: Vec<WallVertex>,
    /// Smoothed normals at the left and right edge.
    pub normals: [Vec3; 2],
}

impl WallPolygon {
    /// Consecutive vertex pairs up each edge, left edge first.
    pub fn strips(&self) -> impl Iterator<Item = (EdgeSide, [WallVertex; 2])> + '_ {
        let left = self.left.windows(2).map(|w| (EdgeSide::Near, [w[0], w[1]]));
        let right = self.right.windows(2).map(|w| (EdgeSide::Far, [w[0], w[1]]));
        left.chain(right)
    }

    /// Number of vertices on both edges.
    pub fn vertex_count(&self) -> usize {
        self.left.len() + self.right.len()
    }
}

/// Something that consumes finished wall polygons.
pub trait WallSink {
    fn begin_frame(&mut self) {}

    fn draw_wall(&mut self, wall: &WallPolygon);

    fn end_frame(&mut self) {}
}

impl WallSink for Vec<WallPolygon> {
    fn draw_wall(&mut self, wall: &WallPolygon) {
        self.push(wall.clone());
    }
}

/// Convenience blanket-impl with a one-liner `draw_walls` driver.
pub trait WallSinkExt: WallSink {
    /// Draw every section of every wall half-edge in `hedges`.
    ///
    /// Half-edges that do not lie on a line are skipped. All edges acquired
    /// from `arena` are released before returning. Returns the number of
    /// polygons drawn.
    fn draw_walls<I>(
        &mut self,
        map: &Map,
        arena: &mut WallEdgeArena,
        config: &WallEdgeConfig,
        hedges: I,
    ) -> Result<usize, WallEdgeError>
    where
        I: IntoIterator<Item = HEdgeId>,
    {
        self.begin_frame();
        let result = draw_sections(self, map, arena, config, hedges);
        arena.end_frame();
        self.end_frame();
        result
    }
}
impl<T: WallSink + ?Sized> WallSinkExt for T {}

fn draw_sections<S, I>(
    sink: &mut S,
    map: &Map,
    arena: &mut WallEdgeArena,
    config: &WallEdgeConfig,
    hedges: I,
) -> Result<usize, WallEdgeError>
where
    S: WallSink + ?Sized,
    I: IntoIterator<Item = HEdgeId>,
{
    let mut drawn = 0;
    for hedge in hedges {
        if map.mesh.hedge(hedge).segment.is_none() {
            continue;
        }
        let edges = acquire_wall(map, arena, config, hedge)?;
        for section in SectionId::ALL {
            if let Some(wall) = build_wall(map, arena, edges, section)? {
                sink.draw_wall(&wall);
                drawn += 1;
            }
        }
    }
    Ok(drawn)
}

/// Acquire both edges of the wall on `hedge`, near edge first.
pub fn acquire_wall(
    map: &Map,
    arena: &mut WallEdgeArena,
    config: &WallEdgeConfig,
    hedge: HEdgeId,
) -> Result<[WallEdgeKey; 2], WallEdgeError> {
    let near = arena.acquire(map, config, hedge, EdgeSide::Near)?;
    let far = arena.acquire(map, config, hedge, EdgeSide::Far)?;
    Ok([near, far])
}

/// Build the polygon for one section of a wall from its two edges.
///
/// `Ok(None)` when either edge of the section is degenerate.
pub fn build_wall(
    map: &Map,
    arena: &mut WallEdgeArena,
    [near, far]: [WallEdgeKey; 2],
    section: SectionId,
) -> Result<Option<WallPolygon>, WallEdgeError> {
    let hedge = arena
        .get(near)
        .map(WallEdge::hedge)
        .ok_or(WallEdgeError::StaleHandle)?;

    let Some((left, left_normal)) = edge_vertices(map, arena, near, section)? else {
        return Ok(None);
    };
    let Some((right, right_normal)) = edge_vertices(map, arena, far, section)? else {
        return Ok(None);
    };

    let spec = *arena.section(map, near, section)?.spec();
    let opaque =
        spec.is_flagged(WallSpecFlags::FORCE_OPAQUE) || surface_is_opaque(map, hedge, section);

    Ok(Some(WallPolygon {
        hedge,
        section,
        opaque,
        left,
        right,
        normals: [left_normal, right_normal],
    }))
}

/// Vertices up one edge, one per intercept. `None` for a degenerate section.
fn edge_vertices(
    map: &Map,
    arena: &mut WallEdgeArena,
    key: WallEdgeKey,
    section: SectionId,
) -> Result<Option<(Vec<WallVertex>, Vec3)>, WallEdgeError> {
    let mut sec = arena.section(map, key, section)?;
    if !sec.is_valid() {
        return Ok(None);
    }
    let span = sec.prepare();
    let normal = sec.normal();
    let verts = sec
        .intercepts()?
        .iter()
        .map(|e| {
            let pos = span.origin_at(e.distance());
            WallVertex {
                pos,
                uv: Vec2::new(
                    span.material_origin.x,
                    span.material_origin.y + (span.hi - pos.z) as f32,
                ),
            }
        })
        .collect();
    Ok(Some((verts, normal)))
}

fn surface_is_opaque(map: &Map, hedge: HEdgeId, section: SectionId) -> bool {
    let Some(seg) = map.mesh.hedge(hedge).segment else {
        return false;
    };
    map.line_side(seg.line, seg.side)
        .surface(section)
        .material
        .and_then(|id| map.materials.material(id).ok())
        .is_some_and(|m| m.opaque)
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_maps::{self, Heights};

    fn rooms() -> test_maps::Rooms {
        test_maps::two_rooms(Heights {
            north_ceiling: 96.0,
            ..Default::default()
        })
    }

    fn front_wall(m: &test_maps::Rooms, section: SectionId) -> Option<WallPolygon> {
        let mut arena = WallEdgeArena::new();
        let edges = acquire_wall(&m.map, &mut arena, &WallEdgeConfig::default(), m.front_hedge).unwrap();
        build_wall(&m.map, &mut arena, edges, section).unwrap()
    }

    #[test]
    fn divided_edge_gets_extra_vertex() {
        let m = rooms();
        let wall = front_wall(&m, SectionId::Top).unwrap();

        assert!(wall.opaque);
        let zs = |v: &[WallVertex]| v.iter().map(|v| v.pos.z).collect::<Vec<_>>();
        assert_eq!(zs(&wall.left), vec![64.0, 128.0]);
        assert_eq!(zs(&wall.right), vec![64.0, 96.0, 128.0]);
        assert_eq!(wall.strips().count(), 3);
        assert_eq!(wall.vertex_count(), 5);
    }

    #[test]
    fn texture_coordinates_follow_the_material_origin() {
        let m = rooms();
        let wall = front_wall(&m, SectionId::Top).unwrap();

        // Pegged to the back ceiling, 64 units below the front one.
        assert_eq!(wall.left[0].uv, Vec2::new(0.0, 0.0));
        assert_eq!(wall.left[1].uv, Vec2::new(0.0, -64.0));
        assert_eq!(wall.right[1].uv, Vec2::new(128.0, -32.0));
    }

    #[test]
    fn degenerate_sections_build_nothing() {
        let m = rooms();
        let wall = front_wall(&m, SectionId::Bottom);
        assert!(wall.is_none());
    }

    #[test]
    fn open_middles_are_translucent() {
        let m = rooms();
        let wall = front_wall(&m, SectionId::Middle).unwrap();
        assert!(!wall.opaque);
        // Never divided.
        assert_eq!(wall.vertex_count(), 4);
    }

    #[test]
    fn draw_walls_covers_the_whole_map() {
        let m = test_maps::two_rooms(Heights::default());
        let mut arena = WallEdgeArena::new();
        let mut sink: Vec<WallPolygon> = Vec::new();
        let hedges = 0..m.map.mesh.hedges.len() as HEdgeId;

        let drawn = sink
            .draw_walls(&m.map, &mut arena, &WallEdgeConfig::default(), hedges)
            .unwrap();

        // 7 one-sided middles, 6 two-sided middles, 2 tops.
        assert_eq!(drawn, 15);
        assert_eq!(sink.len(), drawn);
        assert_eq!(sink.iter().filter(|w| w.section == SectionId::Top).count(), 2);
        assert!(arena.is_empty());
    }

    #[test]
    fn each_half_edge_acquires_one_pair_of_edges() {
        let m = test_maps::two_rooms(Heights::default());
        let mut arena = WallEdgeArena::new();
        let mut sink: Vec<WallPolygon> = Vec::new();

        let drawn = draw_sections(
            &mut sink,
            &m.map,
            &mut arena,
            &WallEdgeConfig::default(),
            [m.front_hedge],
        )
        .unwrap();

        // Middle and top; the floors are level.
        assert_eq!(drawn, 2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn released_edges_cannot_build_walls() {
        let m = rooms();
        let mut arena = WallEdgeArena::new();
        let edges = acquire_wall(&m.map, &mut arena, &WallEdgeConfig::default(), m.front_hedge).unwrap();
        arena.end_frame();
        assert_eq!(
            build_wall(&m.map, &mut arena, edges, SectionId::Top),
            Err(WallEdgeError::StaleHandle)
        );
    }
}

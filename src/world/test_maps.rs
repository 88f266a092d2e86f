//! Small hand-built maps shared by the unit tests.
//!
//! ```text
//!   v5 ──────────── v1 ──────────── v2        y = 128
//!    │     back      │     front     │
//!    │   (sector B)  │   (sector A)  │
//!   v4 ──────────── v0 ──────────── v3        y = 0
//!  x=-128           x=0            x=128
//! ```
//!
//! A third sector C sits north of both rooms (y = 128 … 256) so that the
//! shared line's top vertex `v1` is surrounded by three subsectors.

use super::{
    BACK, HEdgeId, LineId, Map, MapBuilder, SectorId, SideDef, SubsectorId, VertexId,
};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Heights {
    pub front_floor: f64,
    pub front_ceiling: f64,
    pub back_floor: f64,
    pub back_ceiling: f64,
    pub north_floor: f64,
    pub north_ceiling: f64,
}

impl Default for Heights {
    fn default() -> Self {
        Heights {
            front_floor: 0.0,
            front_ceiling: 128.0,
            back_floor: 0.0,
            back_ceiling: 64.0,
            north_floor: 0.0,
            north_ceiling: 128.0,
        }
    }
}

/// Ids a fixture customiser may want to touch before the map is built.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RoomIds {
    pub front_sector: SectorId,
    pub back_sector: SectorId,
    pub north_sector: SectorId,
    pub front_subsector: SubsectorId,
    pub back_subsector: SubsectorId,
    pub north_subsector: SubsectorId,
    pub shared_line: LineId,
}

pub(crate) struct Rooms {
    pub map: Map,
    pub shared_line: LineId,
    /// `v0 → v1`, front side of the shared line.
    pub front_hedge: HEdgeId,
    /// `v1 → v0`, back side of the shared line.
    pub back_hedge: HEdgeId,
    /// `v2 → v3`, a one-sided wall of the front room.
    pub outer_hedge: HEdgeId,
    pub front_subsector: SubsectorId,
    pub back_subsector: SubsectorId,
    pub north_subsector: SubsectorId,
}

pub(crate) fn two_rooms(h: Heights) -> Rooms {
    two_rooms_with(h, |_, _| {})
}

pub(crate) fn two_rooms_with<F>(h: Heights, customise: F) -> Rooms
where
    F: FnOnce(&mut MapBuilder, &RoomIds),
{
    let mut b = MapBuilder::new("ROOMS");

    let a = b.sector(h.front_floor, h.front_ceiling);
    let bk = b.sector(h.back_floor, h.back_ceiling);
    let c = b.sector(h.north_floor, h.north_ceiling);
    let ss_a = b.subsector(a);
    let ss_b = b.subsector(bk);
    let ss_c = b.subsector(c);

    let v0 = b.vertex(0.0, 0.0);
    let v1 = b.vertex(0.0, 128.0);
    let v2 = b.vertex(128.0, 128.0);
    let v3 = b.vertex(128.0, 0.0);
    let v4 = b.vertex(-128.0, 0.0);
    let v5 = b.vertex(-128.0, 128.0);
    let v6 = b.vertex(-128.0, 256.0);
    let v7 = b.vertex(128.0, 256.0);

    let shared = b.line(v0, v1, SideDef::new(a), Some(SideDef::new(bk)));
    // front room
    b.line(v1, v2, SideDef::new(a), Some(SideDef::new(c)));
    b.line(v2, v3, SideDef::new(a), None);
    b.line(v3, v0, SideDef::new(a), None);
    // back room
    b.line(v0, v4, SideDef::new(bk), None);
    b.line(v4, v5, SideDef::new(bk), None);
    b.line(v5, v1, SideDef::new(bk), Some(SideDef::new(c)));
    // north room
    b.line(v5, v6, SideDef::new(c), None);
    b.line(v6, v7, SideDef::new(c), None);
    b.line(v7, v2, SideDef::new(c), None);

    b.face(Some(ss_a), &[v0, v1, v2, v3]);
    b.face(Some(ss_b), &[v1, v0, v4, v5]);
    b.face(Some(ss_c), &[v5, v6, v7, v2, v1]);

    let ids = RoomIds {
        front_sector: a,
        back_sector: bk,
        north_sector: c,
        front_subsector: ss_a,
        back_subsector: ss_b,
        north_subsector: ss_c,
        shared_line: shared,
    };
    customise(&mut b, &ids);

    let map = b.build().expect("fixture map builds");
    let find = |from: VertexId, to: VertexId| {
        map.mesh
            .hedge_between(from, to)
            .expect("fixture half-edge exists")
    };
    Rooms {
        front_hedge: find(v0, v1),
        back_hedge: find(v1, v0),
        outer_hedge: find(v2, v3),
        shared_line: shared,
        front_subsector: ss_a,
        back_subsector: ss_b,
        north_subsector: ss_c,
        map,
    }
}

/// Make the shared line reference the front sector on both sides.
pub(crate) fn make_self_referencing(b: &mut MapBuilder, ids: &RoomIds) {
    b.line_side_mut(ids.shared_line, BACK).sector = Some(ids.front_sector);
}

pub(crate) struct SingleRoom {
    pub map: Map,
    /// `v0 → v1`, a one-sided wall.
    pub wall: HEdgeId,
}

/// A lone square room with no neighbours at all.
pub(crate) fn single_room(floor: f64, ceiling: f64) -> SingleRoom {
    let mut b = MapBuilder::new("ROOM");
    let s = b.sector(floor, ceiling);
    let ss = b.subsector(s);
    let v = [
        b.vertex(0.0, 0.0),
        b.vertex(0.0, 256.0),
        b.vertex(256.0, 256.0),
        b.vertex(256.0, 0.0),
    ];
    for i in 0..4 {
        b.line(v[i], v[(i + 1) % 4], SideDef::new(s), None);
    }
    b.face(Some(ss), &v);
    let map = b.build().expect("fixture map builds");
    let wall = map.mesh.hedge_between(v[0], v[1]).expect("fixture half-edge exists");
    SingleRoom { map, wall }
}

pub(crate) struct BentWall {
    pub map: Map,
    pub sector: SectorId,
    /// `p0 → p1`, heading north.
    pub first: LineId,
    /// `p1 → p2`, bending ~18° to the east.
    pub second: LineId,
    pub corner: VertexId,
    pub first_hedge: HEdgeId,
}

/// One sector whose west wall bends slightly at `p1`.
pub(crate) fn bent_wall() -> BentWall {
    let mut b = MapBuilder::new("BENT");
    let s = b.sector(0.0, 128.0);
    let ss = b.subsector(s);
    let p = [
        b.vertex(0.0, 0.0),
        b.vertex(0.0, 128.0),
        b.vertex(32.0, 224.0),
        b.vertex(160.0, 224.0),
        b.vertex(160.0, 0.0),
    ];
    let lines: Vec<LineId> = (0..p.len())
        .map(|i| b.line(p[i], p[(i + 1) % p.len()], SideDef::new(s), None))
        .collect();
    b.face(Some(ss), &p);
    let map = b.build().expect("fixture map builds");
    let first_hedge = map.mesh.hedge_between(p[0], p[1]).expect("fixture half-edge exists");
    BentWall {
        map,
        sector: s,
        first: lines[0],
        second: lines[1],
        corner: p[1],
        first_hedge,
    }
}

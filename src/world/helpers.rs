use std::f64::consts::TAU;

use glam::DVec2;

use super::geometry::{Line, LineId, LineSide, Map, Plane, PlaneId, Sector, SectorId, SideFlags, Subsector, SubsectorId, Surface, VertexId};
use super::mesh::{ClockDirection, HEdgeId};

// ──────────────────────────────────────────────────────────────────────────
//                       Map – element access
// ──────────────────────────────────────────────────────────────────────────
impl Map {
    #[inline]
    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id as usize]
    }

    #[inline]
    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id as usize]
    }

    #[inline]
    pub fn plane(&self, id: PlaneId) -> &Plane {
        &self.planes[id as usize]
    }

    #[inline]
    pub fn subsector(&self, id: SubsectorId) -> &Subsector {
        &self.subsectors[id as usize]
    }

    #[inline]
    pub fn vertex_pos(&self, id: VertexId) -> DVec2 {
        self.vertices[id as usize].pos
    }

    pub fn has_sky_masked_material(&self, surface: &Surface) -> bool {
        surface
            .material
            .and_then(|m| self.materials.material(m).ok())
            .is_some_and(|m| m.sky_masked)
    }

    pub fn plane_is_sky_masked(&self, id: PlaneId) -> bool {
        self.has_sky_masked_material(&self.plane(id).surface)
    }

    pub fn floor_height(&self, sector: SectorId) -> f64 {
        self.plane(self.sector(sector).floor()).height
    }

    pub fn ceiling_height(&self, sector: SectorId) -> f64 {
        self.plane(self.sector(sector).ceiling()).height
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Subsector – visual planes
// ──────────────────────────────────────────────────────────────────────────
impl Map {
    pub fn vis_floor(&self, id: SubsectorId) -> &Plane {
        self.plane(self.subsector(id).vis_floor)
    }

    pub fn vis_ceiling(&self, id: SubsectorId) -> &Plane {
        self.plane(self.subsector(id).vis_ceiling)
    }

    /// Floor, ceiling, then the sector's extra planes.
    pub fn vis_plane_count(&self, id: SubsectorId) -> usize {
        self.sector(self.subsector(id).sector).planes.len()
    }

    pub fn vis_plane(&self, id: SubsectorId, index: usize) -> &Plane {
        let ss = self.subsector(id);
        match index {
            0 => self.plane(ss.vis_floor),
            1 => self.plane(ss.vis_ceiling),
            _ => self.plane(self.sector(ss.sector).planes[index]),
        }
    }

    /// A subsector whose visual floor is not below its visual ceiling has no volume.
    pub fn has_world_volume(&self, id: SubsectorId) -> bool {
        self.vis_ceiling(id).height - self.vis_floor(id).height > 0.0
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Line sides – openness
// ──────────────────────────────────────────────────────────────────────────
impl Map {
    pub fn line_side(&self, line: LineId, side: usize) -> &LineSide {
        &self.line(line).sides[side]
    }

    /// Should the side be drawn as a solid, one-sided wall?
    ///
    /// `hedge` is the half-edge the side is being drawn for; a missing back
    /// face means the subspace behind it was degenerate.
    pub fn consider_one_sided(&self, line: LineId, side: usize, hedge: Option<HEdgeId>) -> bool {
        let ld = self.line(line);
        let this = &ld.sides[side];
        let back = &ld.sides[side ^ 1];

        if this.is_flagged(SideFlags::SUPPRESS_BACK_SECTOR) {
            return true;
        }
        if !back.has_sector() || !back.has_sections() {
            return true;
        }
        if !ld.defines_polyobj() {
            let Some(twin) = hedge.and_then(|h| self.mesh.hedge(h).twin) else {
                return true;
            };
            let Some(face) = self.mesh.hedge(twin).face else {
                return true;
            };
            if self.mesh.face(face).subsector.is_none() {
                return true;
            }
        }
        false
    }

    /// Is the opening behind this side fully closed off (no gap to see through)?
    pub fn side_back_closed(&self, line: LineId, side: usize) -> bool {
        let ld = self.line(line);
        let (Some(front), Some(back)) = (ld.sides[side].sector, ld.sides[side ^ 1].sector) else {
            return true;
        };
        if !ld.sides[side ^ 1].has_sections() {
            return true;
        }
        if front == back {
            return false;
        }
        let (ffloor, fceil) = (self.floor_height(front), self.ceiling_height(front));
        let (bfloor, bceil) = (self.floor_height(back), self.ceiling_height(back));
        bfloor >= fceil || bceil <= ffloor || bceil <= bfloor
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Vertex owner rings
// ──────────────────────────────────────────────────────────────────────────

/// Angle of `d`, wrapped to `[0, 2π)`.
#[inline]
pub(crate) fn direction_angle(d: DVec2) -> f64 {
    d.y.atan2(d.x).rem_euclid(TAU)
}

impl Map {
    /// Search the lines around `vertex` for the first neighbour of `line`
    /// (in `direction`) that also bounds `sector`.
    ///
    /// Returns the neighbour and the angle swept to reach it.
    pub fn find_line_neighbor(
        &self,
        sector: SectorId,
        line: LineId,
        vertex: VertexId,
        direction: ClockDirection,
    ) -> Option<(LineId, f64)> {
        self.walk_vertex_owners(line, vertex, direction, |other| {
            if other.back_sector().is_none() || !other.is_self_referencing() {
                if other.front_sector() == Some(sector) || other.back_sector() == Some(sector) {
                    return true;
                }
            }
            false
        })
    }

    /// Like [`Map::find_line_neighbor`] but only accepts lines that present
    /// a solid face to `sector` (one-sided, or with a closed opening).
    pub fn find_solid_line_neighbor(
        &self,
        sector: SectorId,
        line: LineId,
        vertex: VertexId,
        direction: ClockDirection,
    ) -> Option<(LineId, f64)> {
        let floor = self.floor_height(sector);
        let ceil = self.ceiling_height(sector);
        self.walk_vertex_owners(line, vertex, direction, |other| {
            if other.is_self_referencing() {
                return false;
            }
            let (Some(front), Some(back)) = (other.front_sector(), other.back_sector()) else {
                return true;
            };
            self.floor_height(front) >= ceil
                || self.ceiling_height(front) <= floor
                || self.floor_height(back) >= ceil
                || self.ceiling_height(back) <= floor
                || self.ceiling_height(back) <= self.floor_height(back)
        })
    }

    fn walk_vertex_owners<F>(
        &self,
        line: LineId,
        vertex: VertexId,
        direction: ClockDirection,
        mut suitable: F,
    ) -> Option<(LineId, f64)>
    where
        F: FnMut(&Line) -> bool,
    {
        let ring = self.vertex_owners.get(vertex as usize)?;
        let n = ring.len();
        let start = ring.iter().position(|o| o.line == line)?;

        let mut idx = start;
        let mut diff = 0.0;
        for _ in 1..n {
            let next = match direction {
                ClockDirection::Anticlockwise => (idx + 1) % n,
                ClockDirection::Clockwise => (idx + n - 1) % n,
            };
            diff += match direction {
                ClockDirection::Anticlockwise => (ring[next].angle - ring[idx].angle).rem_euclid(TAU),
                ClockDirection::Clockwise => (ring[idx].angle - ring[next].angle).rem_euclid(TAU),
            };
            idx = next;

            let other = ring[idx].line;
            if other == line {
                return None;
            }
            if suitable(self.line(other)) {
                return Some((other, diff));
            }
        }
        None
    }
}

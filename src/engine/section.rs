//! One drawable section of a wall edge.
//!
//! A section resolves lazily through three states:
//!
//! 1. `Uninitialized`: nothing computed yet.
//! 2. `SpanResolved`: the vertical span and material origin are known.
//! 3. `EventsPopulated`: the intercept set holds the sentinels plus every
//!    neighbouring plane height that splits the span.
//!
//! Each transition happens at most once per edge lifetime.

use std::f64::consts::PI;

use glam::{DVec2, DVec3, Vec2, Vec3};
use log::trace;

use crate::engine::arena::WallEdgeKey;
use crate::engine::error::WallEdgeError;
use crate::engine::hplane::{InterceptSet, Partition, fequal};
use crate::engine::intercepts::add_neighbor_intercepts;
use crate::engine::types::EdgeSide;
use crate::engine::wall_spec::{WallSpec, WallSpecFlags};
use crate::world::{
    Coord, HEdgeId, LineFlags, LineSideSegment, Map, Plane, SideFlags, SubsectorId,
};

pub use crate::world::SectionId;

/// Smallest interior angle at which two walls still blend their normals.
const SMOOTH_MIN_ANGLE: f64 = 135.0 * PI / 180.0;

impl TryFrom<i32> for SectionId {
    type Error = WallEdgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SectionId::Middle),
            1 => Ok(SectionId::Bottom),
            2 => Ok(SectionId::Top),
            other => Err(WallEdgeError::UnknownSection(other)),
        }
    }
}

/// Identifies one section of one live wall edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub edge: WallEdgeKey,
    pub section: SectionId,
}

impl SectionKey {
    /// Key of a section not owned by any edge.
    pub(crate) fn detached(section: SectionId) -> Self {
        SectionKey {
            edge: WallEdgeKey::DETACHED,
            section,
        }
    }
}

/// The resolved vertical extent of a section and where it sits in the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub lo: Coord,
    pub hi: Coord,
    pub material_origin: Vec2,
    /// `(edge x, edge y, lo)`.
    pub p_origin: DVec3,
    /// `(0, 0, hi - lo)`.
    pub p_direction: DVec3,
}

impl Span {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.hi > self.lo
    }

    /// Map-space point at normalised `distance` up the span.
    #[inline]
    pub fn origin_at(&self, distance: f64) -> DVec3 {
        self.p_origin + self.p_direction * distance
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SectionState {
    Uninitialized,
    SpanResolved(Span),
    EventsPopulated(Span),
}

#[derive(Clone, Debug)]
pub struct WallSection {
    key: SectionKey,
    spec: WallSpec,
    hedge: HEdgeId,
    side: EdgeSide,
    state: SectionState,
    normal: Option<Vec3>,
    intercepts: InterceptSet,
}

impl WallSection {
    pub(crate) fn new(section: SectionId) -> Self {
        WallSection {
            key: SectionKey::detached(section),
            spec: WallSpec::new(section),
            hedge: 0,
            side: EdgeSide::Near,
            state: SectionState::Uninitialized,
            normal: None,
            intercepts: InterceptSet::new(),
        }
    }

    pub(crate) fn init(&mut self, key: SectionKey, spec: WallSpec, hedge: HEdgeId, side: EdgeSide) {
        self.key = key;
        self.spec = spec;
        self.hedge = hedge;
        self.side = side;
        self.deinit();
    }

    /// Forget everything resolved so far; the intercept storage is kept.
    pub(crate) fn deinit(&mut self) {
        self.state = SectionState::Uninitialized;
        self.normal = None;
        self.intercepts.clear_intercepts();
    }

    #[inline]
    pub fn key(&self) -> SectionKey {
        self.key
    }

    #[inline]
    pub fn spec(&self) -> &WallSpec {
        &self.spec
    }

    #[inline]
    pub fn hedge(&self) -> HEdgeId {
        self.hedge
    }

    #[inline]
    pub fn side(&self) -> EdgeSide {
        self.side
    }

    /// Resolve the span if that has not happened yet.
    pub fn prepare(&mut self, map: &Map) -> Span {
        match self.state {
            SectionState::SpanResolved(span) | SectionState::EventsPopulated(span) => span,
            SectionState::Uninitialized => {
                let span = resolve_span(map, self.hedge, self.side, &self.spec);
                trace!(
                    "hedge {} {:?} {:?}: span [{}, {}]",
                    self.hedge, self.side, self.spec.section, span.lo, span.hi
                );
                self.state = SectionState::SpanResolved(span);
                span
            }
        }
    }

    pub fn normal(&mut self, map: &Map) -> Vec3 {
        let (hedge, side, spec) = (self.hedge, self.side, self.spec);
        *self
            .normal
            .get_or_insert_with(|| resolve_normal(map, hedge, side, &spec))
    }

    /// Build the sorted intercept list on first use.
    ///
    /// Fails with [`WallEdgeError::InvalidGeometry`] for a degenerate span.
    pub fn prepare_events(&mut self, map: &Map) -> Result<&InterceptSet, WallEdgeError> {
        let span = self.prepare(map);
        if !span.is_valid() {
            return Err(WallEdgeError::InvalidGeometry(self.spec.section));
        }

        if let SectionState::SpanResolved(span) = self.state {
            let set = &mut self.intercepts;
            set.clear_intercepts();
            set.push_sorted(self.key, 0.0);

            if !self.spec.is_flagged(WallSpecFlags::NO_EDGE_DIVISIONS) && !fequal(span.hi, span.lo) {
                set.configure(Partition::new(
                    DVec2::new(0.0, span.lo),
                    DVec2::new(0.0, span.hi - span.lo),
                ));
                if !map.mesh.is_internal_edge(self.hedge) {
                    add_neighbor_intercepts(map, self.hedge, self.side, span.lo, span.hi, set, self.key);
                }
            }

            set.sort_intercepts();
            set.push_sorted(self.key, 1.0);
            set.assert_intercepts_in_range(0.0, 1.0);

            trace!(
                "hedge {} {:?} {:?}: {} intercepts",
                self.hedge,
                self.side,
                self.spec.section,
                set.intercept_count()
            );
            self.state = SectionState::EventsPopulated(span);
        }
        Ok(&self.intercepts)
    }
}

/*----------------------------- resolvers -----------------------------*/

/// Map-space position of the edge (the half-edge origin or destination).
pub(crate) fn edge_origin(map: &Map, hedge: HEdgeId, side: EdgeSide) -> DVec2 {
    let vertex = match side {
        EdgeSide::Near => map.mesh.hedge(hedge).origin,
        EdgeSide::Far => map.mesh.destination(hedge),
    };
    map.vertex_pos(vertex)
}

pub(crate) fn resolve_span(map: &Map, hedge: HEdgeId, side: EdgeSide, spec: &WallSpec) -> Span {
    let (lo, hi, mut material_origin) = match map.mesh.hedge(hedge).segment {
        Some(seg) => section_heights(map, hedge, &seg, spec),
        None => (0.0, 0.0, Vec2::ZERO),
    };

    if let Some(seg) = map.mesh.hedge(hedge).segment {
        material_origin.x += seg.line_side_offset as f32;
        if side == EdgeSide::Far {
            material_origin.x += seg.length as f32;
        }
    }

    let origin = edge_origin(map, hedge, side);
    Span {
        lo,
        hi,
        material_origin,
        p_origin: DVec3::new(origin.x, origin.y, lo),
        p_direction: DVec3::new(0.0, 0.0, hi - lo),
    }
}

/// Vertical extent and material origin of one section, before edge offsets.
fn section_heights(
    map: &Map,
    hedge: HEdgeId,
    seg: &LineSideSegment,
    spec: &WallSpec,
) -> (Coord, Coord, Vec2) {
    let line = map.line(seg.line);
    let line_side = &line.sides[seg.side];
    let unpeg_top = line.is_flagged(LineFlags::DONT_PEG_TOP);
    let unpeg_bottom = line.is_flagged(LineFlags::DONT_PEG_BOTTOM);

    let Some(front) = line.polyobj.or_else(|| map.mesh.subsector_of(hedge)) else {
        return (0.0, 0.0, Vec2::ZERO);
    };

    if map.consider_one_sided(seg.line, seg.side, Some(hedge)) {
        let ffloor = map.vis_floor(front).height;
        let (lo, hi) = match spec.section {
            SectionId::Middle => (ffloor, map.vis_ceiling(front).height),
            SectionId::Bottom | SectionId::Top => (ffloor, ffloor),
        };
        let mut origin = line_side.middle().material_origin;
        if unpeg_bottom {
            origin.y -= (hi - lo) as f32;
        }
        return (lo, hi, origin);
    }

    let back = if line.defines_polyobj() {
        Some(front)
    } else {
        map.mesh
            .hedge(hedge)
            .twin
            .and_then(|twin| map.mesh.subsector_of(twin))
    };
    let Some(back) = back else {
        return (0.0, 0.0, Vec2::ZERO);
    };

    let ffloor = map.vis_floor(front);
    let fceil = map.vis_ceiling(front);
    let bfloor = map.vis_floor(back);
    let bceil = map.vis_ceiling(back);
    let sky = |p: &Plane| map.has_sky_masked_material(&p.surface);
    let sky_clip = spec.is_flagged(WallSpecFlags::SKY_CLIP);
    let self_ref = line.is_self_referencing();

    match spec.section {
        SectionId::Top => {
            if self_ref {
                return (0.0, 0.0, Vec2::ZERO);
            }
            let lo = ffloor.height.max(bceil.height);
            let mut hi = fceil.height;
            if sky_clip && sky(fceil) && sky(bceil) {
                hi = lo;
            }
            let mut origin = line_side.middle().material_origin;
            if !unpeg_top {
                // Peg to the back ceiling.
                origin.y -= (fceil.height - bceil.height) as f32;
            }
            (lo, hi, origin)
        }
        SectionId::Bottom => {
            if self_ref {
                return (0.0, 0.0, Vec2::ZERO);
            }
            let raise_to_back_floor = sky(fceil)
                && sky(bceil)
                && fceil.height < bceil.height
                && bfloor.height > fceil.height;

            let mut t = bfloor.height;
            if bfloor.height > bceil.height {
                t = bceil.height;
            }
            if t > fceil.height && !raise_to_back_floor {
                t = fceil.height;
            }
            let hi = t;
            let mut lo = ffloor.height;
            if sky_clip && sky(ffloor) && sky(bfloor) {
                lo = hi;
            }

            let mut origin = line_side.bottom().material_origin;
            if bfloor.height > fceil.height {
                let top = if raise_to_back_floor { t } else { fceil.height };
                origin.y -= (top - bfloor.height) as f32;
            }
            if unpeg_bottom {
                origin.y += (fceil.height - bfloor.height) as f32;
            }
            (lo, hi, origin)
        }
        SectionId::Middle => {
            middle_heights(map, front, seg, spec, (ffloor, fceil, bfloor, bceil), unpeg_bottom)
        }
    }
}

type Opening<'a> = (
    &'a Plane,
    &'a Plane,
    &'a Plane,
    &'a Plane,
);

/// Two-sided middle: the opening between both sides, then clipped to the
/// material unless it is stretched.
fn middle_heights(
    map: &Map,
    front: SubsectorId,
    seg: &LineSideSegment,
    spec: &WallSpec,
    (ffloor, fceil, bfloor, bceil): Opening<'_>,
    unpeg_bottom: bool,
) -> (Coord, Coord, Vec2) {
    let line = map.line(seg.line);
    let line_side = &line.sides[seg.side];
    let self_ref = line.is_self_referencing();
    let sky = |p: &Plane| map.has_sky_masked_material(&p.surface);

    let ss = map.subsector(front);
    let cluster_sector = map.sector(ss.sector);
    let side_sector = line_side.sector.unwrap_or(ss.sector);

    let mut lo = if !self_ref && ss.vis_floor == cluster_sector.floor() {
        bfloor.height.max(ffloor.height)
    } else {
        map.floor_height(side_sector)
    };
    let mut hi = if !self_ref && ss.vis_ceiling == cluster_sector.ceiling() {
        bceil.height.min(fceil.height)
    } else {
        map.ceiling_height(side_sector)
    };

    let middle = line_side.middle();
    let mut origin = Vec2::new(middle.material_origin.x, 0.0);

    let material = middle
        .material
        .and_then(|id| map.materials.material(id).ok());
    let Some(material) = material else {
        return (lo, hi, origin);
    };
    if line_side.is_flagged(SideFlags::MIDDLE_STRETCH) {
        return (lo, hi, origin);
    }

    let (open_bottom, open_top) = if self_ref {
        (ffloor.height, fceil.height)
    } else {
        (lo, hi)
    };
    let mat_height = Coord::from(material.height);
    let offset_y = Coord::from(middle.material_origin.y);

    if open_top > open_bottom {
        if unpeg_bottom {
            lo += offset_y;
            hi = lo + mat_height;
        } else {
            hi += offset_y;
            lo = hi - mat_height;
        }

        let sky_clip = spec.is_flagged(WallSpecFlags::SKY_CLIP);
        let clip_top = !(sky_clip && sky(fceil) && sky(bceil));
        let clip_bottom = !(sky_clip && sky(ffloor) && sky(bfloor));

        if clip_top && hi > open_top {
            origin.y = (hi - open_top) as f32;
            hi = open_top;
        }
        if clip_bottom && lo < open_bottom {
            lo = open_bottom;
        }

        // Masked middles may reach up into a sky-masked ceiling (Icarus).
        if spec.is_flagged(WallSpecFlags::EXTEND_MASKED_MIDDLE)
            && !material.opaque
            && !line_side.top().has_material()
            && map.plane_is_sky_masked(map.sector(side_sector).ceiling())
            && mat_height + offset_y > hi - lo
        {
            hi = lo + mat_height + offset_y;
        }
    }

    (lo, hi, origin)
}

/// Edge normal: the section surface's normal, blended with the neighbouring
/// wall's when the two meet at a shallow enough angle.
pub(crate) fn resolve_normal(map: &Map, hedge: HEdgeId, side: EdgeSide, spec: &WallSpec) -> Vec3 {
    let Some(seg) = map.mesh.hedge(hedge).segment else {
        return Vec3::ZERO;
    };
    let line = map.line(seg.line);
    let line_side = &line.sides[seg.side];
    let normal = line_side.surface(spec.section).normal;

    if spec.is_flagged(WallSpecFlags::NO_EDGE_NORMAL_SMOOTHING) {
        return normal;
    }
    let Some(sector) = line_side.sector else {
        return normal;
    };

    // Only the ends of the line meet other lines.
    let line_vertex = line.vertex(seg.side ^ side.index());
    let edge_vertex = match side {
        EdgeSide::Near => map.mesh.hedge(hedge).origin,
        EdgeSide::Far => map.mesh.destination(hedge),
    };
    if edge_vertex != line_vertex {
        return normal;
    }

    let direction = side.smoothing_direction();
    let neighbor = if map.side_back_closed(seg.line, seg.side) {
        map.find_solid_line_neighbor(sector, seg.line, line_vertex, direction)
    } else {
        map.find_line_neighbor(sector, seg.line, line_vertex, direction)
    };
    let Some((other, diff)) = neighbor else {
        return normal;
    };
    if !(diff > SMOOTH_MIN_ANGLE && diff <= PI + f64::EPSILON) {
        return normal;
    }

    let other = map.line(other);
    let other_side = if other.back_sector() == Some(sector) && other.front_sector() != Some(sector) {
        other.back()
    } else {
        other.front()
    };
    let blended = (normal + other_side.surface(spec.section).normal).normalize_or_zero();
    if blended == Vec3::ZERO { normal } else { blended }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/

//! Wall edges: the vertical edge of a wall at one end of a half-edge.
//!
//! An edge owns one [`WallSection`] per line-side section. Sections are
//! resolved on demand through a [`WallSectionRef`], which pairs the section
//! with the map it is measured against.

use glam::{DVec2, DVec3, Vec2, Vec3};

use crate::engine::arena::WallEdgeKey;
use crate::engine::error::WallEdgeError;
use crate::engine::hplane::Intercept;
use crate::engine::section::{SectionId, SectionKey, Span, WallSection, edge_origin};
use crate::engine::types::{EdgeSide, WallEdgeConfig};
use crate::engine::wall_spec::WallSpec;
use crate::world::{Coord, HEdgeId, Map};

#[derive(Clone, Debug)]
pub struct WallEdge {
    key: WallEdgeKey,
    hedge: HEdgeId,
    side: EdgeSide,
    sections: [WallSection; 3],
}

impl WallEdge {
    pub(crate) fn new() -> Self {
        WallEdge {
            key: WallEdgeKey::DETACHED,
            hedge: 0,
            side: EdgeSide::Near,
            sections: SectionId::ALL.map(WallSection::new),
        }
    }

    /// Bind the edge to `hedge`; everything is resolved lazily afterwards.
    pub(crate) fn init(
        &mut self,
        key: WallEdgeKey,
        map: &Map,
        config: &WallEdgeConfig,
        hedge: HEdgeId,
        side: EdgeSide,
    ) -> Result<(), WallEdgeError> {
        let on_line = map
            .mesh
            .hedges
            .get(hedge as usize)
            .is_some_and(|he| he.segment.is_some());
        if !on_line {
            return Err(WallEdgeError::NotAWall(hedge));
        }

        self.key = key;
        self.hedge = hedge;
        self.side = side;
        for (id, section) in SectionId::ALL.into_iter().zip(self.sections.iter_mut()) {
            let spec = WallSpec::from_map_side(map, hedge, id, config);
            section.init(SectionKey { edge: key, section: id }, spec, hedge, side);
        }
        Ok(())
    }

    pub(crate) fn deinit(&mut self) {
        self.key = WallEdgeKey::DETACHED;
        for section in &mut self.sections {
            section.deinit();
        }
    }

    #[inline]
    pub fn key(&self) -> WallEdgeKey {
        self.key
    }

    #[inline]
    pub fn hedge(&self) -> HEdgeId {
        self.hedge
    }

    #[inline]
    pub fn side(&self) -> EdgeSide {
        self.side
    }

    /// Map-space xy of the edge.
    pub fn origin(&self, map: &Map) -> DVec2 {
        edge_origin(map, self.hedge, self.side)
    }

    pub fn section<'a>(&'a mut self, map: &'a Map, id: SectionId) -> WallSectionRef<'a> {
        WallSectionRef {
            map,
            section: &mut self.sections[id.index()],
        }
    }

    /// Like [`WallEdge::section`], for raw section numbers.
    pub fn section_at<'a>(
        &'a mut self,
        map: &'a Map,
        id: i32,
    ) -> Result<WallSectionRef<'a>, WallEdgeError> {
        let id = SectionId::try_from(id)?;
        Ok(self.section(map, id))
    }
}

/// One section of a wall edge, ready to be queried.
///
/// Span queries resolve the geometry on first use; intercept queries also
/// build the intercept list. Both happen once per edge lifetime.
pub struct WallSectionRef<'a> {
    map: &'a Map,
    section: &'a mut WallSection,
}

impl WallSectionRef<'_> {
    #[inline]
    pub fn id(&self) -> SectionId {
        self.section.spec().section
    }

    #[inline]
    pub fn key(&self) -> SectionKey {
        self.section.key()
    }

    #[inline]
    pub fn spec(&self) -> &WallSpec {
        self.section.spec()
    }

    /// Resolve (if needed) and return the span.
    pub fn prepare(&mut self) -> Span {
        self.section.prepare(self.map)
    }

    pub fn is_valid(&mut self) -> bool {
        self.prepare().is_valid()
    }

    pub fn verify_valid(&mut self) -> Result<(), WallEdgeError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(WallEdgeError::InvalidGeometry(self.id()))
        }
    }

    pub fn lo(&mut self) -> Coord {
        self.prepare().lo
    }

    pub fn hi(&mut self) -> Coord {
        self.prepare().hi
    }

    /// Map-space xy of the edge this section stands on.
    pub fn origin(&self) -> DVec2 {
        edge_origin(self.map, self.section.hedge(), self.section.side())
    }

    pub fn p_origin(&mut self) -> DVec3 {
        self.prepare().p_origin
    }

    pub fn p_direction(&mut self) -> DVec3 {
        self.prepare().p_direction
    }

    pub fn material_origin(&mut self) -> Vec2 {
        self.prepare().material_origin
    }

    pub fn normal(&mut self) -> Vec3 {
        self.section.normal(self.map)
    }

    /// All intercepts in ascending order, both sentinels included.
    pub fn intercepts(&mut self) -> Result<&[Intercept], WallEdgeError> {
        Ok(self.section.prepare_events(self.map)?.as_slice())
    }

    /// Intercept count including the sentinels; 0 for an invalid section.
    pub fn intercept_count(&mut self) -> usize {
        self.intercepts().map_or(0, <[Intercept]>::len)
    }

    /// Intercepts strictly between the sentinels.
    pub fn division_count(&mut self) -> usize {
        self.intercept_count().saturating_sub(2)
    }

    /// Index of the lowest division, if there is one.
    pub fn first_division(&mut self) -> Option<usize> {
        (self.division_count() > 0).then_some(1)
    }

    /// Index of the highest division, if there is one.
    pub fn last_division(&mut self) -> Option<usize> {
        let count = self.division_count();
        (count > 0).then_some(count)
    }

    pub fn at(&mut self, index: usize) -> Result<Intercept, WallEdgeError> {
        self.section.prepare_events(self.map)?.at(index).copied()
    }

    /// The bottom sentinel.
    pub fn first(&self) -> Intercept {
        Intercept::new(self.key(), 0.0)
    }

    /// The top sentinel.
    pub fn last(&self) -> Intercept {
        Intercept::new(self.key(), 1.0)
    }

    /// Map-space point at normalised `distance` up the section.
    pub fn origin_at(&mut self, distance: f64) -> DVec3 {
        self.prepare().origin_at(distance)
    }

    /// Map-space point of an intercept belonging to this section.
    pub fn intercept_origin(&mut self, intercept: &Intercept) -> Option<DVec3> {
        (intercept.owner() == self.key()).then(|| self.origin_at(intercept.distance()))
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/

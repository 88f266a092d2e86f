//! Half-edge mesh of the map's convex subspaces.
//!
//! * Every face is one convex subspace (BSP leaf), wound **clockwise**,
//!   so the face lies on the right of each of its half-edges.
//! * `next`/`prev` walk a face ring; `twin` crosses to the neighbouring face.
//! * Half-edges lying on a map line carry a [`LineSideSegment`].

use crate::world::geometry::{Coord, LineId, SubsectorId, VertexId};

pub type HEdgeId = u32;
pub type FaceId = u32;

/// Rotation sense used by the circulators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockDirection {
    Clockwise,
    Anticlockwise,
}

impl ClockDirection {
    pub fn reverse(self) -> Self {
        match self {
            ClockDirection::Clockwise => ClockDirection::Anticlockwise,
            ClockDirection::Anticlockwise => ClockDirection::Clockwise,
        }
    }
}

/// The part of a line side covered by one half-edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSideSegment {
    pub line: LineId,
    /// 0 = front, 1 = back.
    pub side: usize,
    /// Distance from the side's start vertex to the half-edge origin.
    pub line_side_offset: Coord,
    pub length: Coord,
}

#[derive(Clone, Debug)]
pub struct HEdge {
    pub origin: VertexId,
    pub twin: Option<HEdgeId>,
    pub next: HEdgeId,
    pub prev: HEdgeId,
    pub face: Option<FaceId>,
    pub segment: Option<LineSideSegment>,
}

#[derive(Clone, Debug)]
pub struct Face {
    /// Any half-edge of the ring.
    pub hedge: HEdgeId,
    /// `None` for degenerate subspaces that never got a subsector.
    pub subsector: Option<SubsectorId>,
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub hedges: Vec<HEdge>,
    pub faces: Vec<Face>,
}

impl Mesh {
    #[inline]
    pub fn hedge(&self, id: HEdgeId) -> &HEdge {
        &self.hedges[id as usize]
    }

    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id as usize]
    }

    /// Vertex the half-edge points at.
    pub fn destination(&self, id: HEdgeId) -> VertexId {
        let he = self.hedge(id);
        match he.twin {
            Some(twin) => self.hedge(twin).origin,
            None => self.hedge(he.next).origin,
        }
    }

    /// The face half-edge running from `from` to `to`, if any.
    pub fn hedge_between(&self, from: VertexId, to: VertexId) -> Option<HEdgeId> {
        (0..self.hedges.len() as HEdgeId).find(|&id| {
            let he = self.hedge(id);
            he.face.is_some() && he.origin == from && self.destination(id) == to
        })
    }

    /// Next (clockwise) or previous (anticlockwise) half-edge of the face ring.
    #[inline]
    pub fn neighbor(&self, id: HEdgeId, direction: ClockDirection) -> HEdgeId {
        let he = self.hedge(id);
        match direction {
            ClockDirection::Clockwise => he.next,
            ClockDirection::Anticlockwise => he.prev,
        }
    }

    pub fn subsector_of(&self, id: HEdgeId) -> Option<SubsectorId> {
        self.hedge(id)
            .face
            .and_then(|f| self.face(f).subsector)
    }

    /// Both sides of the half-edge belong to the same subsector.
    pub fn is_internal_edge(&self, id: HEdgeId) -> bool {
        let Some(twin) = self.hedge(id).twin else {
            return false;
        };
        match (self.subsector_of(id), self.subsector_of(twin)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Circulate from `id` to the next half-edge lying across a subsector
    /// boundary, rotating about the shared vertex in `direction`.
    ///
    /// Interior edges of the starting subsector are hopped over. The result
    /// is the *back* half-edge of the boundary edge found, i.e. it belongs to
    /// the neighbouring subsector. `None` when the walk leaves the map.
    pub fn find_back_neighbor(&self, id: HEdgeId, direction: ClockDirection) -> Option<HEdgeId> {
        let subsector = self.subsector_of(id);
        let mut neighbor = self.neighbor(id, direction);
        // A ring can hop across at most every half-edge once.
        for _ in 0..self.hedges.len() {
            let twin = self.hedge(neighbor).twin?;
            if subsector.is_none() || self.subsector_of(twin) != subsector {
                return Some(twin);
            }
            neighbor = self.neighbor(twin, direction);
        }
        log::warn!("half-edge {id}: back-neighbour search did not terminate");
        None
    }
}

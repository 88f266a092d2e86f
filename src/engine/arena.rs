//! Per-frame storage for wall edges.
//!
//! Edges are acquired while walls are being drawn and handed back either
//! one at a time or all at once at the end of the frame. Released edges are
//! kept on a spare list so their intercept storage is reused next frame.
//!
//! Handles carry a generation, so a handle kept past `release`/`end_frame`
//! is detected instead of silently aliasing a recycled edge.

use glam::DVec3;
use log::debug;
use slab::Slab;

use crate::engine::error::WallEdgeError;
use crate::engine::hplane::Intercept;
use crate::engine::section::SectionId;
use crate::engine::types::{EdgeSide, WallEdgeConfig};
use crate::engine::walledge::{WallEdge, WallSectionRef};
use crate::world::{HEdgeId, Map};

/// Handle of a live [`WallEdge`] in a [`WallEdgeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WallEdgeKey {
    index: u32,
    generation: u32,
}

impl WallEdgeKey {
    /// Never issued by an arena.
    pub const DETACHED: WallEdgeKey = WallEdgeKey {
        index: u32::MAX,
        generation: 0,
    };
}

#[derive(Debug)]
pub struct WallEdgeArena {
    live: Slab<WallEdge>,
    spare: Vec<WallEdge>,
    generation: u32,
}

impl Default for WallEdgeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl WallEdgeArena {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        WallEdgeArena {
            live: Slab::with_capacity(capacity),
            spare: Vec::new(),
            generation: 0,
        }
    }

    /// Create an edge at one end of `hedge`.
    ///
    /// Fails with [`WallEdgeError::NotAWall`] if the half-edge does not lie
    /// on a map line.
    pub fn acquire(
        &mut self,
        map: &Map,
        config: &WallEdgeConfig,
        hedge: HEdgeId,
        side: EdgeSide,
    ) -> Result<WallEdgeKey, WallEdgeError> {
        let mut edge = self.spare.pop().unwrap_or_else(WallEdge::new);

        // Generation 0 is reserved for DETACHED.
        self.generation = self.generation.wrapping_add(1).max(1);
        let entry = self.live.vacant_entry();
        let key = WallEdgeKey {
            index: entry.key() as u32,
            generation: self.generation,
        };

        if let Err(err) = edge.init(key, map, config, hedge, side) {
            self.spare.push(edge);
            return Err(err);
        }
        entry.insert(edge);
        Ok(key)
    }

    pub fn get(&self, key: WallEdgeKey) -> Option<&WallEdge> {
        self.live
            .get(key.index as usize)
            .filter(|edge| edge.key() == key)
    }

    pub fn get_mut(&mut self, key: WallEdgeKey) -> Option<&mut WallEdge> {
        self.live
            .get_mut(key.index as usize)
            .filter(|edge| edge.key() == key)
    }

    pub fn contains(&self, key: WallEdgeKey) -> bool {
        self.get(key).is_some()
    }

    /// Shorthand for `get_mut(key)?.section(map, id)`.
    pub fn section<'a>(
        &'a mut self,
        map: &'a Map,
        key: WallEdgeKey,
        id: SectionId,
    ) -> Result<WallSectionRef<'a>, WallEdgeError> {
        let edge = self.get_mut(key).ok_or(WallEdgeError::StaleHandle)?;
        Ok(edge.section(map, id))
    }

    /// Return an edge to the pool. `false` if the handle was already stale.
    pub fn release(&mut self, key: WallEdgeKey) -> bool {
        if !self.contains(key) {
            return false;
        }
        let mut edge = self.live.remove(key.index as usize);
        edge.deinit();
        self.spare.push(edge);
        true
    }

    /// Release every live edge.
    pub fn end_frame(&mut self) {
        if !self.live.is_empty() {
            debug!("recycling {} wall edges", self.live.len());
        }
        for mut edge in self.live.drain() {
            edge.deinit();
            self.spare.push(edge);
        }
    }

    /// Number of live edges.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Map-space point of any live intercept, looked up through its owner.
    ///
    /// `None` if the owning edge has been released.
    pub fn intercept_origin(&mut self, map: &Map, intercept: &Intercept) -> Option<DVec3> {
        let owner = intercept.owner();
        let edge = self.get_mut(owner.edge)?;
        edge.section(map, owner.section).intercept_origin(intercept)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/

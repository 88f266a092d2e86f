use thiserror::Error;

use crate::engine::section::SectionId;
use crate::world::HEdgeId;

/// Things that can go wrong when querying wall edges.
///
/// Only `InvalidGeometry` is expected in normal rendering (the caller is
/// supposed to test `is_valid()` first); the rest indicate misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WallEdgeError {
    /// The section's span is degenerate (`hi <= lo`).
    #[error("{0:?} wall section has no height")]
    InvalidGeometry(SectionId),

    #[error("intercept index {index} invalid, valid range: [0..{count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("unknown wall section id {0}")]
    UnknownSection(i32),

    /// The half-edge is not attributed to any line side.
    #[error("half-edge {0} does not lie on a map line")]
    NotAWall(HEdgeId),

    /// The handle refers to an edge that has since been recycled.
    #[error("stale wall edge handle")]
    StaleHandle,
}

//! Wall edge partitioning.
//!
//! For every end of a wall half-edge the engine works out, per section
//! (middle, bottom, top), the vertical span to draw and the heights at
//! which neighbouring planes split it. Renderers walk those splits to emit
//! crack-free wall geometry.

mod arena;
mod error;
mod hplane;
mod intercepts;
mod section;
mod types;
mod wall_spec;
mod walledge;

pub use arena::{WallEdgeArena, WallEdgeKey};
pub use error::WallEdgeError;
pub use hplane::{
    DISTANCE_EPSILON, Intercept, InterceptSet, MAX_INTERCEPTS, Partition, fequal,
};
pub use section::{SectionKey, Span, WallSection};
pub use types::{EdgeSide, WallEdgeConfig};
pub use wall_spec::{WallSpec, WallSpecFlags};
pub use walledge::{WallEdge, WallSectionRef};

pub use crate::world::SectionId;

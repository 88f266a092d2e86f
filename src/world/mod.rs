mod builder;
mod geometry;
mod helpers;
mod material;
mod mesh;

#[cfg(test)]
pub(crate) mod test_maps;

pub use geometry::{
    BACK, Coord, FRONT, Line, LineFlags, LineId, LineOwner, LineSide, Map, Plane, PlaneId, SectionId,
    Sector, SectorId, SideFlags, SideSections, Subsector, SubsectorId, Surface, Vertex, VertexId,
};

pub use builder::{BuildError, MapBuilder, SideDef};

pub use material::{Material, MaterialBank, MaterialError, MaterialId};

pub use mesh::{ClockDirection, Face, FaceId, HEdge, HEdgeId, LineSideSegment, Mesh};

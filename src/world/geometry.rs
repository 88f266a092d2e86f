use bitflags::bitflags;
use glam::{DVec2, Vec2, Vec3};

use crate::world::material::{MaterialBank, MaterialId};
use crate::world::mesh::Mesh;

/// Map-space coordinate / height.
pub type Coord = f64;

pub type VertexId = u32;
pub type LineId = u32;
pub type SectorId = u32;
pub type PlaneId = u32;
pub type SubsectorId = u32;

/// Runtime snapshot of one map (immutable while walls are being prepared).
#[derive(Debug)]
pub struct Map {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub lines: Vec<Line>,
    pub sectors: Vec<Sector>,
    pub planes: Vec<Plane>,
    pub subsectors: Vec<Subsector>,
    pub mesh: Mesh,
    pub materials: MaterialBank,
    /// lookup: vertex → lines meeting there, sorted by angle (filled by the builder)
    pub(crate) vertex_owners: Vec<Vec<LineOwner>>,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub pos: DVec2,
}

/// One line meeting at a vertex.
#[derive(Clone, Copy, Debug)]
pub struct LineOwner {
    pub line: LineId,
    /// Angle of the line's ray out of the vertex, radians in `[0, 2π)`.
    pub angle: f64,
}

/*----------------------------- lines --------------------------------*/

bitflags! {
    /// Values match the vanilla `ML_*` line flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct LineFlags: u16 {
        const BLOCKING        = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const DONT_PEG_TOP    = 0x0008;
        const DONT_PEG_BOTTOM = 0x0010;
        const SECRET          = 0x0020;
        const BLOCK_SOUND     = 0x0040;
        const DONT_DRAW       = 0x0080;
        const MAPPED          = 0x0100;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SideFlags: u8 {
        /// Stretch the middle material over the whole opening instead of clipping it.
        const MIDDLE_STRETCH       = 0x01;
        /// Render as if there were no back sector.
        const SUPPRESS_BACK_SECTOR = 0x02;
    }
}

/// Index of a line side: 0 = front (right), 1 = back (left).
pub const FRONT: usize = 0;
pub const BACK: usize = 1;

#[derive(Clone, Debug)]
pub struct Line {
    pub from: VertexId,
    pub to: VertexId,
    pub flags: LineFlags,
    pub sides: [LineSide; 2],
    /// Subsector hosting the polyobj this line belongs to, if any.
    pub polyobj: Option<SubsectorId>,
}

impl Line {
    #[inline]
    pub fn vertex(&self, i: usize) -> VertexId {
        if i == 0 { self.from } else { self.to }
    }

    #[inline]
    pub fn front(&self) -> &LineSide {
        &self.sides[FRONT]
    }

    #[inline]
    pub fn back(&self) -> &LineSide {
        &self.sides[BACK]
    }

    pub fn front_sector(&self) -> Option<SectorId> {
        self.sides[FRONT].sector
    }

    pub fn back_sector(&self) -> Option<SectorId> {
        self.sides[BACK].sector
    }

    /// Both sides reference the same sector (a level-design trick).
    pub fn is_self_referencing(&self) -> bool {
        match (self.front_sector(), self.back_sector()) {
            (Some(f), Some(b)) => f == b,
            _ => false,
        }
    }

    pub fn defines_polyobj(&self) -> bool {
        self.polyobj.is_some()
    }

    pub fn is_flagged(&self, flags: LineFlags) -> bool {
        self.flags.intersects(flags)
    }
}

/*--------------------------- line sides -----------------------------*/

/// One of the three drawable sections of a line side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionId {
    Middle = 0,
    Bottom = 1,
    Top = 2,
}

impl SectionId {
    pub const ALL: [SectionId; 3] = [SectionId::Middle, SectionId::Bottom, SectionId::Top];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, Default)]
pub struct LineSide {
    pub sector: Option<SectorId>,
    /// `None` when the side has no sidedef (nothing renderable).
    pub sections: Option<SideSections>,
    pub flags: SideFlags,
}

#[derive(Clone, Debug, Default)]
pub struct SideSections {
    pub middle: Surface,
    pub bottom: Surface,
    pub top: Surface,
}

impl LineSide {
    pub fn has_sections(&self) -> bool {
        self.sections.is_some()
    }

    pub fn has_sector(&self) -> bool {
        self.sector.is_some()
    }

    pub fn is_flagged(&self, flags: SideFlags) -> bool {
        self.flags.intersects(flags)
    }

    pub fn middle(&self) -> &Surface {
        self.sections.as_ref().map_or(&Surface::EMPTY, |s| &s.middle)
    }

    pub fn bottom(&self) -> &Surface {
        self.sections.as_ref().map_or(&Surface::EMPTY, |s| &s.bottom)
    }

    pub fn top(&self) -> &Surface {
        self.sections.as_ref().map_or(&Surface::EMPTY, |s| &s.top)
    }

    pub fn surface(&self, section: SectionId) -> &Surface {
        match section {
            SectionId::Middle => self.middle(),
            SectionId::Bottom => self.bottom(),
            SectionId::Top => self.top(),
        }
    }
}

/*---------------------------- surfaces ------------------------------*/

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Surface {
    pub material: Option<MaterialId>,
    /// Smoothed material origin offset, map units.
    pub material_origin: Vec2,
    pub normal: Vec3,
}

impl Surface {
    pub const EMPTY: Surface = Surface {
        material: None,
        material_origin: Vec2::ZERO,
        normal: Vec3::ZERO,
    };

    pub fn has_material(&self) -> bool {
        self.material.is_some()
    }
}

/*------------------------ sectors & planes --------------------------*/

#[derive(Clone, Debug)]
pub struct Sector {
    /// Plane 0 is the floor, plane 1 the ceiling; anything after that is an extra plane.
    pub planes: Vec<PlaneId>,
}

impl Sector {
    #[inline]
    pub fn floor(&self) -> PlaneId {
        self.planes[0]
    }

    #[inline]
    pub fn ceiling(&self) -> PlaneId {
        self.planes[1]
    }
}

#[derive(Clone, Debug)]
pub struct Plane {
    pub sector: SectorId,
    pub index_in_sector: usize,
    /// Smoothed (visual) height.
    pub height: Coord,
    pub surface: Surface,
}

impl Plane {
    pub fn is_sector_floor(&self) -> bool {
        self.index_in_sector == 0
    }

    pub fn is_sector_ceiling(&self) -> bool {
        self.index_in_sector == 1
    }
}

/// A cluster of convex subspaces sharing one sector and one pair of visual planes.
#[derive(Clone, Debug)]
pub struct Subsector {
    pub sector: SectorId,
    pub vis_floor: PlaneId,
    pub vis_ceiling: PlaneId,
}

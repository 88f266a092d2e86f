use bitflags::bitflags;

use crate::engine::WallEdgeConfig;
use crate::engine::section::SectionId;
use crate::world::{HEdgeId, Map};

bitflags! {
    /// How one wall section should be drawn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WallSpecFlags: u8 {
        /// Draw fully opaque regardless of material.
        const FORCE_OPAQUE             = 0x01;
        /// Never split the section at neighbouring plane heights.
        const NO_EDGE_DIVISIONS        = 0x02;
        /// Use the surface normal as-is at the edges.
        const NO_EDGE_NORMAL_SMOOTHING = 0x04;
        /// Collapse sections sandwiched between sky-masked planes.
        const SKY_CLIP                 = 0x08;
        /// Let a masked middle material reach into a sky-masked ceiling.
        const EXTEND_MASKED_MIDDLE     = 0x10;
    }
}

impl Default for WallSpecFlags {
    fn default() -> Self {
        WallSpecFlags::FORCE_OPAQUE | WallSpecFlags::SKY_CLIP
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallSpec {
    pub section: SectionId,
    pub flags: WallSpecFlags,
}

impl WallSpec {
    pub fn new(section: SectionId) -> Self {
        WallSpec {
            section,
            flags: WallSpecFlags::default(),
        }
    }

    pub fn is_flagged(&self, flags: WallSpecFlags) -> bool {
        self.flags.contains(flags)
    }

    /// Spec for `section` of the line side `hedge` lies on.
    ///
    /// Polyobj walls and two-sided middles are drawn blended and undivided.
    pub fn from_map_side(
        map: &Map,
        hedge: HEdgeId,
        section: SectionId,
        config: &WallEdgeConfig,
    ) -> Self {
        let mut spec = WallSpec::new(section);

        let Some(seg) = map.mesh.hedge(hedge).segment else {
            return spec;
        };
        let line = map.line(seg.line);
        let two_sided_middle =
            section == SectionId::Middle && !map.consider_one_sided(seg.line, seg.side, Some(hedge));

        if line.defines_polyobj() || two_sided_middle {
            spec.flags.remove(WallSpecFlags::FORCE_OPAQUE);
            spec.flags.insert(WallSpecFlags::NO_EDGE_DIVISIONS);
        }

        if !config.edge_divisions {
            spec.flags.insert(WallSpecFlags::NO_EDGE_DIVISIONS);
        }
        if !config.normal_smoothing {
            spec.flags.insert(WallSpecFlags::NO_EDGE_NORMAL_SMOOTHING);
        }
        if !config.sky_clip {
            spec.flags.remove(WallSpecFlags::SKY_CLIP);
        }
        if config.extend_masked_middle {
            spec.flags.insert(WallSpecFlags::EXTEND_MASKED_MIDDLE);
        }
        spec
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/

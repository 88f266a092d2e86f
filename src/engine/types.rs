use crate::world::ClockDirection;

/// Which end of a half-edge a wall edge sits at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    /// The half-edge origin (left end, seen from the front).
    Near = 0,
    /// The half-edge destination.
    Far = 1,
}

impl EdgeSide {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rotation used to visit the subsectors around this end's vertex.
    #[inline]
    pub(crate) fn circulation(self) -> ClockDirection {
        match self {
            EdgeSide::Near => ClockDirection::Anticlockwise,
            EdgeSide::Far => ClockDirection::Clockwise,
        }
    }

    /// Rotation used to find the neighbouring line for normal smoothing.
    #[inline]
    pub(crate) fn smoothing_direction(self) -> ClockDirection {
        self.circulation().reverse()
    }
}

/// Renderer-wide switches, fixed for a frame.
///
/// Every field defaults to `true`; turning one off degrades the output in
/// exchange for less work (or reproduces vanilla behaviour).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallEdgeConfig {
    /// Split walls where neighbouring planes cross them.
    pub edge_divisions: bool,
    /// Blend edge normals across shallow corners.
    pub normal_smoothing: bool,
    /// Collapse sections between sky-masked planes.
    pub sky_clip: bool,
    /// Let masked middles reach into a sky ceiling.
    pub extend_masked_middle: bool,
}

impl Default for WallEdgeConfig {
    fn default() -> Self {
        WallEdgeConfig {
            edge_divisions: true,
            normal_smoothing: true,
            sky_clip: true,
            extend_masked_middle: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_circulate_in_opposite_senses() {
        assert_eq!(EdgeSide::Far.circulation(), ClockDirection::Clockwise);
        assert_eq!(EdgeSide::Near.smoothing_direction(), ClockDirection::Clockwise);
        assert_eq!(EdgeSide::Far.smoothing_direction(), ClockDirection::Anticlockwise);
    }
}

//! Collects the plane heights of the subsectors around a wall edge.
//!
//! Starting at the wall's half-edge, the circulator rotates about the edge
//! vertex and visits each neighbouring subsector in turn. Every visual
//! plane strictly inside the still-open window becomes an intercept, and
//! the window narrows as floors and ceilings close it off.

use glam::DVec2;
use log::debug;

use crate::engine::hplane::{InterceptSet, MAX_INTERCEPTS};
use crate::engine::section::SectionKey;
use crate::engine::types::EdgeSide;
use crate::world::{Coord, HEdgeId, Map};

/// Add an intercept for every neighbouring plane height in `(lo, hi)`.
///
/// `set` must already be configured with the `lo → hi` partition.
pub(crate) fn add_neighbor_intercepts(
    map: &Map,
    wall: HEdgeId,
    side: EdgeSide,
    lo: Coord,
    hi: Coord,
    set: &mut InterceptSet,
    owner: SectionKey,
) {
    let direction = side.circulation();
    let partition = *set.partition();
    let distance_to = |z: Coord| partition.distance_to(DVec2::new(0.0, z));

    let mut bottom = lo;
    let mut top = hi;
    let mut hedge = wall;

    for _ in 0..map.mesh.hedges.len() {
        hedge = match map.mesh.find_back_neighbor(hedge, direction) {
            Some(h) => h,
            None => return,
        };
        if hedge == wall {
            return;
        }
        // No back space: nothing further round can be seen.
        let Some(subsector) = map.mesh.subsector_of(hedge) else {
            return;
        };

        if !map.has_world_volume(subsector) {
            // A closed subsector still contributes its ceiling, then blocks.
            let z = map.vis_ceiling(subsector).height;
            if z > bottom && z < top {
                let distance = distance_to(z);
                if !set.have_intercept(distance) {
                    set.intercept(owner, distance);
                }
            }
            return;
        }

        for i in 0..map.vis_plane_count(subsector) {
            let plane = map.vis_plane(subsector, i);
            let z = plane.height;

            if z > bottom && z < top {
                let distance = distance_to(z);
                if !set.have_intercept(distance) {
                    set.intercept(owner, distance);

                    // Leave room for the top sentinel.
                    if set.intercept_count() + 1 >= MAX_INTERCEPTS {
                        debug!("hedge {wall}: intercept cap reached");
                        return;
                    }
                }
            }

            if plane.is_sector_floor() && z > bottom {
                bottom = z;
            } else if plane.is_sector_ceiling() && z < top {
                top = z;
            }
            if bottom >= top {
                return;
            }
        }
    }
    log::warn!("hedge {wall}: neighbour walk did not return to the wall");
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::hplane::Partition;
    use crate::engine::section::SectionId;
    use crate::world::test_maps::{self, Heights};

    fn collect(map: &Map, wall: HEdgeId, side: EdgeSide, lo: Coord, hi: Coord) -> Vec<f64> {
        let owner = SectionKey::detached(SectionId::Top);
        let mut set = InterceptSet::new();
        set.configure(Partition::new(DVec2::new(0.0, lo), DVec2::new(0.0, hi - lo)));
        set.push_sorted(owner, 0.0);
        add_neighbor_intercepts(map, wall, side, lo, hi, &mut set, owner);
        set.sort_intercepts();
        set.as_slice().iter().map(|e| e.distance()).collect()
    }

    #[test]
    fn three_way_vertex_divides_at_the_lower_ceiling() {
        let m = test_maps::two_rooms(Heights {
            north_ceiling: 96.0,
            ..Default::default()
        });
        assert_eq!(collect(&m.map, m.front_hedge, EdgeSide::Far, 64.0, 128.0), vec![0.0, 0.5]);
    }

    #[test]
    fn walk_stops_at_the_map_edge() {
        let m = test_maps::two_rooms(Heights {
            north_ceiling: 96.0,
            ..Default::default()
        });
        // Rotating about v0 runs straight into the one-sided outer wall.
        assert_eq!(collect(&m.map, m.front_hedge, EdgeSide::Near, 64.0, 128.0), vec![0.0]);
    }

    #[test]
    fn heights_on_the_span_bounds_are_ignored() {
        let m = test_maps::two_rooms(Heights::default());
        assert_eq!(collect(&m.map, m.front_hedge, EdgeSide::Far, 64.0, 128.0), vec![0.0]);
    }

    #[test]
    fn intercepts_stop_at_the_cap() {
        let m = test_maps::two_rooms_with(Heights::default(), |b, ids| {
            for k in 1..=100 {
                b.extra_plane(ids.north_sector, 64.0 + 0.5 * f64::from(k));
            }
        });
        let ds = collect(&m.map, m.front_hedge, EdgeSide::Far, 64.0, 128.0);
        // Room is left for the top sentinel.
        assert_eq!(ds.len(), MAX_INTERCEPTS - 1);
        assert!(ds.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn closed_neighbour_contributes_its_ceiling_then_blocks() {
        let m = test_maps::two_rooms(Heights {
            north_floor: 100.0,
            north_ceiling: 100.0,
            back_ceiling: 80.0,
            ..Default::default()
        });
        // The back room's ceiling (80) lies behind the closed north room.
        assert_eq!(
            collect(&m.map, m.front_hedge, EdgeSide::Far, 64.0, 128.0),
            vec![0.0, 36.0 / 64.0]
        );
    }

    #[test]
    fn single_room_has_no_neighbours() {
        let room = test_maps::single_room(0.0, 128.0);
        assert_eq!(collect(&room.map, room.wall, EdgeSide::Far, 0.0, 128.0), vec![0.0]);
        assert_eq!(collect(&room.map, room.wall, EdgeSide::Near, 0.0, 128.0), vec![0.0]);
    }
}

//! Half-plane intercept set.
//!
//! A wall section's vertical span is treated as a partition line; every
//! point where the wall must be split is recorded as an *intercept* at a
//! normalised distance `0.0 ..= 1.0` along that line.
//!
//! * Insertion appends and marks the set unsorted; ordering is restored
//!   lazily by [`InterceptSet::sort_intercepts`].
//! * The set never merges: callers check [`InterceptSet::have_intercept`]
//!   before inserting, which keeps distances unique.
//! * At most [`MAX_INTERCEPTS`] are ever collected for one section, so the
//!   linear lookups stay cheap and storage stays inline.

use glam::DVec2;
use smallvec::SmallVec;

use crate::engine::error::WallEdgeError;
use crate::engine::section::SectionKey;

/// Hard cap on intercepts per section, both sentinels included.
pub const MAX_INTERCEPTS: usize = 64;

/// Two distances closer than this are the same intercept.
pub const DISTANCE_EPSILON: f64 = f64::EPSILON;

#[inline]
pub fn fequal(a: f64, b: f64) -> bool {
    (a - b).abs() < DISTANCE_EPSILON
}

/// Line in 2-D space over which intercept distances are normalised.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Partition {
    pub origin: DVec2,
    pub direction: DVec2,
}

impl Partition {
    pub fn new(origin: DVec2, direction: DVec2) -> Self {
        Partition { origin, direction }
    }

    /// Normalised distance of the projection of `point` onto the line
    /// (0 at `origin`, 1 at `origin + direction`).
    pub fn distance_to(&self, point: DVec2) -> f64 {
        let len2 = self.direction.length_squared();
        if len2 == 0.0 {
            return 0.0;
        }
        (point - self.origin).dot(self.direction) / len2
    }
}

/// One break point on a section's span.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intercept {
    distance: f64,
    owner: SectionKey,
}

impl Intercept {
    pub(crate) fn new(owner: SectionKey, distance: f64) -> Self {
        Intercept { distance, owner }
    }

    /// Normalised distance along the owning section, `0.0 ..= 1.0`.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Handle of the section this intercept was created by.
    #[inline]
    pub fn owner(&self) -> SectionKey {
        self.owner
    }
}

#[derive(Clone, Debug, Default)]
pub struct InterceptSet {
    partition: Partition,
    events: SmallVec<[Intercept; 8]>,
    need_sort: bool,
}

impl InterceptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the partition line.
    pub fn configure(&mut self, partition: Partition) {
        self.partition = partition;
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Append an intercept and return its index (valid until the next
    /// sort or clear).
    pub fn intercept(&mut self, owner: SectionKey, distance: f64) -> usize {
        self.events.push(Intercept::new(owner, distance));
        self.need_sort = true;
        self.events.len() - 1
    }

    /// Append without disturbing the sort state; used for the sentinels,
    /// which are inserted in order.
    pub(crate) fn push_sorted(&mut self, owner: SectionKey, distance: f64) {
        debug_assert!(self.events.last().is_none_or(|e| e.distance <= distance));
        self.events.push(Intercept::new(owner, distance));
    }

    /// Restore ascending order if anything was inserted since the last sort.
    ///
    /// Stable, and does not merge: duplicates are rejected at insertion.
    pub fn sort_intercepts(&mut self) {
        if self.need_sort {
            self.events
                .sort_by(|a, b| a.distance.total_cmp(&b.distance));
            self.need_sort = false;
        }
    }

    pub fn clear_intercepts(&mut self) {
        self.events.clear();
        self.need_sort = false;
    }

    pub fn is_sorted(&self) -> bool {
        !self.need_sort
    }

    #[inline]
    pub fn intercept_count(&self) -> usize {
        self.events.len()
    }

    pub fn at(&self, index: usize) -> Result<&Intercept, WallEdgeError> {
        self.events.get(index).ok_or(WallEdgeError::IndexOutOfRange {
            index,
            count: self.events.len(),
        })
    }

    pub fn as_slice(&self) -> &[Intercept] {
        &self.events
    }

    /// Index of the intercept at `distance` (within [`DISTANCE_EPSILON`]).
    pub fn to_event_index(&self, distance: f64) -> Option<usize> {
        self.events.iter().position(|e| fequal(e.distance, distance))
    }

    #[inline]
    pub fn have_intercept(&self, distance: f64) -> bool {
        self.to_event_index(distance).is_some()
    }

    /// Debug check that every intercept lies within `[lo, hi]`.
    pub fn assert_intercepts_in_range(&self, lo: f64, hi: f64) {
        for e in &self.events {
            debug_assert!(
                e.distance >= lo - DISTANCE_EPSILON && e.distance <= hi + DISTANCE_EPSILON,
                "intercept {} outside [{lo}, {hi}]",
                e.distance
            );
        }
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::section::SectionId;

    fn key() -> SectionKey {
        SectionKey::detached(SectionId::Middle)
    }

    #[test]
    fn sort_restores_ascending_order() {
        let mut set = InterceptSet::new();
        for d in [0.75, 0.25, 0.5, 0.1] {
            set.intercept(key(), d);
        }
        assert!(!set.is_sorted());
        set.sort_intercepts();
        assert!(set.is_sorted());
        let ds: Vec<f64> = set.as_slice().iter().map(Intercept::distance).collect();
        assert_eq!(ds, vec![0.1, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn lookup_uses_tolerance() {
        let mut set = InterceptSet::new();
        set.intercept(key(), 0.5);
        assert!(set.have_intercept(0.5));
        assert!(set.have_intercept(0.5 + f64::EPSILON / 4.0));
        assert!(!set.have_intercept(0.5 + 1e-9));
        assert_eq!(set.to_event_index(0.25), None);
    }

    #[test]
    fn at_is_bounds_checked() {
        let mut set = InterceptSet::new();
        set.intercept(key(), 0.3);
        assert_eq!(set.at(0).unwrap().distance(), 0.3);
        assert_eq!(
            set.at(1).unwrap_err(),
            WallEdgeError::IndexOutOfRange { index: 1, count: 1 }
        );
    }

    #[test]
    fn clear_leaves_empty_sorted_set() {
        let mut set = InterceptSet::new();
        set.intercept(key(), 0.9);
        set.clear_intercepts();
        assert_eq!(set.intercept_count(), 0);
        assert!(set.is_sorted());
    }

    #[test]
    fn partition_normalises_projection() {
        let p = Partition::new(DVec2::new(0.0, 64.0), DVec2::new(0.0, 64.0));
        assert_eq!(p.distance_to(DVec2::new(0.0, 96.0)), 0.5);
        assert_eq!(p.distance_to(DVec2::new(0.0, 128.0)), 1.0);
        let flat = Partition::new(DVec2::ZERO, DVec2::ZERO);
        assert_eq!(flat.distance_to(DVec2::ONE), 0.0);
    }
}

//! Event arena with stable indices and per-frame membership.
//!
//! The store owns the event records, their bounding box, and the spatial
//! index over the currently active events. Values are refreshed in place on
//! every load; the index is rebuilt only when membership changes, never when
//! only values change. The bounding box is computed once from all positions
//! at construction and never changes afterwards.

use fieldvox_data::{Aabb, Event, Vec3};

use crate::index::SpatialIndex;

/// Membership bitset over the event arena.
#[derive(Debug, Clone, Default)]
pub struct ActiveSet {
    words: Vec<u64>,
    len: usize,
    count: usize,
}

impl ActiveSet {
    /// All `len` slots active.
    #[must_use]
    pub fn all(len: usize) -> Self {
        let mut words = vec![u64::MAX; len.div_ceil(64)];
        if len % 64 != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << (len % 64)) - 1;
            }
        }
        Self {
            words,
            len,
            count: len,
        }
    }

    /// All `len` slots inactive.
    #[must_use]
    pub fn none(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
            count: 0,
        }
    }

    #[must_use]
    pub fn contains(&self, i: usize) -> bool {
        i < self.len && self.words[i / 64] & (1 << (i % 64)) != 0
    }

    pub fn set(&mut self, i: usize, active: bool) {
        debug_assert!(i < self.len);
        let word = &mut self.words[i / 64];
        let mask = 1u64 << (i % 64);
        if active && *word & mask == 0 {
            *word |= mask;
            self.count += 1;
        } else if !active && *word & mask != 0 {
            *word &= !mask;
            self.count -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.count = 0;
    }

    /// Number of active slots.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Arena of events with an active set and a spatial index.
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
    active: ActiveSet,
    bbox: Aabb,
    index: SpatialIndex,
    cutoff: f32,
}

impl EventStore {
    /// Builds a store with every event active.
    #[must_use]
    pub fn new(events: Vec<Event>, cutoff: f32) -> Self {
        let active = ActiveSet::all(events.len());
        Self::with_active(events, active, cutoff)
    }

    /// Builds a store with an explicit initial membership.
    #[must_use]
    pub fn with_active(events: Vec<Event>, active: ActiveSet, cutoff: f32) -> Self {
        debug_assert_eq!(events.len(), active.len());
        let bbox = Aabb::from_points(events.iter().map(|e| e.position));
        let index = SpatialIndex::build(&events, &active, &bbox, cutoff);
        Self {
            events,
            active,
            bbox,
            index,
            cutoff,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn event(&self, i: usize) -> &Event {
        &self.events[i]
    }

    /// In-place value refresh; structure and index are untouched.
    pub fn set_value(&mut self, i: usize, value: f32) {
        self.events[i].value = value;
    }

    /// Bulk value refresh by stable index order.
    ///
    /// The slice must match the arena length; sources validate that shape at
    /// construction.
    pub fn set_values(&mut self, values: &[f32]) {
        debug_assert_eq!(values.len(), self.events.len());
        for (ev, &v) in self.events.iter_mut().zip(values) {
            ev.value = v;
        }
    }

    #[must_use]
    pub fn is_active(&self, i: usize) -> bool {
        self.active.contains(i)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.count()
    }

    /// Replaces the active membership and rebuilds the index.
    pub fn retain_active(&mut self, indices: &[usize]) {
        self.active.clear();
        for &i in indices {
            self.active.set(i, true);
        }
        self.rebuild_index();
    }

    /// Bounding box over all event positions, fixed at construction.
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    #[must_use]
    pub fn cutoff_distance(&self) -> f32 {
        self.cutoff
    }

    /// Visits every active event within `radius` of `point` with its squared
    /// distance.
    pub fn within<F: FnMut(u32, f32)>(&self, point: Vec3, radius: f32, visit: F) {
        self.index.within(point, radius, visit);
    }

    fn rebuild_index(&mut self) {
        self.index = SpatialIndex::build(&self.events, &self.active, &self.bbox, self.cutoff);
    }
}

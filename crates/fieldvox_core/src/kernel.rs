//! Contribution kernels and the field functor.
//!
//! A kernel converts an event's value and its distance to a query point into
//! a contribution; the functor sums contributions of all events within the
//! cutoff distance and applies the global magnitude. Every kernel is
//! monotonically non-increasing in distance and negligible at the cutoff by
//! construction of that distance, so truncating the summation there stays
//! inside the configured error bound.

use std::f32::consts::PI;

use fieldvox_data::{Event, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::SamplingConfig;
use crate::event::EventStore;

/// Distances are clamped below this to keep kernels finite at coincident
/// points (world units, micrometers).
pub const MIN_KERNEL_DISTANCE: f32 = 1e-3;

/// The distance-decay law applied per event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KernelKind {
    /// Inverse-square decay: `value / d²`.
    Field,
    /// Line/point current source approximation: `value / (4π·d)`.
    Lfp,
    /// Membership kernel: `value` inside the event radius, zero beyond.
    Density,
    /// Linear decay to zero at the cutoff: `value · (1 − d/cutoff)`.
    Frequency,
}

/// Derives the error-bounded cutoff distance.
///
/// `reference` is a worst-case event magnitude; under inverse-square decay an
/// event farther than the returned distance contributes less than `max_error`
/// and may be excluded.
#[must_use]
pub fn cutoff_distance(reference: f32, max_error: f32) -> f32 {
    (reference.abs() / max_error).sqrt()
}

/// Samples the scalar field induced by an event store.
///
/// Stateless apart from its parameters; shared read-only across all worker
/// threads of one voxelization pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldFunctor {
    pub kind: KernelKind,
    pub magnitude: f32,
    pub cutoff: f32,
}

impl FieldFunctor {
    #[must_use]
    pub fn new(kind: KernelKind, magnitude: f32, cutoff: f32) -> Self {
        Self {
            kind,
            magnitude,
            cutoff,
        }
    }

    /// Parameters resolved from a sampling configuration.
    #[must_use]
    pub fn for_config(config: &SamplingConfig) -> Self {
        Self::new(
            config.kernel_kind(),
            config.magnitude(),
            config.cutoff_distance(),
        )
    }

    /// Sums the contributions of all events within the cutoff of `point`.
    ///
    /// An empty neighborhood yields zero. Contributions are accumulated in
    /// f64; the visiting order is unspecified, so conformance checks compare
    /// with a relative tolerance rather than bit-exactly.
    #[must_use]
    pub fn evaluate(&self, store: &EventStore, point: Vec3) -> f32 {
        let mut sum = 0.0f64;
        store.within(point, self.cutoff, |idx, dist2| {
            sum += f64::from(self.contribution(store.event(idx as usize), dist2));
        });
        sum as f32 * self.magnitude
    }

    /// One event's contribution at squared distance `dist2`.
    #[must_use]
    pub fn contribution(&self, event: &Event, dist2: f32) -> f32 {
        match self.kind {
            KernelKind::Field => {
                let floor = event.radius.max(MIN_KERNEL_DISTANCE);
                event.value / dist2.max(floor * floor)
            }
            KernelKind::Lfp => {
                let floor = event.radius.max(MIN_KERNEL_DISTANCE);
                event.value / (4.0 * PI * dist2.sqrt().max(floor))
            }
            KernelKind::Density => {
                if dist2.sqrt() <= event.radius {
                    event.value
                } else {
                    0.0
                }
            }
            KernelKind::Frequency => {
                let d = dist2.sqrt();
                if d >= self.cutoff {
                    0.0
                } else {
                    event.value * (1.0 - d / self.cutoff)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(events: Vec<Event>, cutoff: f32) -> EventStore {
        EventStore::new(events, cutoff)
    }

    #[test]
    fn test_cutoff_distance_law() {
        let d = cutoff_distance(-60.0, 0.001);
        assert!((d - 244.948_97).abs() < 1e-3);
        // At the cutoff, a reference-magnitude event decays to max_error.
        assert!((60.0 / (d * d) - 0.001).abs() < 1e-6);
    }

    #[test]
    fn test_empty_neighborhood_is_zero() {
        let store = store_with(vec![Event::new(Vec3::ZERO, 10.0)], 2.0);
        let functor = FieldFunctor::new(KernelKind::Field, 1.0, 2.0);
        assert_eq!(functor.evaluate(&store, Vec3::new(100.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_coincident_point_is_finite() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        let store = store_with(vec![Event::new(p, 5.0)], 10.0);
        for kind in [
            KernelKind::Field,
            KernelKind::Lfp,
            KernelKind::Density,
            KernelKind::Frequency,
        ] {
            let functor = FieldFunctor::new(kind, 1.0, 10.0);
            let v = functor.evaluate(&store, p);
            assert!(v.is_finite(), "{kind:?} diverged at zero distance");
        }
    }

    #[test]
    fn test_field_kernel_closed_form() {
        let store = store_with(vec![Event::new(Vec3::ZERO, -60.0)], 100.0);
        let functor = FieldFunctor::new(KernelKind::Field, 1.0, 100.0);
        let v = functor.evaluate(&store, Vec3::new(10.0, 0.0, 0.0));
        let expected = -60.0 / 100.0;
        assert!((v - expected).abs() / expected.abs() < 0.01);
    }

    #[test]
    fn test_lfp_kernel_closed_form() {
        let store = store_with(vec![Event::new(Vec3::ZERO, 8.0)], 100.0);
        let functor = FieldFunctor::new(KernelKind::Lfp, 1.0, 100.0);
        let v = functor.evaluate(&store, Vec3::new(0.0, 2.0, 0.0));
        let expected = 8.0 / (4.0 * PI * 2.0);
        assert!((v - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_frequency_kernel_decays_linearly() {
        let store = store_with(vec![Event::new(Vec3::ZERO, 4.0)], 10.0);
        let functor = FieldFunctor::new(KernelKind::Frequency, 1.0, 10.0);
        let v = functor.evaluate(&store, Vec3::new(5.0, 0.0, 0.0));
        assert!((v - 2.0).abs() < 1e-4);
        assert_eq!(functor.evaluate(&store, Vec3::new(20.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_density_kernel_membership() {
        let store = store_with(vec![Event::with_radius(Vec3::ZERO, 1.0, 1.5)], 1.5);
        let functor = FieldFunctor::new(KernelKind::Density, 2.0, 1.5);
        assert!((functor.evaluate(&store, Vec3::new(1.0, 0.0, 0.0)) - 2.0).abs() < 1e-6);
        assert_eq!(functor.evaluate(&store, Vec3::new(2.0, 0.0, 0.0)), 0.0);
    }
}

//! The weighted point sample contributed by one simulated entity.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;

/// A single event: a position with a scalar value and an optional radius.
///
/// Events keep a stable index within their source for the lifetime of a run
/// so that per-frame loads can refresh `value` in place. `radius` is zero for
/// point-like entities (compartments, somas, spikes) and positive for entities
/// with a spatial footprint (synapse density contributions).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Event {
    pub position: Vec3,
    pub value: f32,
    pub radius: f32,
}

impl Event {
    #[must_use]
    pub const fn new(position: Vec3, value: f32) -> Self {
        Self {
            position,
            value,
            radius: 0.0,
        }
    }

    #[must_use]
    pub const fn with_radius(position: Vec3, value: f32, radius: f32) -> Self {
        Self {
            position,
            value,
            radius,
        }
    }
}

//! Synapse source: static density contributions.
//!
//! Synapse positions carry no time dimension; the source reports a
//! single-frame range and `load` never changes anything.

use fieldvox_data::{Event, SynapsePositions};
use tracing::info;

use crate::config::SamplingConfig;
use crate::error::{ConfigError, LoadError};
use crate::event::EventStore;
use crate::frame::FrameRange;
use crate::sources::EventSource;

pub struct SynapseSource {
    store: EventStore,
}

impl SynapseSource {
    /// Builds unit-weight density events, one per synapse.
    ///
    /// Each event's radius is one voxel extent at the configured resolution,
    /// so the density kernel counts synapses into their surrounding voxels;
    /// the query cutoff matches the radius.
    pub fn new(synapses: &SynapsePositions, config: &SamplingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if synapses.positions.is_empty() {
            return Err(ConfigError::EmptyTarget(
                config.target.clone().unwrap_or_default(),
            ));
        }

        let radius = 1.0 / config.resolution;
        let events: Vec<Event> = synapses
            .positions
            .iter()
            .map(|&p| Event::with_radius(p, 1.0, radius))
            .collect();
        info!(synapses = events.len(), radius, "synapse source ready");

        Ok(Self {
            store: EventStore::new(events, radius),
        })
    }
}

impl EventSource for SynapseSource {
    fn store(&self) -> &EventStore {
        &self.store
    }

    fn load(&mut self, _time: f64) -> Result<usize, LoadError> {
        // Time-independent: values are final at construction.
        Ok(self.store.len())
    }

    fn time_range(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn dt(&self) -> f64 {
        1.0
    }

    fn frame_range(&self) -> FrameRange {
        FrameRange::new(0, 1)
    }
}

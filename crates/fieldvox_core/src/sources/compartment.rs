//! Compartment report source: one event per reported compartment.

use fieldvox_data::{CircuitGeometry, Event};
use tracing::{debug, info};

use crate::config::SamplingConfig;
use crate::error::{ConfigError, LoadError};
use crate::event::EventStore;
use crate::frame::FrameRange;
use crate::sources::{EventSource, FrameReport};

pub struct CompartmentSource {
    store: EventStore,
    report: Box<dyn FrameReport>,
    frames: FrameRange,
    dt: f64,
}

impl CompartmentSource {
    /// Binds prepared geometry to a compartment report.
    ///
    /// Positions come from the morphology, one event per reported
    /// compartment; values are filled by `load`. Fails when the report shape
    /// does not match the geometry.
    pub fn new(
        geometry: &CircuitGeometry,
        report: Box<dyn FrameReport>,
        config: &SamplingConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if geometry.compartment_count() == 0 {
            return Err(ConfigError::EmptyTarget(
                config.target.clone().unwrap_or_default(),
            ));
        }
        if !geometry.is_consistent() {
            return Err(ConfigError::mismatch("inconsistent cell offsets"));
        }
        if report.width() != geometry.compartment_count() {
            return Err(ConfigError::mismatch(format!(
                "report width {} != {} reported compartments",
                report.width(),
                geometry.compartment_count()
            )));
        }
        if !report.is_consistent() {
            return Err(ConfigError::mismatch("report rows have unequal widths"));
        }

        let meta = report.meta();
        let dt = config.dt.unwrap_or(meta.timestep);
        if !(dt > 0.0) {
            return Err(ConfigError::invalid("dt", "report has no usable timestep"));
        }

        let cutoff = config.cutoff_distance();
        info!(
            cutoff,
            reference = config.cutoff_reference,
            max_error = config.max_error,
            "computed cutoff distance"
        );

        let events: Vec<Event> = geometry
            .positions
            .iter()
            .map(|&p| Event::new(p, 0.0))
            .collect();

        Ok(Self {
            store: EventStore::new(events, cutoff),
            report,
            frames: FrameRange::of_report(meta.start_time, meta.end_time, dt),
            dt,
        })
    }
}

impl EventSource for CompartmentSource {
    fn store(&self) -> &EventStore {
        &self.store
    }

    fn load(&mut self, time: f64) -> Result<usize, LoadError> {
        let values = self.report.frame(time).ok_or(LoadError::OutOfRange)?;
        self.store.set_values(&values);
        debug!(time, count = values.len(), "loaded compartment frame");
        Ok(values.len())
    }

    fn time_range(&self) -> (f64, f64) {
        let meta = self.report.meta();
        (meta.start_time, meta.end_time)
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn frame_range(&self) -> FrameRange {
        self.frames
    }

    fn frame_time(&self, frame: u32) -> f64 {
        self.report.meta().start_time + f64::from(frame) * self.dt
    }
}

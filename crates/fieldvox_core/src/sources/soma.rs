//! Soma report source: one event per cell, somatic segment only.

use fieldvox_data::{CircuitGeometry, Event};
use tracing::{debug, info};

use crate::config::SamplingConfig;
use crate::error::{ConfigError, LoadError};
use crate::event::EventStore;
use crate::frame::FrameRange;
use crate::sources::{EventSource, FrameReport};

pub struct SomaSource {
    store: EventStore,
    report: Box<dyn FrameReport>,
    /// Frame index of each cell's somatic segment.
    cell_offsets: Vec<usize>,
    frames: FrameRange,
    dt: f64,
}

impl SomaSource {
    /// Binds prepared geometry to a report, keeping only the first reported
    /// segment of each cell. Everything else matches `CompartmentSource`.
    pub fn new(
        geometry: &CircuitGeometry,
        report: Box<dyn FrameReport>,
        config: &SamplingConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if geometry.cell_count() == 0 {
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

        let somas = geometry.somas();
        let events: Vec<Event> = somas.positions.iter().map(|&p| Event::new(p, 0.0)).collect();

        Ok(Self {
            store: EventStore::new(events, cutoff),
            report,
            cell_offsets: geometry.cell_offsets.clone(),
            frames: FrameRange::of_report(meta.start_time, meta.end_time, dt),
            dt,
        })
    }
}

impl EventSource for SomaSource {
    fn store(&self) -> &EventStore {
        &self.store
    }

    fn load(&mut self, time: f64) -> Result<usize, LoadError> {
        let frame = self.report.frame(time).ok_or(LoadError::OutOfRange)?;
        for (cell, &offset) in self.cell_offsets.iter().enumerate() {
            // The first reported segment of a cell is its soma.
            self.store.set_value(cell, frame[offset]);
        }
        debug!(time, cells = self.cell_offsets.len(), "loaded soma frame");
        Ok(self.cell_offsets.len())
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

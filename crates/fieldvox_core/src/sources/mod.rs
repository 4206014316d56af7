//! Event sources: per-frame providers of weighted point samples.
//!
//! Each variant binds prepared geometry to a report or spike stream and
//! refreshes its event arena in place on `load`. Construction failures are
//! fatal; `load` failures are recoverable sentinels (`LoadError`) so callers
//! can skip or re-poll a frame without tearing down the pipeline.

/// One event per reported compartment
pub mod compartment;
/// One event per cell, somatic segment only
pub mod soma;
/// Windowed spike intensities over a live or closed stream
pub mod spike;
/// Static synapse densities
pub mod synapse;

use fieldvox_data::{Aabb, InMemoryReport, ReportMeta};

use crate::error::LoadError;
use crate::event::EventStore;
use crate::frame::FrameRange;

pub use compartment::CompartmentSource;
pub use soma::SomaSource;
pub use spike::{SpikeSource, SpikeStream};
pub use synapse::SynapseSource;

/// A frame-indexed scalar report; the collaborator interface behind which
/// report-format I/O lives.
pub trait FrameReport: Send + Sync {
    /// Declared time range and native timestep.
    fn meta(&self) -> ReportMeta;

    /// Scalars per frame.
    fn width(&self) -> usize;

    /// True when every frame actually has `width` scalars. Sources refuse
    /// inconsistent reports at construction so `load` never sees a short row.
    fn is_consistent(&self) -> bool;

    /// The frame nearest to `time`, or `None` outside the declared range.
    fn frame(&self, time: f64) -> Option<Vec<f32>>;
}

impl FrameReport for InMemoryReport {
    fn meta(&self) -> ReportMeta {
        self.meta
    }

    fn width(&self) -> usize {
        self.width()
    }

    fn is_consistent(&self) -> bool {
        self.is_consistent()
    }

    fn frame(&self, time: f64) -> Option<Vec<f32>> {
        self.frame_at(time).map(<[f32]>::to_vec)
    }
}

/// Polymorphic interface over the source variants.
///
/// `load` is idempotent for a given time on static data; the bounding box and
/// cutoff distance are fixed at construction. A `load` must complete before
/// the store is queried for that frame; the exclusive borrow enforces that
/// ordering.
pub trait EventSource: Send + Sync {
    /// The event arena, spatial index and bounding box.
    fn store(&self) -> &EventStore;

    /// Refreshes event values (and membership, for streamed variants) for
    /// the requested time. Returns the number of processed records.
    fn load(&mut self, time: f64) -> Result<usize, LoadError>;

    /// Declared or observed time span in milliseconds.
    fn time_range(&self) -> (f64, f64);

    /// Timestep between frames in milliseconds.
    fn dt(&self) -> f64;

    /// The frames currently safe to sample; never shrinks during a run.
    fn frame_range(&self) -> FrameRange;

    /// World time of frame `frame`. Streamed sources anchor frame 0 at
    /// t=0; report-backed sources anchor it at the report's start time.
    fn frame_time(&self, frame: u32) -> f64 {
        f64::from(frame) * self.dt()
    }

    /// Bounding box over all event positions, fixed at construction.
    fn bounding_box(&self) -> Aabb {
        self.store().bounding_box()
    }
}

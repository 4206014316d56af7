//! Report frames and spike records.
//!
//! These are the collaborator input formats consumed by the event sources:
//! a frame-indexed scalar report (voltages, currents) and timestamped spikes.

use serde::{Deserialize, Serialize};

/// Declared time range and step of a report.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ReportMeta {
    /// Start of the reported interval in milliseconds (inclusive).
    pub start_time: f64,
    /// End of the reported interval in milliseconds (exclusive).
    pub end_time: f64,
    /// Native timestep between stored frames in milliseconds.
    pub timestep: f64,
}

impl ReportMeta {
    #[must_use]
    pub const fn new(start_time: f64, end_time: f64, timestep: f64) -> Self {
        Self {
            start_time,
            end_time,
            timestep,
        }
    }

    /// True when `time` falls inside the declared interval.
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time
    }
}

/// A fully materialized report: one row of scalars per stored frame.
///
/// All rows have the same width (one scalar per reported compartment or
/// cell); `frame_at` resolves a timestamp to the nearest stored row.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InMemoryReport {
    pub meta: ReportMeta,
    pub frames: Vec<Vec<f32>>,
}

impl InMemoryReport {
    /// Number of scalars per frame, zero for an empty report.
    #[must_use]
    pub fn width(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }

    /// True when every stored row has the same width. Deserialized reports
    /// can be ragged; sources reject them at construction.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let width = self.width();
        self.frames.iter().all(|f| f.len() == width)
    }

    /// The frame row nearest to `time`, or `None` when `time` is outside the
    /// declared interval.
    #[must_use]
    pub fn frame_at(&self, time: f64) -> Option<&[f32]> {
        if !self.meta.contains(time) || self.meta.timestep <= 0.0 {
            return None;
        }
        let idx = ((time - self.meta.start_time) / self.meta.timestep).round() as usize;
        self.frames.get(idx.min(self.frames.len().saturating_sub(1))).map(Vec::as_slice)
    }
}

/// One spike: a cell fired at an instant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SpikeRecord {
    /// Spike timestamp in milliseconds.
    pub time: f64,
    /// Identifier of the spiking cell.
    pub gid: u64,
}

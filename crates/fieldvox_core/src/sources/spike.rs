//! Spike source: instantaneous events integrated over a time window.
//!
//! Spikes arrive through a `SpikeStream`, either replayed from a file (which
//! behaves as an already-closed stream) or fed live by an ingestion thread.
//! A frame is only served once its window is complete according to the
//! stream's `FrameWindow`; until then `load` returns the `NotReady` sentinel
//! and the caller re-polls.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use fieldvox_data::{Event, SomaGeometry, SpikeRecord};
use tracing::{debug, info};

use crate::config::SamplingConfig;
use crate::error::{ConfigError, LoadError};
use crate::event::EventStore;
use crate::frame::{FrameRange, FrameWindow};
use crate::sources::EventSource;

/// Shared buffer of streamed spikes plus the completeness window.
///
/// Writers (`write`, `close`) may run on an ingestion thread while readers
/// poll `frame_range` and sample completed frames.
pub struct SpikeStream {
    records: RwLock<Vec<SpikeRecord>>,
    window: FrameWindow,
}

impl SpikeStream {
    /// An open stream expecting live arrivals.
    #[must_use]
    pub fn open(dt: f64, duration: f64) -> Arc<Self> {
        Arc::new(Self {
            records: RwLock::new(Vec::new()),
            window: FrameWindow::new(dt, duration),
        })
    }

    /// A replayed stream: all records delivered, then closed.
    #[must_use]
    pub fn replay(records: Vec<SpikeRecord>, dt: f64, duration: f64) -> Arc<Self> {
        let stream = Self::open(dt, duration);
        stream.write(&records);
        stream.close();
        stream
    }

    /// Appends a batch of spikes and advances the completeness window.
    pub fn write(&self, spikes: &[SpikeRecord]) {
        if spikes.is_empty() {
            return;
        }
        {
            let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
            records.extend_from_slice(spikes);
        }
        for spike in spikes {
            self.window.observe(spike.time);
        }
    }

    /// Terminates the stream, completing every pending frame.
    pub fn close(&self) {
        self.window.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.window.is_closed()
    }

    /// Frames currently safe to sample.
    #[must_use]
    pub fn frame_range(&self) -> FrameRange {
        self.window.frame_range()
    }

    /// Observed timestamp span.
    #[must_use]
    pub fn time_range(&self) -> (f64, f64) {
        self.window.time_range()
    }

    /// Visits the gid of every spike inside `[start, end)`.
    pub fn spikes_in<F: FnMut(u64)>(&self, start: f64, end: f64, mut visit: F) {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        for spike in records.iter() {
            if spike.time >= start && spike.time < end {
                visit(spike.gid);
            }
        }
    }
}

/// One event per cell; `load` turns a time window into per-cell spike counts.
pub struct SpikeSource {
    store: EventStore,
    stream: Arc<SpikeStream>,
    gid_slots: HashMap<u64, usize>,
    duration: f64,
    dt: f64,
}

impl SpikeSource {
    /// Binds per-cell soma positions to a spike stream.
    ///
    /// All cells get an event slot up front so the bounding box covers every
    /// possible spike position; membership is gated per frame.
    pub fn new(
        somas: &SomaGeometry,
        stream: Arc<SpikeStream>,
        config: &SamplingConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if somas.gids.is_empty() {
            return Err(ConfigError::EmptyTarget(
                config.target.clone().unwrap_or_default(),
            ));
        }
        if somas.gids.len() != somas.positions.len() {
            return Err(ConfigError::mismatch("one position per gid required"));
        }
        let dt = config.dt.unwrap_or(config.duration);
        if (dt - stream.window.dt()).abs() > f64::EPSILON {
            return Err(ConfigError::invalid(
                "dt",
                "stream window was opened with a different dt",
            ));
        }

        let cutoff = config.cutoff_distance();
        info!(
            cutoff,
            duration = config.duration,
            cells = somas.gids.len(),
            "spike source ready"
        );

        let events: Vec<Event> = somas.positions.iter().map(|&p| Event::new(p, 0.0)).collect();
        let gid_slots = somas
            .gids
            .iter()
            .enumerate()
            .map(|(slot, &gid)| (gid, slot))
            .collect();

        Ok(Self {
            store: EventStore::new(events, cutoff),
            stream,
            gid_slots,
            duration: config.duration,
            dt,
        })
    }

    fn frame_of(&self, time: f64) -> Option<u32> {
        if time < 0.0 || self.dt <= 0.0 {
            return None;
        }
        Some((time / self.dt + 0.5).floor() as u32)
    }
}

impl EventSource for SpikeSource {
    fn store(&self) -> &EventStore {
        &self.store
    }

    /// Counts spikes per cell inside `[time, time + duration)`.
    ///
    /// Active membership is the set of cells that spiked, so the spatial
    /// index is rebuilt on every successful load. Returns the number of
    /// spikes processed.
    fn load(&mut self, time: f64) -> Result<usize, LoadError> {
        let frame = self.frame_of(time).ok_or(LoadError::OutOfRange)?;
        let range = self.stream.frame_range();
        if !range.contains(frame) {
            if self.stream.is_closed() {
                return Err(LoadError::OutOfRange);
            }
            return Err(LoadError::NotReady { frame });
        }

        let mut counts: HashMap<usize, u32> = HashMap::new();
        let mut processed = 0usize;
        self.stream.spikes_in(time, time + self.duration, |gid| {
            processed += 1;
            if let Some(&slot) = self.gid_slots.get(&gid) {
                *counts.entry(slot).or_insert(0) += 1;
            }
        });

        for slot in 0..self.store.len() {
            let count = counts.get(&slot).copied().unwrap_or(0);
            self.store.set_value(slot, count as f32);
        }
        let active: Vec<usize> = counts.keys().copied().collect();
        self.store.retain_active(&active);

        debug!(
            time,
            frame,
            spikes = processed,
            active = active.len(),
            "loaded spike window"
        );
        Ok(processed)
    }

    fn time_range(&self) -> (f64, f64) {
        self.stream.time_range()
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn frame_range(&self) -> FrameRange {
        self.stream.frame_range()
    }
}

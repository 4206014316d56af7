//! Frame bookkeeping for static and streamed sources.
//!
//! `FrameRange` is the half-open interval of frame indices known to be safe
//! to sample. For static reports it is fixed at construction; for streamed
//! spikes it is published by a `FrameWindow`, which tracks how far the stream
//! has progressed and only admits a frame once no further event can land
//! inside its data window.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Relative slack for frame arithmetic; timestamps and steps are real
/// numbers, so boundary comparisons carry a tolerance well above f64
/// rounding noise and well below one tick.
const FRAME_EPSILON: f64 = 1e-6;

/// Half-open interval `[start, end)` of frame indices.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: u32,
    pub end: u32,
}

impl FrameRange {
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[must_use]
    pub fn contains(&self, frame: u32) -> bool {
        frame >= self.start && frame < self.end
    }

    /// Frame count of a static source covering `[start_time, end_time)` at
    /// step `dt`.
    #[must_use]
    pub fn of_report(start_time: f64, end_time: f64, dt: f64) -> Self {
        if dt <= 0.0 || end_time <= start_time {
            return Self::EMPTY;
        }
        let frames = ((end_time - start_time) / dt + FRAME_EPSILON).floor() as u32;
        Self::new(0, frames)
    }
}

/// Readiness of one discrete frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No evidence about this frame has arrived.
    Unknown,
    /// Events for this window may still arrive; its value is not final.
    Pending,
    /// No further event can land inside this window; its value is final.
    Complete,
}

#[derive(Debug, Default)]
struct WindowState {
    /// Earliest observed timestamp.
    first: Option<f64>,
    /// Latest observed timestamp.
    latest: Option<f64>,
    closed: bool,
}

/// Streaming completeness state machine.
///
/// Frame `f` integrates events inside `[f·dt, f·dt + duration)`. While the
/// stream is open, the only guarantee an arrival-ordered stream gives is
/// progress: data up to (but not including) the latest observed timestamp is
/// final once the stream moved past it, quantized to whole `dt` ticks. A
/// frame therefore becomes complete only when its window's upper bound lies
/// strictly below the last fully delivered tick. Closing the stream finalizes
/// everything observed, so every window whose upper bound fits inside the
/// observed span completes at once.
///
/// The published range is monotonically non-decreasing for the life of the
/// window, enforced with an atomic high-water mark so the range can be read
/// concurrently with ingestion.
#[derive(Debug)]
pub struct FrameWindow {
    dt: f64,
    duration: f64,
    state: Mutex<WindowState>,
    /// High-water mark of the published range end.
    complete_end: AtomicU32,
}

impl FrameWindow {
    /// A window for frames at step `dt` integrating `duration` of data.
    #[must_use]
    pub fn new(dt: f64, duration: f64) -> Self {
        Self {
            dt,
            duration,
            state: Mutex::new(WindowState::default()),
            complete_end: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Records the arrival of an event timestamp.
    pub fn observe(&self, timestamp: f64) {
        if !timestamp.is_finite() {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.first = Some(state.first.map_or(timestamp, |t| t.min(timestamp)));
        state.latest = Some(state.latest.map_or(timestamp, |t| t.max(timestamp)));
        let end = self.complete_frames(&state);
        drop(state);
        self.publish(end);
    }

    /// Marks the stream terminated, completing all pending frames.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.closed = true;
        let end = self.complete_frames(&state);
        drop(state);
        self.publish(end);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .closed
    }

    /// Observed timestamp span, `(0, 0)` before any arrival.
    #[must_use]
    pub fn time_range(&self) -> (f64, f64) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        (
            state.first.unwrap_or(0.0),
            state.latest.unwrap_or(0.0),
        )
    }

    /// The frames currently safe to sample: `[0, last complete + 1)`.
    #[must_use]
    pub fn frame_range(&self) -> FrameRange {
        FrameRange::new(0, self.complete_end.load(Ordering::Acquire))
    }

    /// Readiness of one frame.
    #[must_use]
    pub fn frame_state(&self, frame: u32) -> FrameState {
        if self.frame_range().contains(frame) {
            return FrameState::Complete;
        }
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.latest {
            Some(latest) if f64::from(frame) * self.dt < latest => FrameState::Pending,
            _ => FrameState::Unknown,
        }
    }

    fn publish(&self, end: u32) {
        // Never retract: concurrent observers may race with stale values.
        self.complete_end.fetch_max(end, Ordering::AcqRel);
    }

    fn complete_frames(&self, state: &WindowState) -> u32 {
        let Some(latest) = state.latest else {
            return 0;
        };
        if self.dt <= 0.0 || self.duration <= 0.0 {
            return 0;
        }
        if state.closed {
            // Everything observed is final: windows whose upper bound fits
            // inside the observed span (inclusive) are complete.
            let frames = ((latest - self.duration) / self.dt + FRAME_EPSILON).floor();
            if frames < 0.0 {
                0
            } else {
                frames as u32 + 1
            }
        } else {
            // Whole ticks strictly below the latest arrival are delivered;
            // the tick containing it may still receive events.
            let ticks = ((latest / self.dt) - FRAME_EPSILON).ceil() - 1.0;
            let window_ticks = (self.duration / self.dt).round();
            let frames = ticks - window_ticks;
            if frames < 0.0 {
                0
            } else {
                frames as u32
            }
        }
    }
}

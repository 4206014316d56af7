//! Streamed spike ingestion: completeness, re-polling, and monotonicity.

use fieldvox_core::config::{SamplingConfig, SourceKind};
use fieldvox_core::error::LoadError;
use fieldvox_core::frame::{FrameRange, FrameState};
use fieldvox_core::sources::{EventSource, SpikeSource, SpikeStream};
use fieldvox_data::SpikeRecord;

mod common;
use common::grid_geometry;

fn spike(time: f64, gid: u64) -> SpikeRecord {
    SpikeRecord { time, gid }
}

fn spike_config(dt: f64, duration: f64) -> SamplingConfig {
    SamplingConfig {
        source: SourceKind::Spikes,
        duration,
        dt: Some(dt),
        ..SamplingConfig::default()
    }
}

#[test]
fn frames_complete_as_the_stream_advances() {
    // dt=0.1, duration=1: frame f integrates [0.1*f, 0.1*f + 1).
    let stream = SpikeStream::open(0.1, 1.0);
    assert_eq!(stream.frame_range(), FrameRange::EMPTY);

    stream.write(&[spike(0.5, 1)]);
    assert_eq!(stream.frame_range(), FrameRange::EMPTY);

    // An arrival exactly at a window's upper bound does not complete it.
    stream.write(&[spike(1.0, 2)]);
    assert_eq!(stream.frame_range(), FrameRange::EMPTY);

    stream.write(&[spike(1.2, 1)]);
    assert_eq!(stream.frame_range(), FrameRange::new(0, 1));

    stream.write(&[spike(1.5, 3)]);
    assert_eq!(stream.frame_range(), FrameRange::new(0, 4));

    stream.write(&[spike(2.0, 2)]);
    stream.close();
    assert_eq!(stream.frame_range(), FrameRange::new(0, 11));
}

#[test]
fn not_ready_frames_become_loadable_after_more_arrivals() {
    let geometry = grid_geometry(3, 1);
    let stream = SpikeStream::open(1.0, 1.0);
    stream.write(&[spike(0.5, 1)]);

    let mut source = SpikeSource::new(&geometry.somas(), stream.clone(), &spike_config(1.0, 1.0))
        .unwrap();

    // Frame 0's window [0, 1) may still receive spikes.
    assert_eq!(
        source.load(0.0).unwrap_err(),
        LoadError::NotReady { frame: 0 }
    );

    // Once the stream has moved well past the window, the same poll succeeds
    // and sees every spike that landed inside it.
    stream.write(&[spike(0.9, 2), spike(2.5, 3)]);
    assert_eq!(source.load(0.0).unwrap(), 2);
    assert_eq!(source.store().active_count(), 2);
}

#[test]
fn not_ready_is_distinct_from_out_of_range() {
    let geometry = grid_geometry(2, 1);
    let stream = SpikeStream::open(1.0, 1.0);
    stream.write(&[spike(0.5, 1)]);
    let mut source = SpikeSource::new(&geometry.somas(), stream.clone(), &spike_config(1.0, 1.0))
        .unwrap();

    // Open stream: the frame may yet arrive.
    assert_eq!(
        source.load(5.0).unwrap_err(),
        LoadError::NotReady { frame: 5 }
    );

    // Closed stream: it never will.
    stream.close();
    assert_eq!(source.load(5.0).unwrap_err(), LoadError::OutOfRange);
}

#[test]
fn published_range_never_shrinks() {
    let stream = SpikeStream::open(0.1, 1.0);
    let mut high_water = 0;
    // Out-of-order arrivals; the published end only ever grows.
    for &t in &[1.5, 0.2, 3.0, 1.1, 2.4, 0.0, 3.0] {
        stream.write(&[spike(t, 1)]);
        let end = stream.frame_range().end;
        assert!(end >= high_water, "range shrank after arrival at {t}");
        high_water = end;
    }
    stream.close();
    assert!(stream.frame_range().end >= high_water);
}

#[test]
fn frame_states_track_the_window() {
    let window = fieldvox_core::frame::FrameWindow::new(0.1, 1.0);
    assert_eq!(window.frame_state(0), FrameState::Unknown);

    window.observe(1.2);
    assert_eq!(window.frame_state(0), FrameState::Complete);
    assert_eq!(window.frame_state(5), FrameState::Pending);
    assert_eq!(window.frame_state(100), FrameState::Unknown);

    window.close();
    assert_eq!(window.frame_state(1), FrameState::Complete);
    assert_eq!(window.frame_state(2), FrameState::Complete);
}

#[test]
fn replay_equals_write_then_close() {
    let records = vec![spike(0.3, 1), spike(1.7, 2), spike(4.2, 1)];

    let replayed = SpikeStream::replay(records.clone(), 0.5, 1.0);

    let live = SpikeStream::open(0.5, 1.0);
    for r in &records {
        live.write(std::slice::from_ref(r));
    }
    live.close();

    assert_eq!(replayed.frame_range(), live.frame_range());
    assert_eq!(replayed.time_range(), live.time_range());
}

//! Source-level conformance: frame ranges, idempotence, and error handling.

use fieldvox_core::config::{SamplingConfig, SourceKind};
use fieldvox_core::error::{ConfigError, LoadError};
use fieldvox_core::frame::FrameRange;
use fieldvox_core::sources::{
    CompartmentSource, EventSource, SomaSource, SpikeSource, SpikeStream, SynapseSource,
};
use fieldvox_data::{CircuitGeometry, InMemoryReport, ReportMeta, SpikeRecord, SynapsePositions, Vec3};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod common;
use common::grid_geometry;

/// A report spanning [0, 10) ms at dt=0.1: 100 frames of synthetic voltages.
fn voltage_report(width: usize) -> InMemoryReport {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    InMemoryReport {
        meta: ReportMeta::new(0.0, 10.0, 0.1),
        frames: (0..100)
            .map(|_| (0..width).map(|_| rng.gen_range(-80.0..-50.0)).collect())
            .collect(),
    }
}

#[test]
fn compartment_report_covers_100_frames() {
    let geometry = grid_geometry(4, 3);
    let report = voltage_report(geometry.compartment_count());
    let source =
        CompartmentSource::new(&geometry, Box::new(report), &SamplingConfig::default()).unwrap();
    assert_eq!(source.frame_range(), FrameRange::new(0, 100));
    assert_eq!(source.time_range(), (0.0, 10.0));
    assert!((source.dt() - 0.1).abs() < 1e-9);
}

#[test]
fn soma_report_covers_the_same_range() {
    let geometry = grid_geometry(4, 3);
    let report = voltage_report(geometry.compartment_count());
    let config = SamplingConfig {
        source: SourceKind::Somas,
        ..SamplingConfig::default()
    };
    let source = SomaSource::new(&geometry, Box::new(report), &config).unwrap();
    assert_eq!(source.frame_range(), FrameRange::new(0, 100));
    // One event per cell, not per compartment.
    assert_eq!(source.store().len(), 4);
}

#[test]
fn spike_file_reports_nine_frames() {
    // Spike timestamps range between 0.725 and 9.975 ms; duration=1, dt=1.
    let records: Vec<SpikeRecord> = (0..38u32)
        .map(|i| SpikeRecord {
            time: 0.725 + f64::from(i) * 0.25,
            gid: u64::from(i % 4) + 1,
        })
        .collect();
    assert!((records.last().unwrap().time - 9.975).abs() < 1e-9);

    let config = SamplingConfig {
        source: SourceKind::Spikes,
        duration: 1.0,
        dt: Some(1.0),
        ..SamplingConfig::default()
    };
    let stream = SpikeStream::replay(records, 1.0, 1.0);
    let source = SpikeSource::new(&grid_geometry(4, 3).somas(), stream, &config).unwrap();
    assert_eq!(source.frame_range(), FrameRange::new(0, 9));
}

#[test]
fn synapse_source_reports_a_single_frame() {
    let synapses = SynapsePositions {
        positions: vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0)],
    };
    let config = SamplingConfig {
        source: SourceKind::Synapses,
        ..SamplingConfig::default()
    };
    let mut source = SynapseSource::new(&synapses, &config).unwrap();
    assert_eq!(source.frame_range(), FrameRange::new(0, 1));
    assert_eq!(source.load(0.0).unwrap(), 2);
}

#[test]
fn static_loads_are_idempotent_and_preserve_the_bounding_box() {
    let geometry = grid_geometry(4, 3);
    let report = voltage_report(geometry.compartment_count());
    let mut source =
        CompartmentSource::new(&geometry, Box::new(report), &SamplingConfig::default()).unwrap();

    let bbox = source.bounding_box();
    source.load(4.2).unwrap();
    let first: Vec<f32> = (0..source.store().len())
        .map(|i| source.store().event(i).value)
        .collect();

    source.load(7.0).unwrap();
    source.load(4.2).unwrap();
    let again: Vec<f32> = (0..source.store().len())
        .map(|i| source.store().event(i).value)
        .collect();

    // Bit-identical on repeat, and the box never moves.
    assert_eq!(first, again);
    assert_eq!(source.bounding_box(), bbox);
}

#[test]
fn nonzero_start_reports_sample_every_advertised_frame() {
    // A report spanning [2, 4) ms at dt=0.5: four frames anchored at t=2.
    let geometry = grid_geometry(2, 2);
    let report = InMemoryReport {
        meta: ReportMeta::new(2.0, 4.0, 0.5),
        frames: vec![vec![-70.0; 4]; 4],
    };
    let mut source =
        CompartmentSource::new(&geometry, Box::new(report), &SamplingConfig::default()).unwrap();

    let range = source.frame_range();
    assert_eq!(range, FrameRange::new(0, 4));
    assert_eq!(source.frame_time(0), 2.0);
    for frame in range.start..range.end {
        let time = source.frame_time(frame);
        assert!(
            source.load(time).is_ok(),
            "frame {frame} at t={time} must be loadable"
        );
    }

    // Streamed spikes stay anchored at t=0.
    let stream = SpikeStream::replay(vec![SpikeRecord { time: 3.0, gid: 1 }], 1.0, 1.0);
    let config = SamplingConfig {
        source: SourceKind::Spikes,
        duration: 1.0,
        dt: Some(1.0),
        ..SamplingConfig::default()
    };
    let spikes = SpikeSource::new(&geometry.somas(), stream, &config).unwrap();
    assert_eq!(spikes.frame_time(2), 2.0);
}

#[test]
fn out_of_range_times_are_recoverable_sentinels() {
    let geometry = grid_geometry(2, 2);
    let report = voltage_report(geometry.compartment_count());
    let mut source =
        CompartmentSource::new(&geometry, Box::new(report), &SamplingConfig::default()).unwrap();

    assert_eq!(source.load(10.0).unwrap_err(), LoadError::OutOfRange);
    assert_eq!(source.load(-0.1).unwrap_err(), LoadError::OutOfRange);
    // The source still works after a failed load.
    assert!(source.load(0.0).is_ok());
}

#[test]
fn construction_rejects_mismatched_shapes() {
    let geometry = grid_geometry(2, 2);
    let narrow = InMemoryReport {
        meta: ReportMeta::new(0.0, 1.0, 0.1),
        frames: vec![vec![0.0; 3]; 10],
    };
    let err = CompartmentSource::new(&geometry, Box::new(narrow), &SamplingConfig::default())
        .err()
        .expect("shape mismatch must be fatal");
    assert!(matches!(err, ConfigError::Mismatch(_)));

    let empty = CircuitGeometry::default();
    let report = voltage_report(0);
    assert!(matches!(
        CompartmentSource::new(&empty, Box::new(report), &SamplingConfig::default()),
        Err(ConfigError::EmptyTarget(_))
    ));
}

#[test]
fn ragged_report_rows_are_rejected_at_construction() {
    // The first row has the declared width but a later row comes up short;
    // neither report-backed source may accept it and index into it later.
    let geometry = grid_geometry(2, 2);
    let ragged = InMemoryReport {
        meta: ReportMeta::new(0.0, 1.0, 0.5),
        frames: vec![vec![-65.0; 4], vec![-60.0; 2]],
    };

    assert!(matches!(
        CompartmentSource::new(&geometry, Box::new(ragged.clone()), &SamplingConfig::default()),
        Err(ConfigError::Mismatch(_))
    ));

    let config = SamplingConfig {
        source: SourceKind::Somas,
        ..SamplingConfig::default()
    };
    assert!(matches!(
        SomaSource::new(&geometry, Box::new(ragged), &config),
        Err(ConfigError::Mismatch(_))
    ));
}

#[test]
fn spike_load_counts_spikes_in_the_window() {
    let geometry = grid_geometry(3, 1);
    let somas = geometry.somas();
    let records = vec![
        SpikeRecord { time: 0.1, gid: 1 },
        SpikeRecord { time: 0.2, gid: 1 },
        SpikeRecord { time: 0.4, gid: 2 },
        SpikeRecord { time: 1.4, gid: 3 },
        SpikeRecord { time: 2.5, gid: 1 },
    ];
    let config = SamplingConfig {
        source: SourceKind::Spikes,
        duration: 1.0,
        dt: Some(1.0),
        ..SamplingConfig::default()
    };
    let stream = SpikeStream::replay(records, 1.0, 1.0);
    let mut source = SpikeSource::new(&somas, stream, &config).unwrap();

    assert_eq!(source.load(0.0).unwrap(), 3);
    let store = source.store();
    assert_eq!(store.event(0).value, 2.0); // gid 1 spiked twice in [0, 1)
    assert_eq!(store.event(1).value, 1.0);
    assert_eq!(store.event(2).value, 0.0);
    assert!(store.is_active(0));
    assert!(store.is_active(1));
    assert!(!store.is_active(2));

    // Frame 1 window [1, 2): only gid 3.
    assert_eq!(source.load(1.0).unwrap(), 1);
    assert_eq!(source.store().active_count(), 1);

    // Past the closed stream's range.
    assert_eq!(source.load(100.0).unwrap_err(), LoadError::OutOfRange);
}

#[test]
fn spike_values_are_deterministic_for_a_complete_frame() {
    let geometry = grid_geometry(3, 1);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let records: Vec<SpikeRecord> = (0..200)
        .map(|_| SpikeRecord {
            time: rng.gen_range(0.0..5.0),
            gid: rng.gen_range(1..=3),
        })
        .collect();
    let config = SamplingConfig {
        source: SourceKind::Spikes,
        duration: 1.0,
        dt: Some(0.5),
        ..SamplingConfig::default()
    };
    let stream = SpikeStream::replay(records, 0.5, 1.0);
    let mut source = SpikeSource::new(&geometry.somas(), stream, &config).unwrap();

    let n = source.load(1.0).unwrap();
    let values: Vec<f32> = (0..3).map(|i| source.store().event(i).value).collect();
    source.load(2.0).unwrap();
    assert_eq!(source.load(1.0).unwrap(), n);
    let again: Vec<f32> = (0..3).map(|i| source.store().event(i).value).collect();
    assert_eq!(values, again);
}

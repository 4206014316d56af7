//! # Fieldvox Core
//!
//! The event-based field sampling engine: turns sparse, irregularly
//! positioned simulation events into a dense regular 3D voxel grid.
//!
//! For each output voxel the scalar value is the sum of nearby event
//! contributions under a distance-decaying kernel, truncated at an
//! error-bounded cutoff distance that keeps the summation tractable.
//!
//! ## Architecture
//!
//! - **Sources** own the event arena and refresh it per frame; streamed
//!   spike sources gate frames on a completeness window.
//! - **SpatialIndex** answers "all events within radius r of p" queries
//!   over the currently active events.
//! - **FieldFunctor** sums kernel contributions of the neighborhood found
//!   through the index.
//! - **Voxelizer** decomposes the output grid into regions and samples the
//!   functor region-parallel (rayon) with disjoint writes.
//!
//! ## Example
//!
//! ```
//! use fieldvox_core::config::SamplingConfig;
//! use fieldvox_core::kernel::FieldFunctor;
//! use fieldvox_core::sources::{CompartmentSource, EventSource};
//! use fieldvox_core::volume::{ScalarPrecision, Volume, VolumeDescriptor};
//! use fieldvox_core::voxelizer::Voxelizer;
//! use fieldvox_data::{CircuitGeometry, InMemoryReport, ReportMeta, Vec3};
//!
//! let geometry = CircuitGeometry {
//!     gids: vec![1],
//!     positions: vec![Vec3::new(0.0, 0.0, 0.0)],
//!     cell_offsets: vec![0],
//! };
//! let report = InMemoryReport {
//!     meta: ReportMeta::new(0.0, 1.0, 1.0),
//!     frames: vec![vec![-65.0]],
//! };
//! let config = SamplingConfig::default();
//! let mut source = CompartmentSource::new(&geometry, Box::new(report), &config).unwrap();
//!
//! let descriptor = VolumeDescriptor::fit(&source.bounding_box(), 8, ScalarPrecision::F32);
//! let mut volume = Volume::new(descriptor);
//! let mut voxelizer = Voxelizer::new(&descriptor, config.max_block_size);
//! let functor = FieldFunctor::for_config(&config);
//! voxelizer.sample(&mut source, &functor, 0.0, &mut volume).unwrap();
//! ```

/// Sampling configuration (already-parsed descriptor fields)
pub mod config;
/// Error taxonomy: fatal construction vs recoverable per-frame failures
pub mod error;
/// Event arena with stable indices and per-frame membership
pub mod event;
/// Frame ranges and the streaming completeness window
pub mod frame;
/// Uniform-grid range queries over event positions
pub mod index;
/// Contribution kernels and the field functor
pub mod kernel;
/// Event source variants (compartments, somas, spikes, synapses)
pub mod sources;
/// The output voxel grid
pub mod volume;
/// Region-parallel sampling driver
pub mod voxelizer;

pub use config::{SamplingConfig, SourceKind};
pub use error::{ConfigError, LoadError, VoxelizeError};
pub use event::EventStore;
pub use frame::{FrameRange, FrameState, FrameWindow};
pub use kernel::{cutoff_distance, FieldFunctor, KernelKind};
pub use sources::{
    CompartmentSource, EventSource, FrameReport, SomaSource, SpikeSource, SpikeStream,
    SynapseSource,
};
pub use volume::{ScalarPrecision, Volume, VolumeDescriptor};
pub use voxelizer::Voxelizer;

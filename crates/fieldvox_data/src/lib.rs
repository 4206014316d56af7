//! # Fieldvox Data
//!
//! Plain data types shared across the fieldvox workspace.
//!
//! This crate holds the serializable leaf types of the sampling pipeline:
//! - Geometry primitives (`Vec3`, `Aabb`)
//! - The weighted point sample (`Event`) contributed by one simulated entity
//! - Prepared circuit geometry handed in by the caller (`CircuitGeometry`)
//! - Report and spike records used as collaborator input formats
//!
//! No algorithms live here; the sampling engine is in `fieldvox_core`.

/// Circuit geometry prepared by the caller (positions, cell offsets)
pub mod circuit;
/// Weighted point sample records
pub mod event;
/// Geometry primitives: 3D vectors and axis-aligned bounding boxes
pub mod geometry;
/// Report frames and spike records (collaborator input formats)
pub mod report;

pub use circuit::{CircuitGeometry, SomaGeometry, SynapsePositions};
pub use event::Event;
pub use geometry::{Aabb, Vec3};
pub use report::{InMemoryReport, ReportMeta, SpikeRecord};

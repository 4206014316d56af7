//! Fieldvox: sampling sparse simulation events into dense voxel volumes.
//!
//! The sampling engine lives in [`fieldvox_core`]; plain data types in
//! [`fieldvox_data`]. This crate adds the application layer: descriptor
//! parsing, input file loading, and volume export.

/// Application glue: URI handling, input loading, volume writing
pub mod app;

pub use fieldvox_core;
pub use fieldvox_data;

//! Sampling configuration.
//!
//! A `SamplingConfig` carries the already-parsed fields of the volume
//! descriptor. The engine never parses descriptor strings itself; the front
//! end resolves its URI (or a TOML file) into this structure before any
//! source is constructed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::kernel::KernelKind;

/// Default voxels per micrometer.
pub const DEFAULT_RESOLUTION: f32 = 1.0;
/// Default maximum memory for one voxelization region, in bytes.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 64 << 20;
/// Default error bound used to derive the cutoff distance.
pub const DEFAULT_MAX_ERROR: f32 = 0.001;
/// Default worst-case event magnitude for the cutoff computation.
///
/// This is a modeling bound (resting membrane potential in mV), not a value
/// measured from the data, which is why it stays configurable.
pub const DEFAULT_CUTOFF_REFERENCE: f32 = -60.0;
/// Default spike integration window in milliseconds.
pub const DEFAULT_DURATION: f64 = 10.0;

/// Which event source variant to build.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// One event per reported compartment.
    #[default]
    Compartments,
    /// One event per cell, restricted to the somatic segment.
    Somas,
    /// Instantaneous spike events integrated over a time window.
    Spikes,
    /// Static synapse density contributions.
    Synapses,
}

/// Already-parsed descriptor fields for one sampling run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SamplingConfig {
    /// Event source variant.
    pub source: SourceKind,
    /// Target (cell set) selection, resolved by the caller.
    pub target: Option<String>,
    /// Report identifier within the data set.
    pub report: Option<String>,
    /// Global scale applied to every sampled value; variant default if unset.
    pub magnitude: Option<f32>,
    /// Contribution kernel; variant default if unset.
    pub functor: Option<KernelKind>,
    /// Output resolution in voxels per micrometer.
    pub resolution: f32,
    /// Maximum memory for one voxelization region, in bytes.
    pub max_block_size: usize,
    /// Error bound: contributions below this are discarded via the cutoff.
    pub max_error: f32,
    /// Worst-case event magnitude used to derive the cutoff distance.
    pub cutoff_reference: f32,
    /// Timestep between requested frames in ms; report default if unset.
    pub dt: Option<f64>,
    /// Spike integration window in ms.
    pub duration: f64,
    /// Path to a spike file for spike sources.
    pub spikes: Option<PathBuf>,
    /// Path to a dye attenuation curve; reserved for dye-based reports.
    pub dyecurve: Option<PathBuf>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            target: None,
            report: None,
            magnitude: None,
            functor: None,
            resolution: DEFAULT_RESOLUTION,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            max_error: DEFAULT_MAX_ERROR,
            cutoff_reference: DEFAULT_CUTOFF_REFERENCE,
            dt: None,
            duration: DEFAULT_DURATION,
            spikes: None,
            dyecurve: None,
        }
    }
}

impl SamplingConfig {
    /// The kernel to sample with: explicit choice or the variant default.
    #[must_use]
    pub fn kernel_kind(&self) -> KernelKind {
        self.functor.unwrap_or(match self.source {
            SourceKind::Synapses => KernelKind::Density,
            SourceKind::Spikes => KernelKind::Frequency,
            SourceKind::Compartments | SourceKind::Somas => KernelKind::Field,
        })
    }

    /// The global magnitude: explicit choice or the variant default.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.magnitude.unwrap_or(match self.source {
            SourceKind::Compartments | SourceKind::Somas => 0.1,
            SourceKind::Spikes => 1.5 / self.duration as f32,
            SourceKind::Synapses => 1.0,
        })
    }

    /// Cutoff distance derived from the reference magnitude and error bound.
    ///
    /// Any event farther than this from a query point contributes less than
    /// `max_error` under the field kernel's decay law.
    #[must_use]
    pub fn cutoff_distance(&self) -> f32 {
        (self.cutoff_reference.abs() / self.max_error).sqrt()
    }

    /// Validates parameter domains. Fatal at construction time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_error > 0.0) {
            return Err(ConfigError::invalid("max_error", "must be positive"));
        }
        if !(self.resolution > 0.0) {
            return Err(ConfigError::invalid("resolution", "must be positive"));
        }
        if !(self.duration > 0.0) {
            return Err(ConfigError::invalid("duration", "must be positive"));
        }
        if self.max_block_size == 0 {
            return Err(ConfigError::invalid("max_block_size", "must be non-zero"));
        }
        if let Some(dt) = self.dt {
            if !(dt > 0.0) {
                return Err(ConfigError::invalid("dt", "must be positive"));
            }
        }
        Ok(())
    }
}

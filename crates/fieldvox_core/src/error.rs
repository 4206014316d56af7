//! Error types for the sampling engine.
//!
//! The taxonomy separates fatal construction failures from recoverable
//! per-frame conditions: a source that cannot be built aborts the run, while
//! a frame that is not ready yet is reported as a sentinel the caller can
//! re-poll without tearing the pipeline down.

use thiserror::Error;

/// Fatal configuration failure raised while constructing a source.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The resolved target selects no entities.
    #[error("empty target selection: {0}")]
    EmptyTarget(String),

    /// Geometry and report disagree on shape.
    #[error("geometry/report mismatch: {0}")]
    Mismatch(String),

    /// A descriptor parameter is out of its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
}

impl ConfigError {
    #[must_use]
    pub fn mismatch<S: Into<String>>(msg: S) -> Self {
        Self::Mismatch(msg.into())
    }

    #[must_use]
    pub fn invalid<S: Into<String>>(name: &'static str, reason: S) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Recoverable per-frame load failure.
///
/// Neither variant is fatal: `NotReady` asks the caller to re-poll once the
/// stream has progressed, `OutOfRange` tells it the requested time will never
/// become available.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// The requested frame's window is not complete yet (streaming source).
    #[error("frame {frame} is not complete yet")]
    NotReady { frame: u32 },

    /// The requested time is outside the source's declared range.
    #[error("requested time is outside the source range")]
    OutOfRange,
}

/// Failure of one voxelization pass.
///
/// In either case the output volume keeps its previous content; a failed
/// pass never leaves a mixed-frame image behind.
#[derive(Error, Debug)]
pub enum VoxelizeError {
    /// Loading the frame's events failed; the volume was not touched.
    #[error("event load failed: {0}")]
    Load(#[from] LoadError),

    /// The pass was cancelled before all regions completed.
    #[error("voxelization cancelled before completion")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::NotReady { frame: 7 };
        assert_eq!(err.to_string(), "frame 7 is not complete yet");
        let err = ConfigError::invalid("max_error", "must be positive");
        assert!(err.to_string().contains("max_error"));
    }

    #[test]
    fn test_load_error_propagates_into_voxelize_error() {
        let err: VoxelizeError = LoadError::OutOfRange.into();
        assert!(matches!(err, VoxelizeError::Load(LoadError::OutOfRange)));
    }
}

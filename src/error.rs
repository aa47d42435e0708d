//! Error types for tracker construction and shared access.

use thiserror::Error;

/// Rejected tracker configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("at least one feature name is required for matching")]
    EmptyFeatureNames,
    #[error("feature name `{0}` is listed more than once")]
    DuplicateFeatureName(String),
    #[error("adaptation rate must be in (0, 1], got {0}")]
    InvalidAlpha(f64),
    #[error("maximum matching distance must be non-negative, got {0}")]
    InvalidMatchingDistance(f64),
    #[error("variance floor must be a positive finite number, got {0}")]
    InvalidMinVariance(f64),
    #[error("maximum number of tracks must be at least 1")]
    ZeroMaxTracks,
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("invalid tracker configuration: {0}")]
    Config(#[from] ConfigError),
    /// A previous `process` call panicked and left the tracks partially
    /// updated. The pipeline has to be rebuilt.
    #[error("tracker state is poisoned by a panic in a previous frame")]
    Poisoned,
}

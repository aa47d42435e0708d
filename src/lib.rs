//! Online multi-object tracker over named scalar features.
//!
//! Each frame, a set of [`Observation`]s is matched greedily against the live
//! [`Track`]s, unmatched observations spawn new tracks, stale tracks are
//! retired and the running [`FeatureStat`]s of matched tracks are refreshed.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{ConfigError, TrackerError};
pub use integration::{
    Frame, IntoObservations, ObservationBuilder, ObservationSource, SharedTracker,
    TrackerPipeline,
};
pub use tracker::{
    DisappearanceAllowance, FeatureStat, FeatureTracker, FrameStats, MIN_VARIANCE, MatchPolicy,
    Observation, Rect, Track, TrackSnapshot, TrackState, TrackedObservation, TrackerConfig,
};

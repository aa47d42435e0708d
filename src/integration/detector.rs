//! Trait for the upstream stages that produce observations.

use std::time::Duration;

use crate::tracker::Observation;

/// One frame's worth of tracker input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Capture time, relative to the start of the pipeline
    pub timestamp: Duration,
    pub observations: Vec<Observation>,
}

impl Frame {
    pub fn new(timestamp: Duration, observations: impl IntoObservations) -> Self {
        Self {
            timestamp,
            observations: observations.into_observations(),
        }
    }
}

/// Trait for segmentation or detection stages feeding the tracker.
///
/// Implement this trait to connect any detector to the tracker.
///
/// # Example
///
/// ```ignore
/// use feature_tracker::{Frame, ObservationSource};
///
/// struct BlobDetector {
///     // Capture device, background model, ...
/// }
///
/// impl ObservationSource for BlobDetector {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
///         // Grab an image, segment it and describe every blob
///         Ok(None)
///     }
/// }
/// ```
pub trait ObservationSource {
    /// Error type for acquisition or detection failures.
    type Error;

    /// Produce the next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}

/// Helper trait for converting detector-specific outputs to observations.
pub trait IntoObservations {
    fn into_observations(self) -> Vec<Observation>;
}

impl IntoObservations for Vec<Observation> {
    fn into_observations(self) -> Vec<Observation> {
        self
    }
}

impl IntoObservations for Observation {
    fn into_observations(self) -> Vec<Observation> {
        vec![self]
    }
}

impl IntoObservations for Vec<std::collections::BTreeMap<String, f64>> {
    fn into_observations(self) -> Vec<Observation> {
        self.into_iter().map(Observation::new).collect()
    }
}

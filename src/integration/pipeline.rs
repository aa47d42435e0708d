//! TrackerPipeline for combining an observation source with tracking.

use crate::error::ConfigError;
use crate::tracker::{FeatureTracker, TrackedObservation, TrackerConfig};

use super::ObservationSource;

/// A pipeline that pulls frames from any `ObservationSource` and feeds them
/// to a `FeatureTracker`.
pub struct TrackerPipeline<S: ObservationSource> {
    source: S,
    tracker: FeatureTracker,
}

impl<S: ObservationSource> TrackerPipeline<S> {
    /// Create a new tracking pipeline with the given source and tracker config.
    pub fn new(source: S, config: TrackerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            source,
            tracker: FeatureTracker::new(config)?,
        })
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(source: S) -> Result<Self, ConfigError> {
        Self::new(source, TrackerConfig::default())
    }

    /// Pull and track a single frame.
    ///
    /// # Returns
    /// The frame's observations annotated with track ids, `None` once the
    /// source is exhausted, or the source's error.
    pub fn process_next(&mut self) -> Result<Option<Vec<TrackedObservation>>, S::Error> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(None);
        };
        Ok(Some(self.tracker.process(frame.timestamp, frame.observations)))
    }

    /// Drain the source, handing every tracked frame to `on_frame`.
    ///
    /// Returns the number of processed frames.
    pub fn run_to_end<F>(&mut self, mut on_frame: F) -> Result<usize, S::Error>
    where
        F: FnMut(&FeatureTracker, &[TrackedObservation]),
    {
        let mut frames = 0;
        while let Some(tracked) = self.process_next()? {
            on_frame(&self.tracker, tracked.as_slice());
            frames += 1;
        }
        Ok(frames)
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &FeatureTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut FeatureTracker {
        &mut self.tracker
    }
}

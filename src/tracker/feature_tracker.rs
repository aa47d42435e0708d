//! Main tracking engine: matching, spawning, cleanup and statistics update.

use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, warn};

use crate::error::ConfigError;
use crate::tracker::config::TrackerConfig;
use crate::tracker::matching::{AssignmentResult, MatchPolicy};
use crate::tracker::observation::{Observation, TrackedObservation};
use crate::tracker::track::{Track, TrackSnapshot};

/// Counters describing the latest processed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub matched: usize,
    pub spawned: usize,
    pub removed: usize,
    /// Unmatched observations dropped because `max_tracks` was reached
    pub dropped_at_capacity: usize,
    /// Unmatched observations lacking a finite value for a matched feature
    pub dropped_malformed: usize,
}

/// Why an unmatched observation did not spawn a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpawnRejection {
    AtCapacity,
    Malformed,
}

/// Online tracker over named features.
///
/// `process` must be called once per frame with non-decreasing timestamps.
/// A panic inside `process` leaves the tracks partially updated; the whole
/// pipeline should then be rebuilt rather than the frame retried.
pub struct FeatureTracker {
    /// Live tracks keyed by id; iteration order is creation order
    tracks: BTreeMap<u64, Track>,
    policy: MatchPolicy,
    config: TrackerConfig,
    next_id: u64,
    frame_id: u64,
    last_timestamp: Option<Duration>,
    last_stats: FrameStats,
    dropped_at_capacity_total: u64,
    dropped_malformed_total: u64,
}

impl FeatureTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = MatchPolicy::from_config(&config)?;
        Ok(Self {
            tracks: BTreeMap::new(),
            policy,
            config,
            next_id: 1,
            frame_id: 0,
            last_timestamp: None,
            last_stats: FrameStats::default(),
            dropped_at_capacity_total: 0,
            dropped_malformed_total: 0,
        })
    }

    /// Run one frame and return the observations annotated with track ids,
    /// in input order.
    pub fn process(
        &mut self,
        timestamp: Duration,
        observations: Vec<Observation>,
    ) -> Vec<TrackedObservation> {
        self.frame_id += 1;
        let timestamp = self.clamp_timestamp(timestamp);
        let mut stats = FrameStats::default();

        // Step 1: match existing tracks against all observations
        let (matches, unmatched_observations) = self.match_tracks(&observations);
        stats.matched = matches.len();

        let mut assigned: Vec<Option<u64>> = vec![None; observations.len()];
        for (track_id, obs_idx) in matches {
            assigned[obs_idx] = Some(track_id);
        }

        // Step 2: spawn tracks for whatever is left
        let first_new_id = self.next_id;
        for obs_idx in unmatched_observations {
            match self.spawn_track(&observations[obs_idx], timestamp) {
                Ok(track_id) => {
                    assigned[obs_idx] = Some(track_id);
                    stats.spawned += 1;
                }
                Err(SpawnRejection::AtCapacity) => stats.dropped_at_capacity += 1,
                Err(SpawnRejection::Malformed) => stats.dropped_malformed += 1,
            }
        }

        // Step 3: retire tracks that ran out of allowance
        stats.removed = self.clean_tracks(timestamp, first_new_id);

        // Step 4: refresh statistics of matched tracks
        self.update_tracks(&observations, timestamp);

        debug!(
            "Frame {} @ {:?}: {} matched, {} spawned, {} removed, {} dropped at capacity, \
             {} malformed, {} live",
            self.frame_id,
            timestamp,
            stats.matched,
            stats.spawned,
            stats.removed,
            stats.dropped_at_capacity,
            stats.dropped_malformed,
            self.tracks.len()
        );
        self.last_stats = stats;
        self.dropped_at_capacity_total += stats.dropped_at_capacity as u64;
        self.dropped_malformed_total += stats.dropped_malformed as u64;

        observations
            .into_iter()
            .zip(assigned)
            .map(|(observation, track_id)| TrackedObservation {
                observation,
                track_id,
            })
            .collect()
    }

    fn clamp_timestamp(&mut self, timestamp: Duration) -> Duration {
        let timestamp = match self.last_timestamp {
            Some(last) if timestamp < last => {
                warn!(
                    "Frame {}: timestamp {:?} is earlier than previous {:?}, clamping",
                    self.frame_id, timestamp, last
                );
                last
            }
            _ => timestamp,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    /// Assign observations to tracks. Returns `(track id, observation
    /// index)` pairs and the indices of unconsumed observations.
    fn match_tracks(&mut self, observations: &[Observation]) -> (Vec<(u64, usize)>, Vec<usize>) {
        for track in self.tracks.values_mut() {
            track.best_match = None;
        }

        let dists = self.policy.distance_matrix(self.tracks.values(), observations);
        let AssignmentResult {
            matches,
            unmatched_observations,
            ..
        } = self.policy.greedy_assignment(&dists);

        let ids: Vec<u64> = self.tracks.keys().copied().collect();
        let mut matched = Vec::with_capacity(matches.len());
        for (row, obs_idx) in matches {
            let track_id = ids[row];
            if let Some(track) = self.tracks.get_mut(&track_id) {
                track.best_match = Some(obs_idx);
                matched.push((track_id, obs_idx));
            }
        }
        (matched, unmatched_observations)
    }

    /// An observation missing a finite value for any matched feature could
    /// never be matched again, so it does not spawn a track.
    fn spawn_track(
        &mut self,
        observation: &Observation,
        timestamp: Duration,
    ) -> Result<u64, SpawnRejection> {
        let names = self.policy.feature_names();
        let unusable = names
            .iter()
            .find(|name| !observation.feature(name).is_some_and(f64::is_finite));
        if let Some(name) = unusable {
            warn!(
                "Frame {}: observation has no finite `{}`, not spawning a track",
                self.frame_id, name
            );
            return Err(SpawnRejection::Malformed);
        }

        if self.tracks.len() >= self.config.max_tracks {
            debug!(
                "Frame {}: {} live tracks, dropping unmatched observation",
                self.frame_id,
                self.tracks.len()
            );
            return Err(SpawnRejection::AtCapacity);
        }

        let id = self.next_id;
        let track = Track::spawn(
            id,
            observation,
            timestamp,
            self.config.disappearance.frame_budget(),
            self.config.min_variance,
        )
        .ok_or(SpawnRejection::Malformed)?;

        self.next_id += 1;
        debug!("Frame {}: spawned track {}", self.frame_id, id);
        self.tracks.insert(id, track);
        Ok(id)
    }

    /// Tracks with ids from `first_new_id` on were spawned this frame and are
    /// left alone. Returns the number of removed tracks.
    fn clean_tracks(&mut self, timestamp: Duration, first_new_id: u64) -> usize {
        let allowance = self.config.disappearance;
        let budget = allowance.frame_budget();

        let mut expired = Vec::new();
        for (&id, track) in self.tracks.iter_mut() {
            if track.best_match.is_some() {
                track.mark_tracked(budget);
            } else if id < first_new_id {
                track.mark_lost();
                if track.expire(timestamp, allowance) {
                    expired.push(id);
                }
            }
        }

        for id in &expired {
            self.tracks.remove(id);
            debug!("Frame {}: removed track {}", self.frame_id, id);
        }
        expired.len()
    }

    fn update_tracks(&mut self, observations: &[Observation], timestamp: Duration) {
        let alpha = self.config.alpha;
        let min_variance = self.config.min_variance;
        for track in self.tracks.values_mut() {
            if let Some(obs_idx) = track.best_match {
                track.update(&observations[obs_idx], alpha, min_variance, timestamp);
            }
        }
    }

    /// Live tracks in creation order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn track(&self, id: u64) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn snapshot(&self) -> Vec<TrackSnapshot> {
        self.tracks.values().map(Track::snapshot).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Number of processed frames.
    pub fn frame_count(&self) -> u64 {
        self.frame_id
    }

    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Observations dropped at the `max_tracks` cap since construction.
    pub fn dropped_at_capacity(&self) -> u64 {
        self.dropped_at_capacity_total
    }

    /// Observations dropped for lacking a finite matched feature since
    /// construction.
    pub fn dropped_malformed(&self) -> u64 {
        self.dropped_malformed_total
    }

    /// Drop every live track. Ids keep increasing afterwards.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.last_timestamp = None;
        self.last_stats = FrameStats::default();
    }
}

//! Persistent tracked entity.

use std::collections::BTreeMap;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::tracker::config::DisappearanceAllowance;
use crate::tracker::feature_stat::FeatureStat;
use crate::tracker::observation::Observation;
use crate::tracker::track_state::TrackState;

/// A tracked object accumulating feature statistics across frames.
#[derive(Debug, Clone)]
pub struct Track {
    id: u64,
    features: BTreeMap<String, FeatureStat>,
    state: TrackState,
    first_seen: Duration,
    last_seen: Duration,
    /// Unmatched frames left under a frame-count allowance
    ttl: u32,
    /// Index into the current frame's observations
    pub(crate) best_match: Option<usize>,
}

impl Track {
    /// Spawn a track from an unmatched observation.
    ///
    /// Non-finite feature values are skipped. Returns `None` if the
    /// observation has no usable feature at all.
    pub(crate) fn spawn(
        id: u64,
        observation: &Observation,
        timestamp: Duration,
        ttl: u32,
        min_variance: f64,
    ) -> Option<Self> {
        let features: BTreeMap<String, FeatureStat> = observation
            .features
            .iter()
            .filter(|(_, value)| value.is_finite())
            .map(|(name, &value)| (name.clone(), FeatureStat::new(value, min_variance)))
            .collect();

        if features.is_empty() {
            return None;
        }

        Some(Self {
            id,
            features,
            state: TrackState::New,
            first_seen: timestamp,
            last_seen: timestamp,
            ttl,
            best_match: None,
        })
    }

    /// Refresh every tracked feature from the matched observation.
    ///
    /// Features absent from the observation (or non-finite there) keep their
    /// previous statistics.
    pub(crate) fn update(
        &mut self,
        observation: &Observation,
        alpha: f64,
        min_variance: f64,
        timestamp: Duration,
    ) {
        assert!(
            !self.features.is_empty(),
            "track {} has no features",
            self.id
        );

        for (name, stat) in self.features.iter_mut() {
            match observation.feature(name) {
                Some(value) if value.is_finite() => stat.update(value, alpha, min_variance),
                Some(value) => warn!(
                    "Track {}: skipping update of `{}` with non-finite value {}",
                    self.id, name, value
                ),
                None => warn!(
                    "Track {}: matched observation lacks `{}`, keeping previous statistics",
                    self.id, name
                ),
            }
        }
        self.last_seen = timestamp;
    }

    pub(crate) fn mark_tracked(&mut self, ttl: u32) {
        self.state = TrackState::Tracked;
        self.ttl = ttl;
    }

    pub(crate) fn mark_lost(&mut self) {
        self.state = TrackState::Lost;
    }

    /// Whether an unmatched track has exhausted its disappearance allowance.
    ///
    /// For a frame allowance this consumes one frame of budget per call.
    pub(crate) fn expire(&mut self, now: Duration, allowance: DisappearanceAllowance) -> bool {
        match allowance {
            DisappearanceAllowance::Frames(_) => {
                if self.ttl == 0 {
                    true
                } else {
                    self.ttl -= 1;
                    false
                }
            }
            DisappearanceAllowance::Duration(grace) => now > self.last_seen.saturating_add(grace),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn state(&self) -> TrackState {
        self.state
    }

    #[inline]
    pub fn features(&self) -> &BTreeMap<String, FeatureStat> {
        &self.features
    }

    #[inline]
    pub fn feature(&self, name: &str) -> Option<&FeatureStat> {
        self.features.get(name)
    }

    /// Timestamp of the frame the track was spawned in.
    #[inline]
    pub fn first_seen(&self) -> Duration {
        self.first_seen
    }

    /// Timestamp of the last frame the track was matched (or spawned) in.
    #[inline]
    pub fn last_seen(&self) -> Duration {
        self.last_seen
    }

    /// Remaining unmatched frames under a frame-count allowance.
    #[inline]
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Index of the observation matched in the latest frame.
    #[inline]
    pub fn best_match(&self) -> Option<usize> {
        self.best_match
    }

    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            id: self.id,
            state: self.state,
            first_seen_ms: self.first_seen.as_millis() as u64,
            last_seen_ms: self.last_seen.as_millis() as u64,
            features: self.features.clone(),
        }
    }
}

/// Owned, serializable view of a track for downstream logging or rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub id: u64,
    pub state: TrackState,
    pub first_seen_ms: u64,
    pub last_seen_ms: u64,
    pub features: BTreeMap<String, FeatureStat>,
}

//! Tracker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tracker::feature_stat::MIN_VARIANCE;

/// Grace period a track survives without being matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisappearanceAllowance {
    /// Number of consecutive unmatched frames a track survives.
    Frames(u32),
    /// Time since the last match after which a track is removed.
    /// Serialized as integer milliseconds.
    Duration(#[serde(with = "millis")] Duration),
}

impl DisappearanceAllowance {
    /// Frame budget a track starts with (and is reset to on every match).
    pub(crate) fn frame_budget(&self) -> u32 {
        match self {
            Self::Frames(n) => *n,
            Self::Duration(_) => 0,
        }
    }
}

/// Configuration for the [`FeatureTracker`](crate::FeatureTracker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Ordered feature names compared by the match policy
    pub feature_names: Vec<String>,
    pub max_matching_distance: f64,
    /// Require the observation to prefer the track back
    pub symmetric_match: bool,
    /// Adaptation rate of the running statistics, in (0, 1]
    pub alpha: f64,
    pub disappearance: DisappearanceAllowance,
    /// Cap on live tracks; unmatched observations beyond it are dropped
    pub max_tracks: usize,
    /// Floor of every feature's squared variance
    pub min_variance: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            feature_names: vec!["x".to_string(), "y".to_string()],
            max_matching_distance: 1.0,
            symmetric_match: false,
            alpha: 0.1,
            disappearance: DisappearanceAllowance::Duration(Duration::from_millis(500)),
            max_tracks: 100,
            min_variance: MIN_VARIANCE,
        }
    }
}

impl TrackerConfig {
    /// Default configuration matching on the given features.
    pub fn with_features<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feature_names: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn max_matching_distance(mut self, distance: f64) -> Self {
        self.max_matching_distance = distance;
        self
    }

    pub fn symmetric_match(mut self, symmetric: bool) -> Self {
        self.symmetric_match = symmetric;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn disappearance(mut self, allowance: DisappearanceAllowance) -> Self {
        self.disappearance = allowance;
        self
    }

    pub fn max_tracks(mut self, max_tracks: usize) -> Self {
        self.max_tracks = max_tracks;
        self
    }

    pub fn min_variance(mut self, min_variance: f64) -> Self {
        self.min_variance = min_variance;
        self
    }

    /// Reject configurations the tracker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feature_names.is_empty() {
            return Err(ConfigError::EmptyFeatureNames);
        }
        for (i, name) in self.feature_names.iter().enumerate() {
            if self.feature_names[..i].contains(name) {
                return Err(ConfigError::DuplicateFeatureName(name.clone()));
            }
        }
        if self.alpha.is_nan() || self.alpha <= 0.0 || self.alpha > 1.0 {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        if self.max_matching_distance.is_nan() || self.max_matching_distance < 0.0 {
            return Err(ConfigError::InvalidMatchingDistance(self.max_matching_distance));
        }
        if !self.min_variance.is_finite() || self.min_variance <= 0.0 {
            return Err(ConfigError::InvalidMinVariance(self.min_variance));
        }
        if self.max_tracks == 0 {
            return Err(ConfigError::ZeroMaxTracks);
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(TrackerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_empty_features() {
        let config = TrackerConfig::with_features(Vec::<String>::new());
        assert_eq!(config.validate(), Err(ConfigError::EmptyFeatureNames));
    }

    #[test]
    fn test_rejects_duplicate_features() {
        let config = TrackerConfig::with_features(["x", "y", "x"]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateFeatureName("x".to_string()))
        );
    }

    #[test]
    fn test_rejects_bad_alpha() {
        for alpha in [0.0, -0.5, 1.5, f64::NAN] {
            let config = TrackerConfig::default().alpha(alpha);
            assert!(matches!(config.validate(), Err(ConfigError::InvalidAlpha(_))));
        }
        assert_eq!(TrackerConfig::default().alpha(1.0).validate(), Ok(()));
    }

    #[test]
    fn test_rejects_negative_distance() {
        let config = TrackerConfig::default().max_matching_distance(-0.1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidMatchingDistance(-0.1))
        );
        assert_eq!(
            TrackerConfig::default().max_matching_distance(0.0).validate(),
            Ok(())
        );
    }

    #[test]
    fn test_rejects_bad_floor_and_capacity() {
        assert_eq!(
            TrackerConfig::default().min_variance(0.0).validate(),
            Err(ConfigError::InvalidMinVariance(0.0))
        );
        assert_eq!(
            TrackerConfig::default().max_tracks(0).validate(),
            Err(ConfigError::ZeroMaxTracks)
        );
    }
}

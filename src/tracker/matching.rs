//! Distance metric and greedy acceptance rule pairing tracks with observations.

use ndarray::{Array2, ArrayView1};

use crate::error::ConfigError;
use crate::tracker::config::TrackerConfig;
use crate::tracker::observation::Observation;
use crate::tracker::track::Track;

/// Comparison and acceptance rule used by the tracker each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPolicy {
    feature_names: Vec<String>,
    max_matching_distance: f64,
    symmetric_match: bool,
}

impl MatchPolicy {
    pub fn new(
        feature_names: Vec<String>,
        max_matching_distance: f64,
        symmetric_match: bool,
    ) -> Result<Self, ConfigError> {
        if feature_names.is_empty() {
            return Err(ConfigError::EmptyFeatureNames);
        }
        if max_matching_distance.is_nan() || max_matching_distance < 0.0 {
            return Err(ConfigError::InvalidMatchingDistance(max_matching_distance));
        }
        Ok(Self {
            feature_names,
            max_matching_distance,
            symmetric_match,
        })
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.feature_names.clone(),
            config.max_matching_distance,
            config.symmetric_match,
        )
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn max_matching_distance(&self) -> f64 {
        self.max_matching_distance
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric_match
    }

    /// Variance-normalized distance between a track and an observation.
    ///
    /// The track side contributes the feature's last raw value, not its
    /// running mean; the running variance only scales each term. A feature
    /// missing on either side makes the pair unmatchable (`f64::INFINITY`).
    pub fn distance(&self, track: &Track, observation: &Observation) -> f64 {
        let mut sum = 0.0;
        for name in &self.feature_names {
            let (Some(stat), Some(value)) = (track.feature(name), observation.feature(name)) else {
                return f64::INFINITY;
            };
            if !value.is_finite() {
                return f64::INFINITY;
            }
            let diff = stat.value() - value;
            sum += diff * diff / stat.sq_variance();
        }
        sum.sqrt() / self.feature_names.len() as f64
    }

    #[inline]
    pub fn is_admissible(&self, distance: f64) -> bool {
        distance < self.max_matching_distance
    }

    /// Distances between every track (rows) and every observation (columns).
    pub fn distance_matrix<'a, I>(&self, tracks: I, observations: &[Observation]) -> Array2<f64>
    where
        I: ExactSizeIterator<Item = &'a Track>,
    {
        let mut dists = Array2::from_elem((tracks.len(), observations.len()), f64::INFINITY);
        for (i, track) in tracks.enumerate() {
            for (j, obs) in observations.iter().enumerate() {
                dists[[i, j]] = self.distance(track, obs);
            }
        }
        dists
    }

    /// Greedy nearest-match assignment over a distance matrix.
    ///
    /// Rows are visited in order, so earlier rows win contested columns. Each
    /// row only considers its nearest column over all columns, consumed or
    /// not; a consumed or inadmissible nearest column leaves the row
    /// unmatched.
    pub fn greedy_assignment(&self, dists: &Array2<f64>) -> AssignmentResult {
        let (num_rows, num_cols) = dists.dim();
        let mut consumed = vec![false; num_cols];
        let mut matches = Vec::new();
        let mut unmatched_tracks = Vec::new();

        for row in 0..num_rows {
            let accepted = argmin(dists.row(row)).filter(|&col| {
                !consumed[col]
                    && self.is_admissible(dists[[row, col]])
                    && (!self.symmetric_match || argmin(dists.column(col)) == Some(row))
            });

            match accepted {
                Some(col) => {
                    consumed[col] = true;
                    matches.push((row, col));
                }
                None => unmatched_tracks.push(row),
            }
        }

        let unmatched_observations = consumed
            .iter()
            .enumerate()
            .filter_map(|(j, &c)| if c { None } else { Some(j) })
            .collect();

        AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_observations,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(track row, observation column)` pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_observations: Vec<usize>,
}

/// Index of the smallest entry, first one on ties. NaN never wins.
fn argmin(values: ArrayView1<'_, f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::feature_stat::MIN_VARIANCE;
    use ndarray::array;
    use std::time::Duration;

    fn policy(threshold: f64, symmetric: bool) -> MatchPolicy {
        let names = vec!["x".to_string()];
        MatchPolicy::new(names, threshold, symmetric).unwrap()
    }

    fn spawn(obs: &Observation) -> Track {
        Track::spawn(1, obs, Duration::ZERO, 0, MIN_VARIANCE).unwrap()
    }

    fn track_at(x: f64) -> Track {
        spawn(&Observation::from_pairs([("x", x)]))
    }

    #[test]
    fn test_rejects_empty_feature_list() {
        assert_eq!(
            MatchPolicy::new(vec![], 1.0, false),
            Err(ConfigError::EmptyFeatureNames)
        );
    }

    #[test]
    fn test_distance_is_variance_normalized() {
        let names = vec!["x".to_string(), "y".to_string()];
        let policy = MatchPolicy::new(names, 10.0, false).unwrap();
        let track = spawn(&Observation::from_pairs([("x", 0.0), ("y", 0.0)]));
        let obs = Observation::from_pairs([("x", 0.3), ("y", 0.4)]);

        // sqrt((0.09 + 0.16) / 0.01) / 2
        let d = policy.distance(&track, &obs);
        assert!((d - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_distance_uses_last_value_not_mean() {
        let policy = policy(10.0, false);
        let mut track = track_at(0.0);
        let moved = Observation::from_pairs([("x", 1.0)]);
        track.update(&moved, 0.1, MIN_VARIANCE, Duration::ZERO);
        assert!((track.feature("x").unwrap().mean() - 0.1).abs() < 1e-12);

        let d = policy.distance(&track, &Observation::from_pairs([("x", 1.0)]));
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_non_finite_observation_value_is_infinite() {
        let policy = policy(10.0, false);
        let track = track_at(0.0);
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let d = policy.distance(&track, &Observation::from_pairs([("x", value)]));
            assert_eq!(d, f64::INFINITY);
            assert!(!policy.is_admissible(d));
        }
    }

    #[test]
    fn test_missing_feature_is_infinite() {
        let policy = policy(10.0, false);
        let track = track_at(0.0);
        let d = policy.distance(&track, &Observation::from_pairs([("y", 0.0)]));
        assert_eq!(d, f64::INFINITY);
        assert!(!policy.is_admissible(d));
    }

    #[test]
    fn test_greedy_older_row_wins() {
        let dists = array![[0.2, 0.9], [0.1, 0.3]];
        let result = policy(1.0, false).greedy_assignment(&dists);

        // Row 1's nearest column is already consumed; it does not fall back to column 1.
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_tracks, vec![1]);
        assert_eq!(result.unmatched_observations, vec![1]);
    }

    #[test]
    fn test_symmetric_rejects_stolen_observation() {
        let dists = array![[0.2], [0.05]];
        let result = policy(1.0, true).greedy_assignment(&dists);

        assert_eq!(result.matches, vec![(1, 0)]);
        assert_eq!(result.unmatched_tracks, vec![0]);
        assert!(result.unmatched_observations.is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        let dists = array![[0.5]];
        let strict = policy(0.5, false);
        assert!(strict.greedy_assignment(&dists).matches.is_empty());
        let loose = policy(0.6, false);
        assert_eq!(loose.greedy_assignment(&dists).matches, vec![(0, 0)]);
    }

    #[test]
    fn test_empty_matrices() {
        let policy = policy(1.0, false);

        let no_tracks = Array2::<f64>::zeros((0, 2));
        let result = policy.greedy_assignment(&no_tracks);
        assert_eq!(result.unmatched_observations, vec![0, 1]);

        let no_obs = Array2::<f64>::zeros((2, 0));
        let result = policy.greedy_assignment(&no_obs);
        assert_eq!(result.unmatched_tracks, vec![0, 1]);
    }

    #[test]
    fn test_argmin_skips_nan_and_keeps_first_tie() {
        let values = array![f64::NAN, 0.3, 0.1, 0.1];
        assert_eq!(argmin(values.view()), Some(2));
        let all_nan = array![f64::NAN];
        assert_eq!(argmin(all_nan.view()), None);
    }
}

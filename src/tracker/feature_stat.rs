//! Running statistics of a single named feature.

use serde::{Deserialize, Serialize};

/// Default floor for the squared variance of a feature.
pub const MIN_VARIANCE: f64 = 0.01;

/// Exponentially updated statistics of one feature within one track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStat {
    value: f64,
    mean: f64,
    sq_variance: f64,
    initial: f64,
    min: f64,
    max: f64,
    sample_count: u64,
}

impl FeatureStat {
    /// Seed the statistics from the first observed value.
    pub fn new(value: f64, min_variance: f64) -> Self {
        Self {
            value,
            mean: value,
            sq_variance: min_variance,
            initial: value,
            min: value,
            max: value,
            sample_count: 1,
        }
    }

    /// Fold a new sample in with adaptation rate `alpha`.
    ///
    /// The variance term is computed against the already updated mean and is
    /// clamped to `min_variance`.
    pub fn update(&mut self, new_value: f64, alpha: f64, min_variance: f64) {
        self.value = new_value;
        self.mean = self.mean * (1.0 - alpha) + new_value * alpha;

        let deviation = new_value - self.mean;
        let sq_variance = self.sq_variance * (1.0 - alpha) + deviation * deviation * alpha;
        self.sq_variance = sq_variance.max(min_variance);
        debug_assert!(self.sq_variance >= min_variance);

        self.min = self.min.min(new_value);
        self.max = self.max.max(new_value);
        self.sample_count += 1;
    }

    /// Most recent raw value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    #[inline]
    pub fn sq_variance(&self) -> f64 {
        self.sq_variance
    }

    /// Value the track was spawned with.
    #[inline]
    pub fn initial(&self) -> f64 {
        self.initial
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_seeds_every_field() {
        let stat = FeatureStat::new(0.25, MIN_VARIANCE);
        assert_eq!(stat.value(), 0.25);
        assert_eq!(stat.mean(), 0.25);
        assert_eq!(stat.initial(), 0.25);
        assert_eq!(stat.min(), 0.25);
        assert_eq!(stat.max(), 0.25);
        assert_eq!(stat.sq_variance(), MIN_VARIANCE);
        assert_eq!(stat.sample_count(), 1);
    }

    #[test]
    fn test_update_moves_mean_towards_sample() {
        let mut stat = FeatureStat::new(0.0, MIN_VARIANCE);
        stat.update(1.0, 0.5, MIN_VARIANCE);

        assert_eq!(stat.value(), 1.0);
        assert!((stat.mean() - 0.5).abs() < 1e-12);
        // 0.01 * 0.5 + (1.0 - 0.5)^2 * 0.5
        assert!((stat.sq_variance() - 0.13).abs() < 1e-12);
        assert_eq!(stat.min(), 0.0);
        assert_eq!(stat.max(), 1.0);
        assert_eq!(stat.initial(), 0.0);
        assert_eq!(stat.sample_count(), 2);
    }

    #[test]
    fn test_variance_floor_on_constant_stream() {
        let mut stat = FeatureStat::new(3.0, MIN_VARIANCE);
        for _ in 0..1000 {
            stat.update(3.0, 0.3, MIN_VARIANCE);
            assert!(stat.sq_variance() >= MIN_VARIANCE);
        }
        assert!((stat.mean() - 3.0).abs() < 1e-9);
        assert_eq!(stat.sample_count(), 1001);
    }

    #[test]
    fn test_alpha_one_follows_latest_value() {
        let mut stat = FeatureStat::new(2.0, MIN_VARIANCE);
        stat.update(-4.0, 1.0, MIN_VARIANCE);
        assert_eq!(stat.mean(), -4.0);
        assert_eq!(stat.sq_variance(), MIN_VARIANCE);
        assert_eq!(stat.min(), -4.0);
        assert_eq!(stat.max(), 2.0);
    }
}

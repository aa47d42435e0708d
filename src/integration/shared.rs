//! A tracker shared between pipeline stages running on different threads.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::TrackerError;
use crate::tracker::{
    FeatureTracker, Observation, TrackSnapshot, TrackedObservation, TrackerConfig,
};

/// Cloneable handle around a single [`FeatureTracker`].
///
/// All phases of a frame mutate the same track set, so the whole `process`
/// call runs under one lock. If a frame panics the lock is poisoned and every
/// later call fails with [`TrackerError::Poisoned`].
#[derive(Clone)]
pub struct SharedTracker {
    inner: Arc<Mutex<FeatureTracker>>,
}

impl SharedTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        Ok(Self::from_tracker(FeatureTracker::new(config)?))
    }

    pub fn from_tracker(tracker: FeatureTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, FeatureTracker>, TrackerError> {
        self.inner.lock().map_err(|_| TrackerError::Poisoned)
    }

    pub fn process(
        &self,
        timestamp: Duration,
        observations: Vec<Observation>,
    ) -> Result<Vec<TrackedObservation>, TrackerError> {
        Ok(self.lock()?.process(timestamp, observations))
    }

    pub fn snapshot(&self) -> Result<Vec<TrackSnapshot>, TrackerError> {
        Ok(self.lock()?.snapshot())
    }

    /// Run `f` with exclusive access to the tracker.
    pub fn with_tracker<R>(
        &self,
        f: impl FnOnce(&FeatureTracker) -> R,
    ) -> Result<R, TrackerError> {
        let tracker = self.lock()?;
        Ok(f(&*tracker))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_shared_across_threads() {
        let config = TrackerConfig::with_features(["x"]);
        let shared = SharedTracker::new(config).unwrap();

        let handles: Vec<_> = (0..4u64)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let obs = Observation::from_pairs([("x", i as f64 * 100.0)]);
                    shared.process(Duration::from_millis(i), vec![obs]).unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ids: Vec<u64> = shared.snapshot().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_poisoned_after_panic() {
        let config = TrackerConfig::with_features(["x"]);
        let shared = SharedTracker::new(config).unwrap();

        let poisoner = shared.clone();
        let result = thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("frame aborted");
        })
        .join();
        assert!(result.is_err());

        assert!(matches!(
            shared.process(Duration::ZERO, vec![]),
            Err(TrackerError::Poisoned)
        ));
        assert!(matches!(
            shared.with_tracker(|t| t.len()),
            Err(TrackerError::Poisoned)
        ));
    }
}

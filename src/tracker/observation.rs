//! Per-frame observations consumed and emitted by the tracker.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tracker::rect::Rect;

/// One detected object in the current frame.
///
/// Carries no identity of its own; the tracker attaches one when it emits a
/// [`TrackedObservation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Named scalar features (position, size, colour, ...)
    pub features: BTreeMap<String, f64>,
    /// Position and size of the object, not used for matching
    pub spatial: Option<Rect>,
}

impl Observation {
    pub fn new(features: BTreeMap<String, f64>) -> Self {
        Self {
            features,
            spatial: None,
        }
    }

    /// Build an observation from `(name, value)` pairs. Later duplicates win.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn with_spatial(mut self, spatial: Rect) -> Self {
        self.spatial = Some(spatial);
        self
    }

    #[inline]
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }
}

/// An observation annotated with the id of the track it belongs to.
///
/// `track_id` is `None` only when the observation was dropped: either the
/// tracker was at capacity, or the observation lacked a finite value for one
/// of the matched features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObservation {
    pub observation: Observation,
    pub track_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let obs = Observation::from_pairs([("x", 0.5), ("y", 0.25), ("x", 0.75)]);
        assert_eq!(obs.features.len(), 2);
        assert_eq!(obs.feature("x"), Some(0.75));
        assert_eq!(obs.feature("y"), Some(0.25));
        assert_eq!(obs.feature("z"), None);
        assert!(obs.spatial.is_none());
    }

    #[test]
    fn test_with_spatial() {
        let rect = Rect::new(0.0, 0.0, 2.0, 2.0);
        let obs = Observation::from_pairs([("x", 1.0)]).with_spatial(rect);
        assert_eq!(obs.spatial.map(|r| r.area()), Some(4.0));
    }
}

mod config;
mod feature_stat;
mod feature_tracker;
mod matching;
mod observation;
mod rect;
mod track;
mod track_state;

pub use config::{DisappearanceAllowance, TrackerConfig};
pub use feature_stat::{FeatureStat, MIN_VARIANCE};
pub use feature_tracker::{FeatureTracker, FrameStats};
pub use matching::{AssignmentResult, MatchPolicy};
pub use observation::{Observation, TrackedObservation};
pub use rect::Rect;
pub use track::{Track, TrackSnapshot};
pub use track_state::TrackState;

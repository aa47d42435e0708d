use serde::{Deserialize, Serialize};

/// Track state within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackState {
    /// Spawned from an unmatched observation this frame
    #[default]
    New,
    /// Matched an observation this frame
    Tracked,
    /// Alive but not matched this frame
    Lost,
}

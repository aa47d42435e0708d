//! Integration module for connecting observation producers with the tracker.
//!
//! This module provides the trait upstream detection stages implement, a
//! builder for observations, a pull-based pipeline and a mutex-guarded
//! tracker for pipelines that share one tracker between threads.

mod builder;
mod detector;
mod pipeline;
mod shared;

pub use builder::ObservationBuilder;
pub use detector::{Frame, IntoObservations, ObservationSource};
pub use pipeline::TrackerPipeline;
pub use shared::SharedTracker;

//! Builder for creating Observation objects from detector outputs.

use std::collections::BTreeMap;

use crate::tracker::{Observation, Rect};

/// Builder for creating `Observation` objects.
///
/// Besides arbitrary named features it offers shortcuts that describe a
/// bounding box both as the spatial summary and as the conventional `x`,
/// `y`, `width` and `height` features.
#[derive(Debug, Clone, Default)]
pub struct ObservationBuilder {
    features: BTreeMap<String, f64>,
    spatial: Option<Rect>,
}

impl ObservationBuilder {
    /// Create a new observation builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named feature, replacing any previous value.
    pub fn feature(mut self, name: impl Into<String>, value: f64) -> Self {
        self.features.insert(name.into(), value);
        self
    }

    /// Set the spatial summary only. Matching does not use it.
    pub fn spatial(mut self, rect: Rect) -> Self {
        self.spatial = Some(rect);
        self
    }

    /// Describe the object by its bounding box in TLBR format (x1, y1, x2, y2).
    ///
    /// Sets the spatial summary and the `x`, `y` (centre), `width` and
    /// `height` features.
    pub fn tlbr(self, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        self.bbox(Rect::from_tlbr(x1, y1, x2, y2))
    }

    /// Describe the object by its bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(self, cx: f64, cy: f64, w: f64, h: f64) -> Self {
        self.bbox(Rect::from_center(cx, cy, w, h))
    }

    fn bbox(self, rect: Rect) -> Self {
        let (cx, cy) = rect.center();
        self.feature("x", cx)
            .feature("y", cy)
            .feature("width", rect.width)
            .feature("height", rect.height)
            .spatial(rect)
    }

    /// Build the final `Observation`.
    pub fn build(self) -> Observation {
        Observation {
            features: self.features,
            spatial: self.spatial,
        }
    }
}

//! Plain positioned layers: rectangles, ellipses, text and sticky notes.

use super::Color;
use crate::geometry::Xywh;
use serde::{Deserialize, Serialize};

/// Rectangle or ellipse inscribed in its bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeLayer {
    pub bounds: Xywh,
    pub fill: Color,
}

/// Free text or a sticky note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub bounds: Xywh,
    pub fill: Color,
    /// Text content (empty until the user types).
    #[serde(default)]
    pub value: String,
}

impl TextLayer {
    pub fn new(bounds: Xywh, fill: Color) -> Self {
        Self {
            bounds,
            fill,
            value: String::new(),
        }
    }
}

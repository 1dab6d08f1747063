//! Image layers (generated covers) and their text overlays.

use super::Color;
use crate::geometry::Xywh;
use serde::{Deserialize, Serialize};

/// Title or author text placed over an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub fill: Color,
    /// Offset from the image's top-left corner.
    pub offset_x: f64,
    pub offset_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    pub bounds: Xywh,
    pub fill: Color,
    /// Image URL; empty until a generated cover is dropped in.
    #[serde(default)]
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
}

impl ImageLayer {
    pub fn new(bounds: Xywh, fill: Color) -> Self {
        Self {
            bounds,
            fill,
            src: String::new(),
            overlay: None,
        }
    }
}

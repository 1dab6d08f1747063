//! AI "message" nodes that drive cover generation.

use super::Color;
use crate::geometry::Xywh;
use serde::{Deserialize, Serialize};

/// A prompt node on the board.
///
/// Once `content` is non-empty the message counts as sent; its generated
/// images arrive later through the generation relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageLayer {
    pub bounds: Xywh,
    pub fill: Color,
    #[serde(default)]
    pub content: String,
    /// Task id handed back by the generation service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Result image URLs, in the order the service returned them.
    #[serde(default)]
    pub images: Vec<String>,
}

impl MessageLayer {
    pub fn new(bounds: Xywh, fill: Color) -> Self {
        Self {
            bounds,
            fill,
            content: String::new(),
            task_id: None,
            images: Vec::new(),
        }
    }

    pub fn is_sent(&self) -> bool {
        !self.content.is_empty()
    }
}

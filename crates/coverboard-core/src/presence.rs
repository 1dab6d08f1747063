//! Per-user ephemeral state broadcast to other participants.

use crate::layers::{Color, LayerId, PenPoint};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Presence of the local user.
///
/// Never stored in the shared document and never part of undo history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    /// Cursor in canvas coordinates, `None` when the pointer left the canvas.
    pub cursor: Option<Point>,
    /// Selected layer ids.
    pub selection: Vec<LayerId>,
    /// In-progress freehand stroke.
    pub pencil_draft: Option<Vec<PenPoint>>,
    pub pen_color: Color,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Serialize for broadcasting.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a peer's presence.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_json() {
        let presence = Presence {
            cursor: Some(Point::new(4.0, 2.0)),
            selection: vec!["a".into()],
            pencil_draft: Some(vec![[1.0, 2.0, 0.5]]),
            pen_color: Color::new(9, 8, 7),
        };
        let json = presence.to_json().expect("serialize");
        assert_eq!(Presence::from_json(&json).expect("deserialize"), presence);
        assert!(presence.is_selected("a"));
        assert!(!presence.is_selected("b"));
    }

    #[test]
    fn test_default_presence_is_empty() {
        let presence = Presence::new();
        assert!(presence.cursor.is_none());
        assert!(presence.selection.is_empty());
        assert!(presence.pencil_draft.is_none());
    }
}

//! Input events delivered to the canvas.

use crate::layers::{LayerId, LayerKind};
use crate::selection::HandleKind;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

fn default_pressure() -> f64 {
    0.5
}

/// A pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub position: Point,
    #[serde(default = "default_pressure")]
    pub pressure: f64,
    /// Whether the primary button is held.
    #[serde(default)]
    pub primary_down: bool,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            pressure: default_pressure(),
            primary_down: false,
            modifiers: Modifiers::default(),
        }
    }

    pub fn pressed(mut self) -> Self {
        self.primary_down = true;
        self
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keys the canvas reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Char(char),
}

/// Toolbar selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Select,
    Insert(LayerKind),
    Pencil,
    /// Place a text overlay on the given image.
    Overlay(LayerId),
}

/// Everything the host can feed into [`crate::Canvas::handle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    PointerDown(PointerInput),
    PointerMove(PointerInput),
    PointerUp(PointerInput),
    PointerLeave,
    Wheel {
        position: Point,
        delta: Vec2,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    SelectTool {
        tool: Tool,
    },
    LayerPointerDown {
        layer_id: LayerId,
        input: PointerInput,
    },
    ResizeHandlePointerDown {
        handle: HandleKind,
        input: PointerInput,
    },
    ConnectionHandlePointerDown {
        layer_id: LayerId,
        input: PointerInput,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Corner;

    #[test]
    fn test_pointer_defaults() {
        let event: CanvasEvent = serde_json::from_str(r#"{"type": "pointer_down", "position": {"x": 1.0, "y": 2.0}}"#)
            .expect("parse");
        assert_eq!(event, CanvasEvent::PointerDown(PointerInput::new(Point::new(1.0, 2.0))));
    }

    #[test]
    fn test_event_script_parses() {
        let script = r#"[
            {"type": "select_tool", "tool": {"insert": "note"}},
            {"type": "select_tool", "tool": "pencil"},
            {"type": "key_down", "key": {"char": "z"}, "modifiers": {"ctrl": true}},
            {"type": "key_down", "key": "escape"},
            {"type": "wheel", "position": {"x": 0, "y": 0}, "delta": {"x": 0, "y": 10}},
            {"type": "resize_handle_pointer_down", "handle": {"corner": "bottom_right"},
             "input": {"position": {"x": 100, "y": 100}, "primary_down": true}},
            {"type": "pointer_leave"}
        ]"#;
        let events: Vec<CanvasEvent> = serde_json::from_str(script).expect("parse");
        assert_eq!(events.len(), 7);
        assert_eq!(events[0], CanvasEvent::SelectTool { tool: Tool::Insert(LayerKind::Note) });
        assert!(matches!(
            &events[2],
            CanvasEvent::KeyDown { key: Key::Char('z'), modifiers } if modifiers.command()
        ));
        assert!(matches!(
            &events[5],
            CanvasEvent::ResizeHandlePointerDown { handle: HandleKind::Corner(Corner::BottomRight), input }
                if input.primary_down
        ));
    }
}

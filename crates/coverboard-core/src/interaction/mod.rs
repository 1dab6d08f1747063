//! Pointer and keyboard interaction state machine.

mod canvas;

pub use canvas::Canvas;

use crate::geometry::Xywh;
use crate::layers::{LayerId, LayerKind};
use crate::selection::HandleKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// What the canvas is doing right now. Every point is in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CanvasMode {
    #[default]
    Idle,
    /// Pointer went down on empty canvas; a click or the start of a net.
    Pressing { origin: Point },
    /// Marquee selection in progress.
    SelectionNet { origin: Point, current: Point },
    /// Dragging the selection; `current` is the last applied pointer position.
    Translating { current: Point },
    Resizing { initial_bounds: Xywh, handle: HandleKind },
    /// Armed to insert a layer on the next pointer-up.
    Inserting { kind: LayerKind },
    /// Freehand drawing; the stroke lives in the presence draft.
    Pencil,
    /// Dragging a connector out of `start_layer_id`.
    Connecting {
        start_layer_id: LayerId,
        start_point: Point,
        current: Point,
    },
    /// Armed to place a text overlay on an image.
    AddingOverlay { image_id: LayerId },
}

impl CanvasMode {
    /// A gesture that owns the pointer until it is released.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            CanvasMode::Pressing { .. }
                | CanvasMode::SelectionNet { .. }
                | CanvasMode::Translating { .. }
                | CanvasMode::Resizing { .. }
                | CanvasMode::Connecting { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            CanvasMode::Idle => "idle",
            CanvasMode::Pressing { .. } => "pressing",
            CanvasMode::SelectionNet { .. } => "selection_net",
            CanvasMode::Translating { .. } => "translating",
            CanvasMode::Resizing { .. } => "resizing",
            CanvasMode::Inserting { .. } => "inserting",
            CanvasMode::Pencil => "pencil",
            CanvasMode::Connecting { .. } => "connecting",
            CanvasMode::AddingOverlay { .. } => "adding_overlay",
        }
    }
}

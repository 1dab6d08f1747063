//! Coverboard Core Library
//!
//! Interaction core of the Coverboard book-cover whiteboard: layers on a
//! shared CRDT document, the pointer/keyboard state machine, presence, and
//! SVG rendering.

pub mod camera;
pub mod config;
pub mod crdt;
pub mod document;
pub mod fonts;
pub mod generation;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod layers;
pub mod presence;
pub mod render;
pub mod selection;

pub use camera::Camera;
pub use config::{CanvasConfig, ConfigError};
pub use crdt::LoroDocument;
pub use document::{Document, DocumentError, DocumentResult, MemoryDocument};
pub use fonts::{FontRegistry, FontRequest};
pub use generation::{GenerationError, GenerationRequest, GenerationResult, GenerationTracker, Notification};
pub use geometry::Xywh;
pub use input::{CanvasEvent, Key, Modifiers, PointerInput, Tool};
pub use interaction::{Canvas, CanvasMode};
pub use layers::{Color, Layer, LayerId, LayerKind};
pub use presence::Presence;
pub use render::render_scene;
pub use selection::{HandleKind, selection_bounds};

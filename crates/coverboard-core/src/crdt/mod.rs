//! CRDT integration using Loro for collaborative editing.
//!
//! # Schema
//!
//! ```text
//! LoroDoc
//! ├── "layers": LoroMap<LayerId, LoroMap> (layer data)
//! └── "layer_ids": LoroList<String> (layer ids in z-order, back to front)
//! ```
//!
//! Each layer map carries a `"type"` tag, its bounds (`x`, `y`, `width`,
//! `height`) unless it is a connector, its fill (`fill_r`, `fill_g`,
//! `fill_b`) and kind-specific fields.

mod convert;
mod schema;

pub use convert::{layer_from_loro, layer_to_loro};
pub use schema::{DEFAULT_MAX_UNDO_STEPS, LAYER_IDS_KEY, LAYERS_KEY, LoroDocument};

// Re-export Loro types that may be useful for collaboration
pub use loro::{ExportMode, VersionVector};

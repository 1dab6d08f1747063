//! The shared layer document.
//!
//! The board state lives in an external, synchronized document: a map of
//! layer id to [`Layer`] plus an ordered list of ids that defines z-order
//! (back to front). [`Document`] is the capability the interaction layer is
//! handed; [`MemoryDocument`] is a local implementation and
//! [`crate::crdt::LoroDocument`] the collaborative one.

use crate::layers::{Layer, LayerId};
use std::collections::HashMap;
use thiserror::Error;

/// Undo states kept when no limit is configured.
pub const MAX_UNDO_HISTORY: usize = 100;

/// Document errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Layer not found: {0}")]
    NotFound(String),
    #[error("CRDT error: {0}")]
    Crdt(#[from] loro::LoroError),
    #[error("Malformed layer data: {0}")]
    Malformed(String),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Capability over the shared layer document.
///
/// Writes are grouped into atomic changes: everything between two calls to
/// [`Document::commit`] forms one change and one undo step. While history is
/// paused, every commit up to [`Document::resume_history`] merges into a
/// single undo step.
pub trait Document {
    /// Get a layer by id.
    fn layer(&self, id: &str) -> Option<Layer>;

    /// Layer ids in z-order (back to front).
    fn layer_ids(&self) -> Vec<LayerId>;

    /// Number of layers in the document.
    fn layer_count(&self) -> usize;

    /// Set a new layer and append its id to the order.
    fn insert_layer(&mut self, id: &str, layer: &Layer) -> DocumentResult<()>;

    /// Replace an existing layer.
    fn update_layer(&mut self, id: &str, layer: &Layer) -> DocumentResult<()>;

    /// Delete a layer and drop its id from the order.
    fn remove_layer(&mut self, id: &str) -> DocumentResult<()>;

    /// Move a layer id to `index` in the order (clamped to the end).
    fn move_layer(&mut self, id: &str, index: usize) -> DocumentResult<()>;

    /// Close the current atomic change.
    fn commit(&mut self);

    /// Start merging commits into one undo step.
    fn pause_history(&mut self);

    /// Stop merging commits; the merged step becomes undoable.
    fn resume_history(&mut self);

    /// Undo the last local change. Returns true if something was undone.
    fn undo(&mut self) -> bool;

    /// Redo the last undone change. Returns true if something was redone.
    fn redo(&mut self) -> bool;

    /// Number of steps [`Document::undo`] can revert.
    fn undo_count(&self) -> usize;

    /// Number of steps [`Document::redo`] can reapply.
    fn redo_count(&self) -> usize;

    fn can_undo(&self) -> bool {
        self.undo_count() > 0
    }

    fn can_redo(&self) -> bool {
        self.redo_count() > 0
    }

    /// Run `f` as one atomic change.
    fn mutate<R>(&mut self, f: impl FnOnce(&mut Self) -> DocumentResult<R>) -> DocumentResult<R>
    where
        Self: Sized,
    {
        let result = f(self);
        self.commit();
        result
    }

    /// Position of a layer in the order.
    fn index_of(&self, id: &str) -> Option<usize> {
        self.layer_ids().iter().position(|layer_id| layer_id == id)
    }

    /// Bring a layer to the front (topmost).
    fn bring_to_front(&mut self, id: &str) -> DocumentResult<()> {
        let last = self.layer_count().saturating_sub(1);
        self.move_layer(id, last)
    }

    /// Send a layer to the back (bottommost).
    fn send_to_back(&mut self, id: &str) -> DocumentResult<()> {
        self.move_layer(id, 0)
    }

    /// Move a layer one step towards the front.
    /// Returns true if the layer moved, false if it was already at the front.
    fn bring_forward(&mut self, id: &str) -> DocumentResult<bool> {
        let pos = self.index_of(id).ok_or_else(|| DocumentError::NotFound(id.to_string()))?;
        if pos + 1 >= self.layer_count() {
            return Ok(false);
        }
        self.move_layer(id, pos + 1)?;
        Ok(true)
    }

    /// Move a layer one step towards the back.
    /// Returns true if the layer moved, false if it was already at the back.
    fn send_backward(&mut self, id: &str) -> DocumentResult<bool> {
        let pos = self.index_of(id).ok_or_else(|| DocumentError::NotFound(id.to_string()))?;
        if pos == 0 {
            return Ok(false);
        }
        self.move_layer(id, pos - 1)?;
        Ok(true)
    }
}

/// A snapshot of document state for undo/redo.
#[derive(Debug, Clone, PartialEq)]
struct DocumentSnapshot {
    layers: HashMap<LayerId, Layer>,
    order: Vec<LayerId>,
}

/// In-process document with snapshot-based undo.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    layers: HashMap<LayerId, Layer>,
    order: Vec<LayerId>,
    /// State before the first write of the open change.
    pending: Option<DocumentSnapshot>,
    paused: bool,
    undo_stack: Vec<DocumentSnapshot>,
    redo_stack: Vec<DocumentSnapshot>,
    max_undo_steps: usize,
}

impl MemoryDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::with_history(MAX_UNDO_HISTORY)
    }

    /// Create an empty document keeping at most `max_undo_steps` undo states.
    pub fn with_history(max_undo_steps: usize) -> Self {
        Self {
            layers: HashMap::new(),
            order: Vec::new(),
            pending: None,
            paused: false,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_steps,
        }
    }

    fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            layers: self.layers.clone(),
            order: self.order.clone(),
        }
    }

    fn restore(&mut self, snapshot: DocumentSnapshot) {
        self.layers = snapshot.layers;
        self.order = snapshot.order;
    }

    /// Record the pre-change state on the first write of a change.
    fn before_write(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.snapshot());
        }
    }

    fn push_undo(&mut self, snapshot: DocumentSnapshot) {
        if snapshot == self.snapshot() {
            return;
        }
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.max_undo_steps {
            self.undo_stack.remove(0);
        }
    }

    /// Layers in z-order (back to front).
    pub fn layers_ordered(&self) -> impl Iterator<Item = (&LayerId, &Layer)> {
        self.order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|layer| (id, layer)))
    }
}

impl Document for MemoryDocument {
    fn layer(&self, id: &str) -> Option<Layer> {
        self.layers.get(id).cloned()
    }

    fn layer_ids(&self) -> Vec<LayerId> {
        self.order.clone()
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn insert_layer(&mut self, id: &str, layer: &Layer) -> DocumentResult<()> {
        self.before_write();
        if self.layers.insert(id.to_string(), layer.clone()).is_none() {
            self.order.push(id.to_string());
        }
        Ok(())
    }

    fn update_layer(&mut self, id: &str, layer: &Layer) -> DocumentResult<()> {
        if !self.layers.contains_key(id) {
            return Err(DocumentError::NotFound(id.to_string()));
        }
        self.before_write();
        self.layers.insert(id.to_string(), layer.clone());
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> DocumentResult<()> {
        if !self.layers.contains_key(id) {
            return Err(DocumentError::NotFound(id.to_string()));
        }
        self.before_write();
        self.layers.remove(id);
        self.order.retain(|layer_id| layer_id != id);
        Ok(())
    }

    fn move_layer(&mut self, id: &str, index: usize) -> DocumentResult<()> {
        let pos = self.index_of(id).ok_or_else(|| DocumentError::NotFound(id.to_string()))?;
        self.before_write();
        let layer_id = self.order.remove(pos);
        let index = index.min(self.order.len());
        self.order.insert(index, layer_id);
        Ok(())
    }

    fn commit(&mut self) {
        if self.paused {
            return;
        }
        if let Some(snapshot) = self.pending.take() {
            self.push_undo(snapshot);
        }
    }

    fn pause_history(&mut self) {
        self.commit();
        self.paused = true;
    }

    fn resume_history(&mut self) {
        self.paused = false;
        self.commit();
    }

    fn undo(&mut self) -> bool {
        self.resume_history();
        if let Some(snapshot) = self.undo_stack.pop() {
            let current = self.snapshot();
            self.redo_stack.push(current);
            self.restore(snapshot);
            true
        } else {
            false
        }
    }

    fn redo(&mut self) -> bool {
        self.resume_history();
        if let Some(snapshot) = self.redo_stack.pop() {
            let current = self.snapshot();
            self.undo_stack.push(current);
            self.restore(snapshot);
            true
        } else {
            false
        }
    }

    fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

//! Loro document schema and the [`Document`] implementation on top of it.

use super::convert::{layer_from_loro, layer_to_loro};
use crate::document::{Document, DocumentError, DocumentResult};
use crate::layers::{Layer, LayerId};
use loro::{ExportMode, LoroDoc, LoroList, LoroMap, LoroResult, LoroValue, UndoManager, ValueOrContainer};

/// Key for the layers map in the document.
pub const LAYERS_KEY: &str = "layers";
/// Key for the layer order list in the document.
pub const LAYER_IDS_KEY: &str = "layer_ids";

/// Default number of undo steps kept by the undo manager.
pub const DEFAULT_MAX_UNDO_STEPS: usize = 100;

/// A CRDT-backed layer document for collaborative editing.
///
/// Wraps a `LoroDoc` plus an `UndoManager` that tracks only this peer's
/// changes. Pausing history maps onto undo groups.
pub struct LoroDocument {
    doc: LoroDoc,
    undo_manager: UndoManager,
    history_paused: bool,
}

impl LoroDocument {
    /// Create a new empty document with default history settings.
    pub fn new() -> Self {
        Self::with_history(DEFAULT_MAX_UNDO_STEPS, 0)
    }

    /// Create a new empty document.
    ///
    /// Commits closer together than `merge_interval_ms` share an undo step;
    /// `0` keeps every commit separate.
    pub fn with_history(max_undo_steps: usize, merge_interval_ms: i64) -> Self {
        Self::from_doc(LoroDoc::new(), max_undo_steps, merge_interval_ms)
    }

    /// Create a document from a snapshot.
    pub fn from_snapshot(bytes: &[u8]) -> LoroResult<Self> {
        let doc = LoroDoc::new();
        doc.import(bytes)?;
        Ok(Self::from_doc(doc, DEFAULT_MAX_UNDO_STEPS, 0))
    }

    fn from_doc(doc: LoroDoc, max_undo_steps: usize, merge_interval_ms: i64) -> Self {
        let mut undo_manager = UndoManager::new(&doc);
        undo_manager.set_max_undo_steps(max_undo_steps);
        undo_manager.set_merge_interval(merge_interval_ms);
        Self {
            doc,
            undo_manager,
            history_paused: false,
        }
    }

    /// Get the underlying LoroDoc.
    pub fn loro_doc(&self) -> &LoroDoc {
        &self.doc
    }

    /// Peer id of this replica.
    pub fn peer_id(&self) -> u64 {
        self.doc.peer_id()
    }

    fn layers_map(&self) -> LoroMap {
        self.doc.get_map(LAYERS_KEY)
    }

    fn layer_ids_list(&self) -> LoroList {
        self.doc.get_list(LAYER_IDS_KEY)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers_map().get(id).is_some()
    }

    fn write_layer(&self, id: &str, layer: &Layer) -> DocumentResult<()> {
        let layers = self.layers_map();
        if layers.get(id).is_some() {
            layers.delete(id)?;
        }
        let layer_map = layers.insert_container(id, LoroMap::new())?;
        layer_to_loro(layer, &layer_map)?;
        Ok(())
    }

    fn position_in_list(list: &LoroList, id: &str) -> Option<usize> {
        (0..list.len()).find(|&i| {
            matches!(
                list.get(i),
                Some(ValueOrContainer::Value(LoroValue::String(s))) if s.as_ref() == id
            )
        })
    }

    /// Export the document as a snapshot (full state).
    pub fn export_snapshot(&self) -> Vec<u8> {
        self.doc.export(ExportMode::Snapshot).unwrap_or_default()
    }

    /// Export incremental updates since a version.
    pub fn export_updates(&self, since: &loro::VersionVector) -> Vec<u8> {
        self.doc.export(ExportMode::updates(since)).unwrap_or_default()
    }

    /// Import updates or a snapshot from another peer.
    pub fn import(&mut self, bytes: &[u8]) -> DocumentResult<()> {
        self.doc.import(bytes)?;
        Ok(())
    }

    /// Get the current version vector.
    pub fn version(&self) -> loro::VersionVector {
        self.doc.oplog_vv()
    }

    /// Clear undo/redo history.
    pub fn clear_undo_history(&self) {
        self.undo_manager.clear();
    }
}

impl Default for LoroDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for LoroDocument {
    fn layer(&self, id: &str) -> Option<Layer> {
        match self.layers_map().get_deep_value() {
            LoroValue::Map(map) => match map.get(id)? {
                LoroValue::Map(layer_map) => layer_from_loro(layer_map),
                _ => None,
            },
            _ => None,
        }
    }

    fn layer_ids(&self) -> Vec<LayerId> {
        let list = self.layer_ids_list();
        let mut result = Vec::with_capacity(list.len());
        for i in 0..list.len() {
            if let Some(ValueOrContainer::Value(LoroValue::String(id))) = list.get(i) {
                result.push(id.to_string());
            }
        }
        result
    }

    fn layer_count(&self) -> usize {
        self.layers_map().len()
    }

    fn insert_layer(&mut self, id: &str, layer: &Layer) -> DocumentResult<()> {
        let is_new = !self.has_layer(id);
        self.write_layer(id, layer)?;
        if is_new {
            self.layer_ids_list().push(LoroValue::String(id.to_string().into()))?;
        }
        Ok(())
    }

    fn update_layer(&mut self, id: &str, layer: &Layer) -> DocumentResult<()> {
        if !self.has_layer(id) {
            return Err(DocumentError::NotFound(id.to_string()));
        }
        self.write_layer(id, layer)
    }

    fn remove_layer(&mut self, id: &str) -> DocumentResult<()> {
        if !self.has_layer(id) {
            return Err(DocumentError::NotFound(id.to_string()));
        }
        self.layers_map().delete(id)?;
        let list = self.layer_ids_list();
        if let Some(pos) = Self::position_in_list(&list, id) {
            list.delete(pos, 1)?;
        }
        Ok(())
    }

    fn move_layer(&mut self, id: &str, index: usize) -> DocumentResult<()> {
        let list = self.layer_ids_list();
        let pos = Self::position_in_list(&list, id).ok_or_else(|| DocumentError::NotFound(id.to_string()))?;
        list.delete(pos, 1)?;
        let index = index.min(list.len());
        list.insert(index, LoroValue::String(id.to_string().into()))?;
        Ok(())
    }

    fn commit(&mut self) {
        self.doc.commit();
    }

    fn pause_history(&mut self) {
        self.doc.commit();
        if !self.history_paused {
            if let Err(e) = self.undo_manager.group_start() {
                log::warn!("Failed to start undo group: {}", e);
            }
            self.history_paused = true;
        }
    }

    fn resume_history(&mut self) {
        self.doc.commit();
        if self.history_paused {
            self.undo_manager.group_end();
            self.history_paused = false;
        }
    }

    fn undo(&mut self) -> bool {
        self.resume_history();
        self.undo_manager.undo().unwrap_or(false)
    }

    fn redo(&mut self) -> bool {
        self.resume_history();
        self.undo_manager.redo().unwrap_or(false)
    }

    fn undo_count(&self) -> usize {
        self.undo_manager.undo_count()
    }

    fn redo_count(&self) -> usize {
        self.undo_manager.redo_count()
    }
}

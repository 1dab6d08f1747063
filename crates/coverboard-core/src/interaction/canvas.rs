//! The canvas: routes input through [`CanvasMode`] into document changes.

use super::CanvasMode;
use crate::camera::Camera;
use crate::config::CanvasConfig;
use crate::document::{Document, DocumentResult};
use crate::fonts::{DEFAULT_FONT_WEIGHTS, FontRegistry, FontRequest};
use crate::geometry::{Xywh, contains, left_middle, pointer_to_canvas, resize_bounds, right_middle};
use crate::input::{CanvasEvent, Key, Modifiers, PointerInput, Tool};
use crate::layers::{Color, ConnectorLayer, Layer, LayerId, LayerKind, Overlay, new_layer_id, pen_points_to_path};
use crate::presence::Presence;
use crate::selection::{HandleKind, connection_handle, hit_test_handles, layers_in_net, topmost_layer_at};
use kurbo::{Point, Vec2};

/// Wheel zoom step, matching one notch of a mouse wheel.
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Interactive canvas over a shared [`Document`].
///
/// Handlers never fail: a document write that errors is logged and the
/// canvas falls back to [`CanvasMode::Idle`].
pub struct Canvas<D: Document> {
    document: D,
    /// Local viewport, never synchronized.
    pub camera: Camera,
    presence: Presence,
    mode: CanvasMode,
    config: CanvasConfig,
    last_used_fill: Color,
    fonts: FontRegistry,
    pending_fonts: Vec<FontRequest>,
    presence_dirty: bool,
    /// Selection before each undoable step, aligned with the document history.
    undo_selections: Vec<Vec<LayerId>>,
    redo_selections: Vec<Vec<LayerId>>,
    /// Undo depth and selection when the current drag started.
    gesture_start: Option<(usize, Vec<LayerId>)>,
}

impl<D: Document> Canvas<D> {
    /// Create a canvas with the default configuration.
    pub fn new(document: D) -> Self {
        Self::with_config(document, CanvasConfig::default())
    }

    pub fn with_config(document: D, config: CanvasConfig) -> Self {
        let fonts = FontRegistry::new(config.font_stylesheet_base.clone());
        Self {
            document,
            camera: Camera::new(),
            presence: Presence::new(),
            mode: CanvasMode::Idle,
            config,
            last_used_fill: Color::black(),
            fonts,
            pending_fonts: Vec::new(),
            presence_dirty: false,
            undo_selections: Vec::new(),
            redo_selections: Vec::new(),
            gesture_start: None,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Direct access for host-side edits (remote imports, generation results).
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    pub fn mode(&self) -> &CanvasMode {
        &self.mode
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn selection(&self) -> &[LayerId] {
        &self.presence.selection
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn last_used_fill(&self) -> Color {
        self.last_used_fill
    }

    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        &mut self.fonts
    }

    /// Presence to broadcast, if it changed since the last call.
    pub fn take_presence_update(&mut self) -> Option<Presence> {
        if self.presence_dirty {
            self.presence_dirty = false;
            Some(self.presence.clone())
        } else {
            None
        }
    }

    /// Font stylesheets the host should load.
    pub fn take_font_requests(&mut self) -> Vec<FontRequest> {
        std::mem::take(&mut self.pending_fonts)
    }

    /// Dispatch one input event.
    pub fn handle(&mut self, event: CanvasEvent) {
        match event {
            CanvasEvent::PointerDown(input) => self.on_pointer_down(input),
            CanvasEvent::PointerMove(input) => self.on_pointer_move(input),
            CanvasEvent::PointerUp(input) => self.on_pointer_up(input),
            CanvasEvent::PointerLeave => self.on_pointer_leave(),
            CanvasEvent::Wheel { position, delta, modifiers } => self.on_wheel(position, delta, modifiers),
            CanvasEvent::KeyDown { key, modifiers } => self.on_key_down(key, modifiers),
            CanvasEvent::SelectTool { tool } => self.select_tool(tool),
            CanvasEvent::LayerPointerDown { layer_id, input } => self.on_layer_pointer_down(&layer_id, input),
            CanvasEvent::ResizeHandlePointerDown { handle, input } => self.on_resize_handle_pointer_down(handle, input),
            CanvasEvent::ConnectionHandlePointerDown { layer_id, input } => {
                self.on_connection_handle_pointer_down(&layer_id, input)
            }
        }
    }

    // --- Pointer ---

    pub fn on_pointer_down(&mut self, input: PointerInput) {
        let point = self.to_canvas(input.position);
        match self.mode {
            CanvasMode::Pencil => {
                self.presence.pencil_draft = Some(vec![[point.x, point.y, input.pressure]]);
                self.presence_dirty = true;
            }
            CanvasMode::Idle => self.press_idle(point, input.modifiers),
            // Insertion and overlays act on release; other gestures own the pointer.
            _ => {}
        }
    }

    fn press_idle(&mut self, point: Point, modifiers: Modifiers) {
        if let Some((id, bounds)) = self.single_selected_bounds() {
            let tolerance = self.config.handle_tolerance / self.camera.scale;
            let anchor = connection_handle(bounds);
            if (point - anchor).hypot() <= tolerance {
                self.start_connecting(id, anchor, point);
                return;
            }
            if let Some(handle) = hit_test_handles(bounds, point, tolerance) {
                self.start_resizing(bounds, handle);
                return;
            }
        }

        if let Some(id) = topmost_layer_at(&self.document, point, |_, _| true) {
            self.start_translating(id, point, modifiers.shift);
            return;
        }

        self.set_mode(CanvasMode::Pressing { origin: point });
    }

    pub fn on_pointer_move(&mut self, input: PointerInput) {
        let point = self.to_canvas(input.position);
        self.presence.cursor = Some(point);
        self.presence_dirty = true;

        match self.mode.clone() {
            CanvasMode::Pressing { origin } => {
                let distance = (point.x - origin.x).abs() + (point.y - origin.y).abs();
                if distance > self.config.selection_net_threshold {
                    self.set_mode(CanvasMode::SelectionNet { origin, current: point });
                    self.update_selection_net(origin, point);
                }
            }
            CanvasMode::SelectionNet { origin, .. } => {
                self.mode = CanvasMode::SelectionNet { origin, current: point };
                self.update_selection_net(origin, point);
            }
            CanvasMode::Translating { current } => {
                if self.translate_selection(point - current) {
                    self.mode = CanvasMode::Translating { current: point };
                }
            }
            CanvasMode::Resizing { initial_bounds, handle } => self.resize_selection(initial_bounds, handle, point),
            CanvasMode::Pencil => {
                if input.primary_down {
                    self.extend_pencil_draft(point, input.pressure);
                }
            }
            CanvasMode::Connecting { start_layer_id, start_point, .. } => {
                self.mode = CanvasMode::Connecting {
                    start_layer_id,
                    start_point,
                    current: point,
                };
            }
            CanvasMode::Idle | CanvasMode::Inserting { .. } | CanvasMode::AddingOverlay { .. } => {}
        }
    }

    pub fn on_pointer_up(&mut self, input: PointerInput) {
        let point = self.to_canvas(input.position);
        match self.mode.clone() {
            CanvasMode::Pressing { .. } => {
                self.set_selection(Vec::new());
                self.set_mode(CanvasMode::Idle);
            }
            CanvasMode::SelectionNet { .. } => self.set_mode(CanvasMode::Idle),
            CanvasMode::Translating { .. } | CanvasMode::Resizing { .. } => {
                self.end_gesture();
                self.set_mode(CanvasMode::Idle);
            }
            CanvasMode::Inserting { kind } => {
                self.insert_layer(kind, point);
                self.set_mode(CanvasMode::Idle);
            }
            CanvasMode::Pencil => self.commit_pencil_draft(),
            CanvasMode::Connecting { start_layer_id, .. } => {
                self.finish_connection(&start_layer_id, point);
                self.set_mode(CanvasMode::Idle);
            }
            CanvasMode::AddingOverlay { image_id } => {
                self.place_overlay(&image_id, point);
                self.set_mode(CanvasMode::Idle);
            }
            CanvasMode::Idle => {}
        }
    }

    pub fn on_pointer_leave(&mut self) {
        self.presence.cursor = None;
        self.presence_dirty = true;
    }

    /// Pointer went down on a specific layer.
    pub fn on_layer_pointer_down(&mut self, layer_id: &str, input: PointerInput) {
        if matches!(
            self.mode,
            CanvasMode::Pencil | CanvasMode::Inserting { .. } | CanvasMode::AddingOverlay { .. }
        ) {
            return;
        }
        if self.document.layer(layer_id).is_none() {
            log::warn!("Pointer down on unknown layer {}", layer_id);
            return;
        }
        let point = self.to_canvas(input.position);
        self.start_translating(layer_id.to_string(), point, input.modifiers.shift);
    }

    /// Pointer went down on a resize handle of the selection.
    pub fn on_resize_handle_pointer_down(&mut self, handle: HandleKind, _input: PointerInput) {
        if matches!(self.mode, CanvasMode::Pencil | CanvasMode::Inserting { .. }) {
            return;
        }
        match self.first_selected_bounds() {
            Some((_, bounds)) => self.start_resizing(bounds, handle),
            None => log::debug!("Resize handle pressed without a positioned selection"),
        }
    }

    /// Pointer went down on the connection handle of `layer_id`.
    pub fn on_connection_handle_pointer_down(&mut self, layer_id: &str, input: PointerInput) {
        if matches!(self.mode, CanvasMode::Pencil | CanvasMode::Inserting { .. }) {
            return;
        }
        let Some(bounds) = self.document.layer(layer_id).filter(|l| !l.is_connector()).and_then(|l| l.bounds()) else {
            log::warn!("Cannot connect from layer {}", layer_id);
            return;
        };
        let point = self.to_canvas(input.position);
        self.start_connecting(layer_id.to_string(), connection_handle(bounds), point);
    }

    /// Plain wheel pans; Ctrl/Cmd+wheel zooms about the pointer.
    pub fn on_wheel(&mut self, position: Point, delta: Vec2, modifiers: Modifiers) {
        if modifiers.command() {
            if delta.y == 0.0 {
                return;
            }
            let factor = if delta.y < 0.0 { WHEEL_ZOOM_IN } else { WHEEL_ZOOM_OUT };
            self.camera.zoom_at(position, factor);
        } else {
            self.camera.pan(-delta);
        }
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) {
        match key {
            Key::Escape => self.cancel(),
            Key::Delete | Key::Backspace => {
                if !self.mode.is_gesture() {
                    self.delete_selection();
                }
            }
            Key::Char(c) if modifiers.command() => match c.to_ascii_lowercase() {
                'z' if modifiers.shift => self.redo(),
                'z' => self.undo(),
                'y' => self.redo(),
                _ => {}
            },
            Key::Char(_) => {}
        }
    }

    /// Drop whatever is in progress and clear the selection.
    pub fn cancel(&mut self) {
        self.end_gesture();
        self.presence.pencil_draft = None;
        self.set_selection(Vec::new());
        self.presence_dirty = true;
        self.set_mode(CanvasMode::Idle);
    }

    /// Revert the last step and restore the selection it started from.
    ///
    /// Ignored while a gesture is in progress.
    pub fn undo(&mut self) {
        if self.mode.is_gesture() {
            log::debug!("Ignoring undo during {}", self.mode.name());
            return;
        }
        self.sync_selection_history();
        if !self.document.undo() {
            log::debug!("Nothing to undo");
            return;
        }
        self.redo_selections.push(self.presence.selection.clone());
        if let Some(selection) = self.undo_selections.pop() {
            self.set_selection(selection);
        }
        self.prune_selection();
    }

    pub fn redo(&mut self) {
        if self.mode.is_gesture() {
            log::debug!("Ignoring redo during {}", self.mode.name());
            return;
        }
        self.sync_selection_history();
        if !self.document.redo() {
            log::debug!("Nothing to redo");
            return;
        }
        self.undo_selections.push(self.presence.selection.clone());
        if let Some(selection) = self.redo_selections.pop() {
            self.set_selection(selection);
        }
        self.prune_selection();
    }

    // --- Toolbar ---

    pub fn select_tool(&mut self, tool: Tool) {
        if matches!(self.mode, CanvasMode::Translating { .. } | CanvasMode::Resizing { .. }) {
            self.end_gesture();
        }
        if self.presence.pencil_draft.take().is_some() {
            self.presence_dirty = true;
        }

        match tool {
            Tool::Select => self.set_mode(CanvasMode::Idle),
            Tool::Insert(kind) if kind.is_insertable() => self.set_mode(CanvasMode::Inserting { kind }),
            Tool::Insert(kind) => {
                log::warn!("{} layers cannot be inserted from the toolbar", kind.as_str());
                self.set_mode(CanvasMode::Idle);
            }
            Tool::Pencil => self.set_mode(CanvasMode::Pencil),
            Tool::Overlay(image_id) => {
                if self.document.layer(&image_id).is_some_and(|l| l.as_image().is_some()) {
                    self.set_mode(CanvasMode::AddingOverlay { image_id });
                } else {
                    log::warn!("Overlay target {} is not an image", image_id);
                    self.set_mode(CanvasMode::Idle);
                }
            }
        }
    }

    pub fn delete_selection(&mut self) {
        let ids = self.presence.selection.clone();
        if ids.is_empty() {
            return;
        }
        let applied = self.apply("delete selection", |doc| {
            for id in &ids {
                if doc.layer(id).is_some() {
                    doc.remove_layer(id)?;
                }
            }
            Ok(())
        });
        if applied.is_some() {
            log::info!("Deleted {} layer(s)", ids.len());
            self.set_selection(Vec::new());
        }
    }

    /// Recolor the selection; also becomes the fill for new layers.
    pub fn set_selection_fill(&mut self, color: Color) {
        self.last_used_fill = color;
        self.presence.pen_color = color;
        self.presence_dirty = true;

        let ids = self.presence.selection.clone();
        if ids.is_empty() {
            return;
        }
        self.apply("set fill", |doc| {
            for id in &ids {
                if let Some(mut layer) = doc.layer(id) {
                    layer.set_fill(color);
                    doc.update_layer(id, &layer)?;
                }
            }
            Ok(())
        });
    }

    pub fn bring_to_front(&mut self) {
        let ids = self.selection_in_z_order();
        self.apply("bring to front", |doc| ids.iter().try_for_each(|id| doc.bring_to_front(id)));
    }

    pub fn send_to_back(&mut self) {
        let ids = self.selection_in_z_order();
        self.apply("send to back", |doc| ids.iter().rev().try_for_each(|id| doc.send_to_back(id)));
    }

    /// Move each selected layer up one slot, never past another selected layer.
    pub fn bring_forward(&mut self) {
        let ids = self.selection_in_z_order();
        self.apply("bring forward", |doc| {
            let mut ceiling = doc.layer_ids().len();
            for id in ids.iter().rev() {
                let Some(pos) = doc.index_of(id) else { continue };
                let target = (pos + 1).min(ceiling.saturating_sub(1)).max(pos);
                if target > pos {
                    doc.move_layer(id, target)?;
                }
                ceiling = target;
            }
            Ok(())
        });
    }

    /// Move each selected layer down one slot, never past another selected layer.
    pub fn send_backward(&mut self) {
        let ids = self.selection_in_z_order();
        self.apply("send backward", |doc| {
            let mut floor = 0;
            for id in &ids {
                let Some(pos) = doc.index_of(id) else { continue };
                let target = pos.saturating_sub(1).max(floor).min(pos);
                if target < pos {
                    doc.move_layer(id, target)?;
                }
                floor = target + 1;
            }
            Ok(())
        });
    }

    // --- Mode internals ---

    fn to_canvas(&self, screen: Point) -> Point {
        pointer_to_canvas(screen, &self.camera)
    }

    fn set_mode(&mut self, mode: CanvasMode) {
        if self.mode.name() != mode.name() {
            log::debug!("Canvas mode {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
    }

    fn set_selection(&mut self, selection: Vec<LayerId>) {
        if self.presence.selection != selection {
            self.presence.selection = selection;
            self.presence_dirty = true;
        }
    }

    fn prune_selection(&mut self) {
        let kept: Vec<LayerId> = self
            .presence
            .selection
            .iter()
            .filter(|id| self.document.layer(id).is_some())
            .cloned()
            .collect();
        self.set_selection(kept);
    }

    /// Run one atomic change; failures are logged and reset the mode.
    fn apply<R>(&mut self, action: &str, f: impl FnOnce(&mut D) -> DocumentResult<R>) -> Option<R> {
        let undo_depth = self.document.undo_count();
        let selection = self.presence.selection.clone();
        match self.document.mutate(f) {
            Ok(result) => {
                if self.gesture_start.is_none() {
                    self.record_step(undo_depth, selection);
                }
                Some(result)
            }
            Err(e) => {
                log::warn!("Failed to {}: {}", action, e);
                self.end_gesture();
                self.set_mode(CanvasMode::Idle);
                None
            }
        }
    }

    fn begin_gesture(&mut self) {
        if self.gesture_start.is_none() {
            self.gesture_start = Some((self.document.undo_count(), self.presence.selection.clone()));
        }
        self.document.pause_history();
    }

    /// Close the drag's merged history step.
    fn end_gesture(&mut self) {
        self.document.resume_history();
        if let Some((undo_depth, selection)) = self.gesture_start.take() {
            self.record_step(undo_depth, selection);
        }
    }

    /// Remember `selection` for the step a change just pushed, if it pushed one.
    fn record_step(&mut self, undo_depth: usize, selection: Vec<LayerId>) {
        if self.document.undo_count() <= undo_depth {
            return;
        }
        align_history(&mut self.undo_selections, undo_depth, &selection);
        self.undo_selections.push(selection);
        self.redo_selections.clear();
        self.sync_selection_history();
    }

    /// Line the selection stacks up with the document's undo and redo depth.
    fn sync_selection_history(&mut self) {
        let current = &self.presence.selection;
        align_history(&mut self.undo_selections, self.document.undo_count(), current);
        align_history(&mut self.redo_selections, self.document.redo_count(), current);
    }

    fn has_room(&self) -> bool {
        let count = self.document.layer_count();
        if count >= self.config.max_layers {
            log::warn!("Layer limit reached ({}/{}), not inserting", count, self.config.max_layers);
            false
        } else {
            true
        }
    }

    fn single_selected_bounds(&self) -> Option<(LayerId, Xywh)> {
        match self.presence.selection.as_slice() {
            [id] => {
                let layer = self.document.layer(id)?;
                Some((id.clone(), layer.bounds()?))
            }
            _ => None,
        }
    }

    fn first_selected_bounds(&self) -> Option<(LayerId, Xywh)> {
        self.presence
            .selection
            .iter()
            .find_map(|id| Some((id.clone(), self.document.layer(id)?.bounds()?)))
    }

    fn selection_in_z_order(&self) -> Vec<LayerId> {
        self.document
            .layer_ids()
            .into_iter()
            .filter(|id| self.presence.is_selected(id))
            .collect()
    }

    fn start_translating(&mut self, id: LayerId, point: Point, add_to_selection: bool) {
        self.begin_gesture();
        if !self.presence.is_selected(&id) {
            if add_to_selection {
                let mut selection = self.presence.selection.clone();
                selection.push(id);
                self.set_selection(selection);
            } else {
                self.set_selection(vec![id]);
            }
        }
        self.set_mode(CanvasMode::Translating { current: point });
    }

    fn start_resizing(&mut self, initial_bounds: Xywh, handle: HandleKind) {
        self.begin_gesture();
        self.set_mode(CanvasMode::Resizing { initial_bounds, handle });
    }

    fn start_connecting(&mut self, start_layer_id: LayerId, start_point: Point, current: Point) {
        self.set_mode(CanvasMode::Connecting {
            start_layer_id,
            start_point,
            current,
        });
    }

    fn update_selection_net(&mut self, origin: Point, current: Point) {
        let ids = layers_in_net(&self.document, origin, current);
        self.set_selection(ids);
    }

    /// Returns `false` if the write failed and the drag was abandoned.
    fn translate_selection(&mut self, delta: Vec2) -> bool {
        let ids = self.presence.selection.clone();
        self.apply("translate selection", |doc| {
            for id in &ids {
                let Some(mut layer) = doc.layer(id) else { continue };
                if layer.translate(delta.x, delta.y) {
                    doc.update_layer(id, &layer)?;
                }
            }
            Ok(())
        })
        .is_some()
    }

    fn resize_selection(&mut self, initial_bounds: Xywh, handle: HandleKind, point: Point) {
        let Some((id, _)) = self.first_selected_bounds() else {
            self.end_gesture();
            self.set_mode(CanvasMode::Idle);
            return;
        };
        let bounds = resize_bounds(initial_bounds, handle, point);
        self.apply("resize layer", |doc| {
            if let Some(mut layer) = doc.layer(&id) {
                layer.set_bounds(bounds);
                doc.update_layer(&id, &layer)?;
            }
            Ok(())
        });
    }

    fn insert_layer(&mut self, kind: LayerKind, point: Point) {
        if !self.has_room() {
            return;
        }
        let Some(size) = self.config.default_sizes.for_kind(kind) else {
            return;
        };
        let Some(layer) = Layer::with_defaults(kind, point, (size.width, size.height), self.last_used_fill) else {
            return;
        };
        let id = new_layer_id();
        if self.apply("insert layer", |doc| doc.insert_layer(&id, &layer)).is_some() {
            log::info!("Inserted {} layer {}", kind.as_str(), id);
            self.set_selection(vec![id]);
        }
    }

    fn extend_pencil_draft(&mut self, point: Point, pressure: f64) {
        let Some(draft) = self.presence.pencil_draft.as_mut() else {
            return;
        };
        if let [only] = draft.as_slice() {
            if only[0] == point.x && only[1] == point.y {
                return;
            }
        }
        draft.push([point.x, point.y, pressure]);
        self.presence_dirty = true;
    }

    fn commit_pencil_draft(&mut self) {
        let Some(draft) = self.presence.pencil_draft.take() else {
            return;
        };
        self.presence_dirty = true;

        let Some(path) = pen_points_to_path(&draft, self.last_used_fill) else {
            log::debug!("Discarding stroke with {} point(s)", draft.len());
            return;
        };
        if !self.has_room() {
            return;
        }
        let id = new_layer_id();
        let layer = Layer::Path(path);
        if self.apply("insert stroke", |doc| doc.insert_layer(&id, &layer)).is_some() {
            log::info!("Inserted path layer {} with {} points", id, draft.len());
        }
    }

    fn finish_connection(&mut self, start_layer_id: &str, point: Point) {
        let Some(start_bounds) = self.document.layer(start_layer_id).and_then(|l| l.bounds()) else {
            log::warn!("Connection source {} disappeared", start_layer_id);
            return;
        };
        let Some(end_layer_id) = topmost_layer_at(&self.document, point, |id, _| id != start_layer_id) else {
            log::debug!("Connection dropped on empty canvas");
            return;
        };
        let Some(end_layer) = self.document.layer(&end_layer_id) else {
            return;
        };
        if end_layer.is_sent_message() {
            log::warn!("Refusing connection into sent message {}", end_layer_id);
            return;
        }
        let Some(end_bounds) = end_layer.bounds() else {
            return;
        };
        if !self.has_room() {
            return;
        }

        let connector = Layer::Connector(ConnectorLayer {
            start_layer_id: start_layer_id.to_string(),
            end_layer_id: end_layer_id.clone(),
            start_point: right_middle(start_bounds),
            end_point: left_middle(end_bounds),
            fill: self.last_used_fill,
        });
        let id = new_layer_id();
        if self.apply("insert connector", |doc| doc.insert_layer(&id, &connector)).is_some() {
            log::info!("Connected {} -> {} with {}", start_layer_id, end_layer_id, id);
        }
    }

    fn place_overlay(&mut self, image_id: &str, point: Point) {
        let Some(mut layer) = self.document.layer(image_id) else {
            log::warn!("Overlay target {} disappeared", image_id);
            return;
        };
        let Layer::Image(image) = &mut layer else {
            log::warn!("Overlay target {} is not an image", image_id);
            return;
        };
        if !contains(image.bounds, point) {
            log::debug!("Overlay placement outside image {}, cancelled", image_id);
            return;
        }

        let defaults = &self.config.overlay;
        image.overlay = Some(Overlay {
            text: defaults.text.clone(),
            font_family: defaults.font_family.clone(),
            font_size: defaults.font_size,
            fill: self.last_used_fill,
            offset_x: point.x - image.bounds.x,
            offset_y: point.y - image.bounds.y,
        });
        let family = defaults.font_family.clone();

        if self.apply("place overlay", |doc| doc.update_layer(image_id, &layer)).is_some() {
            self.set_selection(vec![image_id.to_string()]);
            if let Some(request) = self.fonts.request(&family, DEFAULT_FONT_WEIGHTS) {
                self.pending_fonts.push(request);
            }
        }
    }
}

/// Trim the oldest entries, or pad with `fill`, until `stack` holds `depth`.
///
/// Padding covers steps pushed by host-side edits the canvas did not see.
fn align_history(stack: &mut Vec<Vec<LayerId>>, depth: usize, fill: &[LayerId]) {
    if stack.len() > depth {
        stack.drain(..stack.len() - depth);
    }
    while stack.len() < depth {
        stack.push(fill.to_vec());
    }
}

//! Bookkeeping for image generation on message layers.
//!
//! The transport lives in the host: it posts a [`GenerationRequest`],
//! reports the backend's task id through [`GenerationTracker::task_started`],
//! and hands finished work back as a [`GenerationResult`].

use crate::document::{Document, DocumentError};
use crate::layers::{Layer, LayerId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Generation errors.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Layer not found: {0}")]
    MissingLayer(String),
    #[error("Layer {0} is not a message")]
    NotAMessage(String),
    #[error("Message {0} has no content")]
    EmptyMessage(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Result type for generation bookkeeping.
pub type RelayResult<T> = Result<T, GenerationError>;

/// Payload sent to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub message_id: LayerId,
    pub prompt: String,
    /// Content of upstream messages, furthest ancestor first.
    pub context: Vec<String>,
}

/// Finished work reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub task_id: String,
    pub image_urls: Vec<String>,
}

/// Error toast payload for the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// Maps backend task ids to the message layers waiting on them.
#[derive(Debug, Clone, Default)]
pub struct GenerationTracker {
    pending: HashMap<String, LayerId>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks still waiting for a result.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Build the request for `message_id`.
    ///
    /// Context is collected by walking incoming connectors backwards; only
    /// sent messages contribute, and cycles are visited once.
    pub fn prepare<D: Document + ?Sized>(&self, doc: &D, message_id: &str) -> RelayResult<GenerationRequest> {
        let layer = doc
            .layer(message_id)
            .ok_or_else(|| GenerationError::MissingLayer(message_id.to_string()))?;
        let message = layer
            .as_message()
            .ok_or_else(|| GenerationError::NotAMessage(message_id.to_string()))?;
        if message.content.trim().is_empty() {
            return Err(GenerationError::EmptyMessage(message_id.to_string()));
        }

        let connectors: Vec<(LayerId, LayerId)> = doc
            .layer_ids()
            .iter()
            .filter_map(|id| {
                let layer = doc.layer(id)?;
                let connector = layer.as_connector()?;
                Some((connector.start_layer_id.clone(), connector.end_layer_id.clone()))
            })
            .collect();

        let mut visited = HashSet::from([message_id.to_string()]);
        let mut context = Vec::new();
        collect_upstream(doc, &connectors, message_id, &mut visited, &mut context);

        Ok(GenerationRequest {
            message_id: message_id.to_string(),
            prompt: message.content.clone(),
            context,
        })
    }

    /// Record that the backend accepted work for `message_id`.
    pub fn task_started<D: Document>(&mut self, doc: &mut D, message_id: &str, task_id: &str) -> RelayResult<()> {
        let mut layer = doc
            .layer(message_id)
            .ok_or_else(|| GenerationError::MissingLayer(message_id.to_string()))?;
        let Layer::Message(message) = &mut layer else {
            return Err(GenerationError::NotAMessage(message_id.to_string()));
        };
        message.task_id = Some(task_id.to_string());
        doc.mutate(|d| d.update_layer(message_id, &layer))?;

        self.pending.insert(task_id.to_string(), message_id.to_string());
        log::debug!("Generation task {} started for {}", task_id, message_id);
        Ok(())
    }

    /// Write finished images onto their message.
    ///
    /// Returns the updated message id, or `None` if the task is unknown or
    /// its message has been deleted meanwhile.
    pub fn apply_result<D: Document>(&mut self, doc: &mut D, result: &GenerationResult) -> Option<LayerId> {
        let Some(message_id) = self.pending.remove(&result.task_id) else {
            log::warn!("Ignoring result for unknown task {}", result.task_id);
            return None;
        };
        let Some(mut layer) = doc.layer(&message_id) else {
            log::warn!("Message {} was deleted before task {} finished", message_id, result.task_id);
            return None;
        };
        let Layer::Message(message) = &mut layer else {
            log::warn!("Layer {} is no longer a message", message_id);
            return None;
        };
        message.images = result.image_urls.clone();

        match doc.mutate(|d| d.update_layer(&message_id, &layer)) {
            Ok(()) => {
                log::info!("Stored {} image(s) on message {}", result.image_urls.len(), message_id);
                Some(message_id)
            }
            Err(e) => {
                log::error!("Failed to store generation result for {}: {}", message_id, e);
                None
            }
        }
    }

    /// Drop a failed task and describe the failure for the user.
    pub fn fail(&mut self, task_id: &str, reason: &str) -> Notification {
        if self.pending.remove(task_id).is_none() {
            log::warn!("Failure reported for unknown task {}", task_id);
        }
        log::error!("Generation task {} failed: {}", task_id, reason);
        Notification {
            title: "Image generation failed".to_string(),
            message: reason.to_string(),
        }
    }
}

fn collect_upstream<D: Document + ?Sized>(
    doc: &D,
    connectors: &[(LayerId, LayerId)],
    target: &str,
    visited: &mut HashSet<LayerId>,
    context: &mut Vec<String>,
) {
    for (start, end) in connectors {
        if end != target || !visited.insert(start.clone()) {
            continue;
        }
        collect_upstream(doc, connectors, start, visited, context);
        if let Some(message) = doc.layer(start).as_ref().and_then(Layer::as_message) {
            if message.is_sent() {
                context.push(message.content.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::geometry::Xywh;
    use crate::layers::{Color, ConnectorLayer, MessageLayer};
    use kurbo::Point;

    fn message(content: &str) -> Layer {
        let mut m = MessageLayer::new(Xywh::new(0.0, 0.0, 280.0, 160.0), Color::white());
        m.content = content.to_string();
        Layer::Message(m)
    }

    fn connect(doc: &mut MemoryDocument, from: &str, to: &str) {
        let connector = Layer::Connector(ConnectorLayer {
            start_layer_id: from.into(),
            end_layer_id: to.into(),
            start_point: Point::ZERO,
            end_point: Point::ZERO,
            fill: Color::black(),
        });
        let id = format!("{from}->{to}");
        doc.mutate(|d| d.insert_layer(&id, &connector)).expect("insert");
    }

    fn board() -> MemoryDocument {
        let mut doc = MemoryDocument::new();
        doc.mutate(|d| {
            d.insert_layer("root", &message("A lighthouse in a storm"))?;
            d.insert_layer("mid", &message("Make it woodcut style"))?;
            d.insert_layer("draft", &message(""))?;
            d.insert_layer("leaf", &message("Add the title in serif caps"))
        })
        .expect("insert");
        connect(&mut doc, "root", "mid");
        connect(&mut doc, "mid", "leaf");
        connect(&mut doc, "draft", "leaf");
        connect(&mut doc, "leaf", "root");
        doc
    }

    #[test]
    fn test_prepare_collects_upstream_context() {
        let doc = board();
        let request = GenerationTracker::new().prepare(&doc, "leaf").expect("prepare");
        assert_eq!(request.prompt, "Add the title in serif caps");
        assert_eq!(request.context, vec!["A lighthouse in a storm", "Make it woodcut style"]);
    }

    #[test]
    fn test_prepare_errors() {
        let mut doc = board();
        let tracker = GenerationTracker::new();
        assert!(matches!(tracker.prepare(&doc, "nope"), Err(GenerationError::MissingLayer(_))));
        assert!(matches!(tracker.prepare(&doc, "draft"), Err(GenerationError::EmptyMessage(_))));

        let rect = Layer::with_defaults(crate::layers::LayerKind::Rectangle, Point::ZERO, (1.0, 1.0), Color::black())
            .expect("rectangle");
        doc.mutate(|d| d.insert_layer("rect", &rect)).expect("insert");
        assert!(matches!(tracker.prepare(&doc, "rect"), Err(GenerationError::NotAMessage(_))));
    }

    #[test]
    fn test_result_lands_on_message() {
        let mut doc = board();
        let mut tracker = GenerationTracker::new();
        tracker.task_started(&mut doc, "leaf", "task-7").expect("start");
        assert_eq!(tracker.pending_count(), 1);

        let result = GenerationResult {
            task_id: "task-7".into(),
            image_urls: vec!["https://cdn.example/1.png".into()],
        };
        assert_eq!(tracker.apply_result(&mut doc, &result), Some("leaf".to_string()));

        let leaf = doc.layer("leaf").expect("leaf");
        let leaf = leaf.as_message().expect("message");
        assert_eq!(leaf.task_id.as_deref(), Some("task-7"));
        assert_eq!(leaf.images, result.image_urls);
        assert_eq!(tracker.pending_count(), 0);

        // A duplicate delivery is ignored.
        assert_eq!(tracker.apply_result(&mut doc, &result), None);
    }

    #[test]
    fn test_result_for_deleted_message_is_ignored() {
        let mut doc = board();
        let mut tracker = GenerationTracker::new();
        tracker.task_started(&mut doc, "mid", "task-1").expect("start");
        doc.mutate(|d| d.remove_layer("mid")).expect("remove");

        let result = GenerationResult {
            task_id: "task-1".into(),
            image_urls: vec!["https://cdn.example/2.png".into()],
        };
        assert_eq!(tracker.apply_result(&mut doc, &result), None);
        assert!(doc.layer("mid").is_none());
    }

    #[test]
    fn test_failure_notification() {
        let mut doc = board();
        let mut tracker = GenerationTracker::new();
        tracker.task_started(&mut doc, "root", "task-9").expect("start");

        let notification = tracker.fail("task-9", "quota exceeded");
        assert_eq!(notification.title, "Image generation failed");
        assert_eq!(notification.message, "quota exceeded");
        assert_eq!(tracker.pending_count(), 0);

        let json = serde_json::to_value(&notification).expect("serialize");
        assert_eq!(json["message"], "quota exceeded");
    }
}

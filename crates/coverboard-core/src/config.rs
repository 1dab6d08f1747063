//! Canvas configuration.

use crate::layers::LayerKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default size of a freshly inserted layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSize {
    pub width: f64,
    pub height: f64,
}

impl LayerSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Per-kind default sizes for toolbar insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSizes {
    pub rectangle: LayerSize,
    pub ellipse: LayerSize,
    pub text: LayerSize,
    pub note: LayerSize,
    pub message: LayerSize,
    pub image: LayerSize,
}

impl Default for DefaultSizes {
    fn default() -> Self {
        Self {
            rectangle: LayerSize::new(100.0, 100.0),
            ellipse: LayerSize::new(100.0, 100.0),
            text: LayerSize::new(100.0, 40.0),
            note: LayerSize::new(140.0, 140.0),
            message: LayerSize::new(280.0, 160.0),
            image: LayerSize::new(256.0, 384.0),
        }
    }
}

impl DefaultSizes {
    /// Size for `kind`, or `None` for kinds that are not inserted by click.
    pub fn for_kind(&self, kind: LayerKind) -> Option<LayerSize> {
        match kind {
            LayerKind::Rectangle => Some(self.rectangle),
            LayerKind::Ellipse => Some(self.ellipse),
            LayerKind::Text => Some(self.text),
            LayerKind::Note => Some(self.note),
            LayerKind::Message => Some(self.message),
            LayerKind::Image => Some(self.image),
            LayerKind::Path | LayerKind::Connector => None,
        }
    }
}

/// Defaults for a newly placed image overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayDefaults {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self {
            text: "Title".to_string(),
            font_family: "Inter".to_string(),
            font_size: 32.0,
        }
    }
}

/// Tunables for the interaction layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Insertion is refused once the document holds this many layers.
    pub max_layers: usize,
    /// Manhattan distance the pointer must travel before a press becomes a net.
    pub selection_net_threshold: f64,
    /// Handle hit radius in screen pixels.
    pub handle_tolerance: f64,
    pub default_sizes: DefaultSizes,
    pub max_undo_steps: usize,
    /// Commits closer than this share an undo step in the loro document.
    pub history_merge_interval_ms: i64,
    pub overlay: OverlayDefaults,
    /// Stylesheet endpoint for web fonts.
    pub font_stylesheet_base: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            max_layers: 100,
            selection_net_threshold: 5.0,
            handle_tolerance: crate::selection::HANDLE_HIT_TOLERANCE,
            default_sizes: DefaultSizes::default(),
            max_undo_steps: 100,
            history_merge_interval_ms: 0,
            overlay: OverlayDefaults::default(),
            font_stylesheet_base: "https://fonts.googleapis.com/css2".to_string(),
        }
    }
}

impl CanvasConfig {
    /// Parse from JSON; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = CanvasConfig::from_json("{}").expect("parse");
        assert_eq!(config, CanvasConfig::default());
        assert_eq!(config.max_layers, 100);
        assert_eq!(config.selection_net_threshold, 5.0);
    }

    #[test]
    fn test_partial_override() {
        let config = CanvasConfig::from_json(r#"{"max_layers": 3, "default_sizes": {"note": {"width": 10, "height": 20}}}"#)
            .expect("parse");
        assert_eq!(config.max_layers, 3);
        assert_eq!(config.default_sizes.note, LayerSize::new(10.0, 20.0));
        assert_eq!(config.default_sizes.rectangle, LayerSize::new(100.0, 100.0));
    }

    #[test]
    fn test_sizes_for_kind() {
        let sizes = DefaultSizes::default();
        assert_eq!(sizes.for_kind(LayerKind::Message), Some(LayerSize::new(280.0, 160.0)));
        assert_eq!(sizes.for_kind(LayerKind::Connector), None);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(CanvasConfig::from_json("[1,"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = CanvasConfig::load("/definitely/not/here/coverboard.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}

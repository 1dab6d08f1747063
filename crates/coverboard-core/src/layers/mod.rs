//! Layer definitions for the board.
//!
//! A layer is one object on the canvas. Every variant except
//! [`Layer::Connector`] is positioned and carries `{x, y, width, height}`
//! bounds plus a fill color.

mod connector;
mod image;
mod message;
mod path;
mod shape;

pub use connector::{ConnectorLayer, connector_endpoints};
pub use image::{ImageLayer, Overlay};
pub use message::MessageLayer;
pub use path::{PathLayer, PenPoint, pen_points_to_path};
pub use shape::{ShapeLayer, TextLayer};

use crate::geometry::Xywh;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a layer in the shared document.
pub type LayerId = String;

/// Generate a fresh layer id.
pub fn new_layer_id() -> LayerId {
    Uuid::new_v4().to_string()
}

/// RGB color used for layer fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// CSS hex paint string, e.g. `#ff8800`.
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl From<peniko::Color> for Color {
    fn from(color: peniko::Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b)
    }
}

impl From<Color> for peniko::Color {
    fn from(color: Color) -> Self {
        peniko::Color::from_rgba8(color.r, color.g, color.b, 255)
    }
}

/// Discriminant of a [`Layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Rectangle,
    Ellipse,
    Path,
    Text,
    Note,
    Message,
    Image,
    Connector,
}

impl LayerKind {
    /// Whether the toolbar can insert this kind with a single click.
    ///
    /// Paths come from the pencil and connectors from connection handles.
    pub fn is_insertable(self) -> bool {
        !matches!(self, Self::Path | Self::Connector)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Path => "path",
            Self::Text => "text",
            Self::Note => "note",
            Self::Message => "message",
            Self::Image => "image",
            Self::Connector => "connector",
        }
    }
}

/// One object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    Rectangle(ShapeLayer),
    Ellipse(ShapeLayer),
    Path(PathLayer),
    Text(TextLayer),
    Note(TextLayer),
    Message(MessageLayer),
    Image(ImageLayer),
    Connector(ConnectorLayer),
}

impl Layer {
    /// Build a fresh layer of an insertable kind at `position` with the given size.
    ///
    /// Returns `None` for paths and connectors, which need more than a point.
    pub fn with_defaults(kind: LayerKind, position: Point, size: (f64, f64), fill: Color) -> Option<Self> {
        let bounds = Xywh::new(position.x, position.y, size.0, size.1);
        let layer = match kind {
            LayerKind::Rectangle => Layer::Rectangle(ShapeLayer { bounds, fill }),
            LayerKind::Ellipse => Layer::Ellipse(ShapeLayer { bounds, fill }),
            LayerKind::Text => Layer::Text(TextLayer::new(bounds, fill)),
            LayerKind::Note => Layer::Note(TextLayer::new(bounds, fill)),
            LayerKind::Message => Layer::Message(MessageLayer::new(bounds, fill)),
            LayerKind::Image => Layer::Image(ImageLayer::new(bounds, fill)),
            LayerKind::Path | LayerKind::Connector => return None,
        };
        Some(layer)
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Rectangle(_) => LayerKind::Rectangle,
            Layer::Ellipse(_) => LayerKind::Ellipse,
            Layer::Path(_) => LayerKind::Path,
            Layer::Text(_) => LayerKind::Text,
            Layer::Note(_) => LayerKind::Note,
            Layer::Message(_) => LayerKind::Message,
            Layer::Image(_) => LayerKind::Image,
            Layer::Connector(_) => LayerKind::Connector,
        }
    }

    /// Positional bounds, or `None` for connectors.
    pub fn bounds(&self) -> Option<Xywh> {
        match self {
            Layer::Rectangle(l) | Layer::Ellipse(l) => Some(l.bounds),
            Layer::Path(l) => Some(l.bounds),
            Layer::Text(l) | Layer::Note(l) => Some(l.bounds),
            Layer::Message(l) => Some(l.bounds),
            Layer::Image(l) => Some(l.bounds),
            Layer::Connector(_) => None,
        }
    }

    fn bounds_mut(&mut self) -> Option<&mut Xywh> {
        match self {
            Layer::Rectangle(l) | Layer::Ellipse(l) => Some(&mut l.bounds),
            Layer::Path(l) => Some(&mut l.bounds),
            Layer::Text(l) | Layer::Note(l) => Some(&mut l.bounds),
            Layer::Message(l) => Some(&mut l.bounds),
            Layer::Image(l) => Some(&mut l.bounds),
            Layer::Connector(_) => None,
        }
    }

    /// Move the layer by `(dx, dy)`. Returns `false` for layers without a position.
    pub fn translate(&mut self, dx: f64, dy: f64) -> bool {
        match self.bounds_mut() {
            Some(bounds) => {
                bounds.x += dx;
                bounds.y += dy;
                true
            }
            None => false,
        }
    }

    /// Replace the bounds. Returns `false` for layers without a position.
    pub fn set_bounds(&mut self, new_bounds: Xywh) -> bool {
        match self.bounds_mut() {
            Some(bounds) => {
                *bounds = new_bounds;
                true
            }
            None => false,
        }
    }

    pub fn fill(&self) -> Color {
        match self {
            Layer::Rectangle(l) | Layer::Ellipse(l) => l.fill,
            Layer::Path(l) => l.fill,
            Layer::Text(l) | Layer::Note(l) => l.fill,
            Layer::Message(l) => l.fill,
            Layer::Image(l) => l.fill,
            Layer::Connector(l) => l.fill,
        }
    }

    pub fn set_fill(&mut self, color: Color) {
        match self {
            Layer::Rectangle(l) | Layer::Ellipse(l) => l.fill = color,
            Layer::Path(l) => l.fill = color,
            Layer::Text(l) | Layer::Note(l) => l.fill = color,
            Layer::Message(l) => l.fill = color,
            Layer::Image(l) => l.fill = color,
            Layer::Connector(l) => l.fill = color,
        }
    }

    pub fn is_connector(&self) -> bool {
        matches!(self, Layer::Connector(_))
    }

    /// A message whose content has been sent for generation.
    pub fn is_sent_message(&self) -> bool {
        matches!(self, Layer::Message(m) if m.is_sent())
    }

    pub fn as_connector(&self) -> Option<&ConnectorLayer> {
        match self {
            Layer::Connector(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&MessageLayer> {
        match self {
            Layer::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageLayer> {
        match self {
            Layer::Image(i) => Some(i),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector() -> Layer {
        Layer::Connector(ConnectorLayer {
            start_layer_id: "a".into(),
            end_layer_id: "b".into(),
            start_point: Point::new(0.0, 0.0),
            end_point: Point::new(10.0, 10.0),
            fill: Color::black(),
        })
    }

    #[test]
    fn test_color_to_css() {
        assert_eq!(Color::new(255, 136, 0).to_css(), "#ff8800");
        assert_eq!(Color::new(1, 2, 3).to_css(), "#010203");
    }

    #[test]
    fn test_color_peniko_conversion() {
        let color = Color::new(12, 34, 56);
        let paint: peniko::Color = color.into();
        assert_eq!(Color::from(paint), color);
    }

    #[test]
    fn test_with_defaults_positions_layer() {
        let layer = Layer::with_defaults(LayerKind::Note, Point::new(5.0, 6.0), (140.0, 120.0), Color::white())
            .expect("note is insertable");
        assert_eq!(layer.kind(), LayerKind::Note);
        assert_eq!(layer.bounds(), Some(Xywh::new(5.0, 6.0, 140.0, 120.0)));
        assert!(Layer::with_defaults(LayerKind::Connector, Point::ZERO, (1.0, 1.0), Color::black()).is_none());
    }

    #[test]
    fn test_translate_skips_connectors() {
        let mut rect = Layer::with_defaults(LayerKind::Rectangle, Point::ZERO, (10.0, 10.0), Color::black())
            .expect("rectangle is insertable");
        assert!(rect.translate(3.0, -2.0));
        assert_eq!(rect.bounds(), Some(Xywh::new(3.0, -2.0, 10.0, 10.0)));

        let mut edge = connector();
        let before = edge.clone();
        assert!(!edge.translate(3.0, -2.0));
        assert_eq!(edge, before);
        assert!(edge.bounds().is_none());
    }

    #[test]
    fn test_sent_message_detection() {
        let mut layer = Layer::with_defaults(LayerKind::Message, Point::ZERO, (10.0, 10.0), Color::black())
            .expect("message is insertable");
        assert!(!layer.is_sent_message());
        if let Layer::Message(m) = &mut layer {
            m.content = "A gothic cover".into();
        }
        assert!(layer.is_sent_message());
    }

    #[test]
    fn test_layer_json_is_tagged() {
        let layer = Layer::with_defaults(LayerKind::Ellipse, Point::new(1.0, 2.0), (3.0, 4.0), Color::new(1, 2, 3))
            .expect("ellipse is insertable");
        let json = serde_json::to_value(&layer).expect("serialize");
        assert_eq!(json["type"], "ellipse");
        let back: Layer = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, layer);
    }
}

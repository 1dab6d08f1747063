//! Connectors: directed edges between two other layers.

use super::{Color, LayerId};
use crate::document::Document;
use crate::geometry::{left_middle, right_middle};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// An edge from `start_layer_id` to `end_layer_id`.
///
/// The stored points are a cache from creation time. Renderers recompute the
/// live endpoints with [`connector_endpoints`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorLayer {
    pub start_layer_id: LayerId,
    pub end_layer_id: LayerId,
    pub start_point: Point,
    pub end_point: Point,
    pub fill: Color,
}

/// Live endpoints of a connector: right-middle of its start layer and
/// left-middle of its end layer.
///
/// Returns `None` when either referenced layer is gone or has no bounds.
pub fn connector_endpoints<D: Document + ?Sized>(doc: &D, connector: &ConnectorLayer) -> Option<(Point, Point)> {
    let start = doc.layer(&connector.start_layer_id)?.bounds()?;
    let end = doc.layer(&connector.end_layer_id)?.bounds()?;
    Some((right_middle(start), left_middle(end)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::geometry::Xywh;
    use crate::layers::{Layer, LayerKind};

    fn rect_at(x: f64, y: f64) -> Layer {
        Layer::with_defaults(LayerKind::Rectangle, Point::new(x, y), (100.0, 50.0), Color::black())
            .expect("rectangle is insertable")
    }

    #[test]
    fn test_endpoints_follow_live_bounds() {
        let mut doc = MemoryDocument::new();
        doc.insert_layer("a", &rect_at(0.0, 0.0)).expect("insert a");
        doc.insert_layer("b", &rect_at(300.0, 100.0)).expect("insert b");
        let connector = ConnectorLayer {
            start_layer_id: "a".into(),
            end_layer_id: "b".into(),
            start_point: Point::ZERO,
            end_point: Point::ZERO,
            fill: Color::black(),
        };

        let (start, end) = connector_endpoints(&doc, &connector).expect("both layers exist");
        assert_eq!(start, Point::new(100.0, 25.0));
        assert_eq!(end, Point::new(300.0, 125.0));

        let mut moved = rect_at(0.0, 0.0);
        moved.set_bounds(Xywh::new(10.0, 10.0, 100.0, 50.0));
        doc.update_layer("a", &moved).expect("update a");
        let (start, _) = connector_endpoints(&doc, &connector).expect("both layers exist");
        assert_eq!(start, Point::new(110.0, 35.0));
    }

    #[test]
    fn test_missing_layer_yields_none() {
        let mut doc = MemoryDocument::new();
        doc.insert_layer("a", &rect_at(0.0, 0.0)).expect("insert a");
        let connector = ConnectorLayer {
            start_layer_id: "a".into(),
            end_layer_id: "gone".into(),
            start_point: Point::ZERO,
            end_point: Point::ZERO,
            fill: Color::black(),
        };
        assert!(connector_endpoints(&doc, &connector).is_none());
    }
}

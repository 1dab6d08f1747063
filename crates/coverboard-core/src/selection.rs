//! Selection queries and manipulation handles.

use crate::document::Document;
use crate::geometry::{Xywh, contains, intersects, net_rect, right_middle, union_bounds};
use crate::layers::{Layer, LayerId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    /// Corner handle.
    Corner(Corner),
    /// Edge midpoint handle.
    Edge(Edge),
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    /// Handle type.
    pub kind: HandleKind,
}

impl Handle {
    /// Create a new handle.
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in world coordinates) hits this handle.
    /// `tolerance` should be adjusted for camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// The eight resize handles around `bounds`: four corners then four edges.
pub fn resize_handles(bounds: Xywh) -> Vec<Handle> {
    let Xywh { x, y, width, height } = bounds;
    let (cx, cy) = (x + width / 2.0, y + height / 2.0);
    let (r, b) = (bounds.right(), bounds.bottom());
    vec![
        Handle::new(Point::new(x, y), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(Point::new(r, y), HandleKind::Corner(Corner::TopRight)),
        Handle::new(Point::new(x, b), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(Point::new(r, b), HandleKind::Corner(Corner::BottomRight)),
        Handle::new(Point::new(cx, y), HandleKind::Edge(Edge::Top)),
        Handle::new(Point::new(r, cy), HandleKind::Edge(Edge::Right)),
        Handle::new(Point::new(cx, b), HandleKind::Edge(Edge::Bottom)),
        Handle::new(Point::new(x, cy), HandleKind::Edge(Edge::Left)),
    ]
}

/// Find which resize handle (if any) is under the pointer.
pub fn hit_test_handles(bounds: Xywh, point: Point, tolerance: f64) -> Option<HandleKind> {
    resize_handles(bounds)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}

/// Where connectors are dragged out of a layer.
pub fn connection_handle(bounds: Xywh) -> Point {
    right_middle(bounds)
}

/// Bounding box of the selected layers that have a position.
///
/// Connectors and ids missing from the document are skipped; `None` when
/// nothing positioned is selected.
pub fn selection_bounds<D: Document + ?Sized>(doc: &D, ids: &[LayerId]) -> Option<Xywh> {
    union_bounds(ids.iter().filter_map(|id| doc.layer(id)?.bounds()))
}

/// Positioned layers whose bounds strictly intersect the net spanned by
/// `origin` and `current`, in z-order.
pub fn layers_in_net<D: Document + ?Sized>(doc: &D, origin: Point, current: Point) -> Vec<LayerId> {
    let net = net_rect(origin, current);
    doc.layer_ids()
        .into_iter()
        .filter(|id| {
            doc.layer(id)
                .and_then(|layer| layer.bounds())
                .is_some_and(|bounds| intersects(bounds, net))
        })
        .collect()
}

/// Topmost non-connector layer containing `point` that passes `filter`.
pub fn topmost_layer_at<D, F>(doc: &D, point: Point, filter: F) -> Option<LayerId>
where
    D: Document + ?Sized,
    F: Fn(&LayerId, &Layer) -> bool,
{
    doc.layer_ids().into_iter().rev().find(|id| {
        doc.layer(id).is_some_and(|layer| {
            !layer.is_connector() && layer.bounds().is_some_and(|b| contains(b, point)) && filter(id, &layer)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::layers::{Color, ConnectorLayer, LayerKind};

    fn doc_with(rects: &[(&str, Xywh)]) -> MemoryDocument {
        let mut doc = MemoryDocument::new();
        for (id, bounds) in rects {
            let mut layer = Layer::with_defaults(LayerKind::Rectangle, Point::ZERO, (1.0, 1.0), Color::black())
                .expect("rectangle is insertable");
            layer.set_bounds(*bounds);
            doc.mutate(|d| d.insert_layer(id, &layer)).expect("insert");
        }
        doc
    }

    fn add_connector(doc: &mut MemoryDocument, id: &str, from: &str, to: &str) {
        let connector = Layer::Connector(ConnectorLayer {
            start_layer_id: from.into(),
            end_layer_id: to.into(),
            start_point: Point::ZERO,
            end_point: Point::ZERO,
            fill: Color::black(),
        });
        doc.mutate(|d| d.insert_layer(id, &connector)).expect("insert");
    }

    #[test]
    fn test_resize_handles_positions() {
        let handles = resize_handles(Xywh::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(handles.len(), 8);
        assert_eq!(handles[3].position, Point::new(100.0, 50.0));
        assert_eq!(handles[3].kind, HandleKind::Corner(Corner::BottomRight));
        assert_eq!(handles[5].position, Point::new(100.0, 25.0));
    }

    #[test]
    fn test_hit_test_handles() {
        let bounds = Xywh::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            hit_test_handles(bounds, Point::new(102.0, 99.0), 5.0),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
        assert_eq!(
            hit_test_handles(bounds, Point::new(50.0, -1.0), 5.0),
            Some(HandleKind::Edge(Edge::Top))
        );
        assert_eq!(hit_test_handles(bounds, Point::new(50.0, 50.0), 5.0), None);
    }

    #[test]
    fn test_connection_handle_is_right_middle() {
        assert_eq!(connection_handle(Xywh::new(10.0, 10.0, 100.0, 40.0)), Point::new(110.0, 30.0));
    }

    #[test]
    fn test_selection_bounds_skips_connectors() {
        let mut doc = doc_with(&[("a", Xywh::new(0.0, 0.0, 10.0, 10.0)), ("b", Xywh::new(50.0, 20.0, 10.0, 30.0))]);
        add_connector(&mut doc, "c", "a", "b");

        let ids: Vec<LayerId> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(selection_bounds(&doc, &ids), Some(Xywh::new(0.0, 0.0, 60.0, 50.0)));
        assert_eq!(selection_bounds(&doc, &["c".to_string()]), None);
        assert_eq!(selection_bounds(&doc, &[]), None);
    }

    #[test]
    fn test_layers_in_net() {
        let mut doc = doc_with(&[
            ("a", Xywh::new(0.0, 0.0, 10.0, 10.0)),
            ("b", Xywh::new(20.0, 40.0, 10.0, 10.0)),
            ("outside", Xywh::new(100.0, 100.0, 10.0, 10.0)),
            ("touching", Xywh::new(30.0, 0.0, 10.0, 10.0)),
        ]);
        add_connector(&mut doc, "c", "a", "b");

        // Net from (5,5) to (30,55): overlaps a and b, only touches `touching`.
        let ids = layers_in_net(&doc, Point::new(30.0, 55.0), Point::new(5.0, 5.0));
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_topmost_layer_at() {
        let doc = doc_with(&[("bottom", Xywh::new(0.0, 0.0, 100.0, 100.0)), ("top", Xywh::new(50.0, 50.0, 100.0, 100.0))]);

        assert_eq!(topmost_layer_at(&doc, Point::new(60.0, 60.0), |_, _| true), Some("top".into()));
        assert_eq!(topmost_layer_at(&doc, Point::new(10.0, 10.0), |_, _| true), Some("bottom".into()));
        assert_eq!(
            topmost_layer_at(&doc, Point::new(60.0, 60.0), |id, _| id != "top"),
            Some("bottom".into())
        );
        assert_eq!(topmost_layer_at(&doc, Point::new(500.0, 500.0), |_, _| true), None);
    }
}

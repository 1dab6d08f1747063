//! Pure geometry helpers shared by the state machine, selection and renderers.

use crate::camera::Camera;
use crate::selection::{Corner, Edge, HandleKind};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds of a positioned layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Xywh {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Xywh {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.right(), self.bottom())
    }
}

impl From<Rect> for Xywh {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

impl From<Xywh> for Rect {
    fn from(bounds: Xywh) -> Self {
        bounds.to_rect()
    }
}

/// Map a pointer position in screen space into canvas space.
pub fn pointer_to_canvas(screen: Point, camera: &Camera) -> Point {
    camera.screen_to_world(screen)
}

/// Normalized rectangle spanned by two corner points.
pub fn net_rect(origin: Point, current: Point) -> Xywh {
    Xywh::from(Rect::from_points(origin, current))
}

/// Strict overlap test; rectangles that only share an edge do not intersect.
pub fn intersects(a: Xywh, b: Xywh) -> bool {
    a.x + a.width > b.x && a.x < b.x + b.width && a.y + a.height > b.y && a.y < b.y + b.height
}

/// Inclusive point-in-rectangle test.
pub fn contains(bounds: Xywh, point: Point) -> bool {
    point.x >= bounds.x && point.x <= bounds.right() && point.y >= bounds.y && point.y <= bounds.bottom()
}

/// Union of every bounds yielded, or `None` when empty.
pub fn union_bounds(bounds: impl IntoIterator<Item = Xywh>) -> Option<Xywh> {
    bounds
        .into_iter()
        .map(|b| b.to_rect())
        .reduce(|acc, r| acc.union(r))
        .map(Xywh::from)
}

/// Midpoint of the right edge; connectors leave a layer here.
pub fn right_middle(bounds: Xywh) -> Point {
    Point::new(bounds.right(), bounds.y + bounds.height / 2.0)
}

/// Midpoint of the left edge; connectors enter a layer here.
pub fn left_middle(bounds: Xywh) -> Point {
    Point::new(bounds.x, bounds.y + bounds.height / 2.0)
}

/// Resize `initial` by dragging `handle` to `point`.
///
/// The side(s) opposite the handle stay fixed. Dragging past the fixed side
/// flips the box, so width and height are never negative.
pub fn resize_bounds(initial: Xywh, handle: HandleKind, point: Point) -> Xywh {
    let (left, right, top, bottom) = match handle {
        HandleKind::Corner(Corner::TopLeft) => (true, false, true, false),
        HandleKind::Corner(Corner::TopRight) => (false, true, true, false),
        HandleKind::Corner(Corner::BottomLeft) => (true, false, false, true),
        HandleKind::Corner(Corner::BottomRight) => (false, true, false, true),
        HandleKind::Edge(Edge::Top) => (false, false, true, false),
        HandleKind::Edge(Edge::Right) => (false, true, false, false),
        HandleKind::Edge(Edge::Bottom) => (false, false, false, true),
        HandleKind::Edge(Edge::Left) => (true, false, false, false),
    };

    let mut result = initial;

    if left {
        result.x = point.x.min(initial.right());
        result.width = (initial.right() - point.x).abs();
    }
    if right {
        result.x = point.x.min(initial.x);
        result.width = (point.x - initial.x).abs();
    }
    if top {
        result.y = point.y.min(initial.bottom());
        result.height = (initial.bottom() - point.y).abs();
    }
    if bottom {
        result.y = point.y.min(initial.y);
        result.height = (point.y - initial.y).abs();
    }

    result
}

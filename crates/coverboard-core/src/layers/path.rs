//! Free-hand pencil strokes.

use super::Color;
use crate::geometry::Xywh;
use serde::{Deserialize, Serialize};

/// One sampled pencil point: `[x, y, pressure]`.
pub type PenPoint = [f64; 3];

/// A committed pencil stroke.
///
/// `points` are relative to the top-left corner of `bounds`, so moving the
/// layer only touches `bounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathLayer {
    pub bounds: Xywh,
    pub fill: Color,
    pub points: Vec<PenPoint>,
}

/// Turn an absolute draft stroke into a path layer.
///
/// Returns `None` for strokes with fewer than two points.
pub fn pen_points_to_path(points: &[PenPoint], fill: Color) -> Option<PathLayer> {
    if points.len() < 2 {
        return None;
    }

    let mut left = f64::INFINITY;
    let mut top = f64::INFINITY;
    let mut right = f64::NEG_INFINITY;
    let mut bottom = f64::NEG_INFINITY;

    for &[x, y, _] in points {
        left = left.min(x);
        top = top.min(y);
        right = right.max(x);
        bottom = bottom.max(y);
    }

    Some(PathLayer {
        bounds: Xywh::new(left, top, right - left, bottom - top),
        fill,
        points: points
            .iter()
            .map(|&[x, y, pressure]| [x - left, y - top, pressure])
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_few_points() {
        assert!(pen_points_to_path(&[], Color::black()).is_none());
        assert!(pen_points_to_path(&[[1.0, 1.0, 0.5]], Color::black()).is_none());
    }

    #[test]
    fn test_points_become_relative() {
        let path = pen_points_to_path(&[[10.0, 20.0, 0.5], [30.0, 5.0, 0.7], [15.0, 25.0, 0.2]], Color::black())
            .expect("three points");
        assert_eq!(path.bounds, Xywh::new(10.0, 5.0, 20.0, 20.0));
        assert_eq!(path.points[0], [0.0, 15.0, 0.5]);
        assert_eq!(path.points[1], [20.0, 0.0, 0.7]);
        assert_eq!(path.points[2], [5.0, 20.0, 0.2]);
    }
}

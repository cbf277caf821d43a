// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in the plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl BoundingBox {
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// Build a box from two corners given in any order
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min: Point2::new(x0.min(x1), y0.min(y1)),
            max: Point2::new(x0.max(x1), y0.max(y1)),
        }
    }

    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Point2<f64>]) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(point);
        }
        bbox
    }

    pub fn expand_to_include(&mut self, point: &Point2<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// True when no point has been added, or the box was inverted by an intersection
    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y)
    }

    /// True when every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.min.x.is_finite()
            && self.min.y.is_finite()
            && self.max.x.is_finite()
            && self.max.y.is_finite()
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn size(&self) -> Vector2<f64> {
        Vector2::new(self.max.x - self.min.x, self.max.y - self.min.y)
    }

    pub fn area(&self) -> f64 {
        let size = self.size();
        size.x * size.y
    }

    /// Inclusive containment with an absolute tolerance
    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        x >= self.min.x - tolerance
            && x <= self.max.x + tolerance
            && y >= self.min.y - tolerance
            && y <= self.max.y + tolerance
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Overlap of two boxes; `None` when they are disjoint
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let bbox = BoundingBox {
            min: Point2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if bbox.is_empty() {
            None
        } else {
            Some(bbox)
        }
    }

    /// Grow the box by `margin` on every side
    pub fn padded(&self, margin: f64) -> BoundingBox {
        BoundingBox {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min.x - other.min.x).abs() < tolerance
            && (self.min.y - other.min.y).abs() < tolerance
            && (self.max.x - other.max.x).abs() < tolerance
            && (self.max.y - other.max.y).abs() < tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let mut bbox = BoundingBox::empty();
        assert!(bbox.is_empty());
        bbox.expand_to_include(&Point2::new(1.0, 2.0));
        bbox.expand_to_include(&Point2::new(-1.0, -2.0));

        assert_eq!(bbox.min, Point2::new(-1.0, -2.0));
        assert_eq!(bbox.max, Point2::new(1.0, 2.0));
        assert_eq!(bbox.center(), Point2::new(0.0, 0.0));
        assert_eq!(bbox.area(), 8.0);
    }

    #[test]
    fn test_intersection_and_union() {
        let a = BoundingBox::from_corners(0.0, 0.0, 2.0, 2.0);
        let b = BoundingBox::from_corners(1.0, 1.0, 3.0, 3.0);
        let c = BoundingBox::from_corners(5.0, 5.0, 6.0, 6.0);

        let overlap = a.intersection(&b).unwrap();
        assert!(overlap.approx_eq(&BoundingBox::from_corners(1.0, 1.0, 2.0, 2.0), 1e-12));
        assert!(a.intersection(&c).is_none());
        assert!(a
            .union(&c)
            .approx_eq(&BoundingBox::from_corners(0.0, 0.0, 6.0, 6.0), 1e-12));
    }

    #[test]
    fn test_degenerate_box_is_not_empty() {
        let edge = BoundingBox::from_corners(1.0, -1.0, 1.0, 1.0);
        assert!(!edge.is_empty());
        assert!(edge.contains(1.0, 0.5, 0.0));
        assert!(!edge.contains(1.1, 0.5, 0.0));
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! The curve tree: one tagged variant with a single dispatch point

use super::guard::guarded;
use super::{CompositeBoundary, LeafCurve, RFunctionNode, TrimmedSegment};
use crate::geometry::BoundingBox;
use crate::utils::math::{sanitize, sanitize_gradient, SENTINEL};
use nalgebra::Vector2;
use std::fmt;
use std::sync::Arc;

/// Any curve-capable node.
///
/// Children are reference counted, so one leaf or sub-tree can appear under several
/// parents without being copied. Trees are built bottom-up and never mutated, which
/// rules out cycles.
#[derive(Clone)]
pub enum Curve {
    Leaf(Arc<dyn LeafCurve>),
    Trimmed(Arc<TrimmedSegment>),
    Composite(Arc<CompositeBoundary>),
    RFunction(Arc<RFunctionNode>),
}

impl Curve {
    pub fn leaf(leaf: impl LeafCurve + 'static) -> Self {
        Curve::Leaf(Arc::new(leaf))
    }

    /// Short tag naming the variant, as used in documents
    pub fn type_name(&self) -> &'static str {
        match self {
            Curve::Leaf(_) => "leaf",
            Curve::Trimmed(_) => "trimmed",
            Curve::Composite(_) => "composite",
            Curve::RFunction(_) => "r_function",
        }
    }

    /// Field value without panic isolation; used while recursing through a tree
    pub(crate) fn evaluate_unguarded(&self, x: f64, y: f64) -> f64 {
        sanitize(match self {
            Curve::Leaf(leaf) => leaf.evaluate(x, y),
            Curve::Trimmed(segment) => segment.base().evaluate_unguarded(x, y),
            Curve::Composite(boundary) => boundary.evaluate_unguarded(x, y),
            Curve::RFunction(node) => node.evaluate_unguarded(x, y),
        })
    }

    pub(crate) fn gradient_unguarded(&self, x: f64, y: f64) -> Vector2<f64> {
        sanitize_gradient(match self {
            Curve::Leaf(leaf) => leaf.gradient(x, y),
            Curve::Trimmed(segment) => segment.base().gradient_unguarded(x, y),
            Curve::Composite(boundary) => boundary.gradient_unguarded(x, y),
            Curve::RFunction(node) => node.gradient_unguarded(x, y),
        })
    }

    pub(crate) fn contains_unguarded(&self, x: f64, y: f64, tolerance: f64) -> bool {
        match self {
            Curve::Trimmed(segment) => segment.contains_unguarded(x, y, tolerance),
            Curve::Composite(boundary) => boundary.contains(x, y, tolerance),
            Curve::Leaf(_) | Curve::RFunction(_) => self.evaluate_unguarded(x, y).abs() <= tolerance,
        }
    }

    /// Field value at (x, y).
    ///
    /// Non-finite results are clamped to finite sentinels; a panicking leaf yields `+SENTINEL`.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        guarded("evaluate", x, y, || self.evaluate_unguarded(x, y)).unwrap_or(SENTINEL)
    }

    /// Field gradient at (x, y); a panicking leaf yields the zero vector
    pub fn gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        guarded("gradient", x, y, || self.gradient_unguarded(x, y)).unwrap_or_else(Vector2::zeros)
    }

    /// On-curve membership within `tolerance`, honoring segment masks
    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        guarded("contains", x, y, || self.contains_unguarded(x, y, tolerance)).unwrap_or(false)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Curve::Leaf(leaf) => leaf.bounding_box(),
            Curve::Trimmed(segment) => segment.bounding_box(),
            Curve::Composite(boundary) => boundary.bounding_box(),
            Curve::RFunction(node) => node.bounding_box(),
        }
    }

    /// Number of nodes reachable from this one, counting shared nodes once per path
    pub fn node_count(&self) -> usize {
        match self {
            Curve::Leaf(_) => 1,
            Curve::Trimmed(segment) => 1 + segment.base().node_count(),
            Curve::Composite(boundary) => {
                1 + boundary
                    .segments()
                    .iter()
                    .map(|s| 1 + s.base().node_count())
                    .sum::<usize>()
            }
            Curve::RFunction(node) => 1 + node.a().node_count() + node.b().node_count(),
        }
    }

    /// True when both handles point at the same node
    pub fn ptr_eq(&self, other: &Curve) -> bool {
        match (self, other) {
            (Curve::Leaf(a), Curve::Leaf(b)) => Arc::ptr_eq(a, b),
            (Curve::Trimmed(a), Curve::Trimmed(b)) => Arc::ptr_eq(a, b),
            (Curve::Composite(a), Curve::Composite(b)) => Arc::ptr_eq(a, b),
            (Curve::RFunction(a), Curve::RFunction(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::Leaf(leaf) => f.debug_tuple("Leaf").field(leaf).finish(),
            Curve::Trimmed(segment) => f.debug_tuple("Trimmed").field(segment).finish(),
            Curve::Composite(boundary) => f.debug_tuple("Composite").field(boundary).finish(),
            Curve::RFunction(node) => f.debug_tuple("RFunction").field(node).finish(),
        }
    }
}

impl From<Arc<dyn LeafCurve>> for Curve {
    fn from(leaf: Arc<dyn LeafCurve>) -> Self {
        Curve::Leaf(leaf)
    }
}

impl From<TrimmedSegment> for Curve {
    fn from(segment: TrimmedSegment) -> Self {
        Curve::Trimmed(Arc::new(segment))
    }
}

impl From<Arc<TrimmedSegment>> for Curve {
    fn from(segment: Arc<TrimmedSegment>) -> Self {
        Curve::Trimmed(segment)
    }
}

impl From<CompositeBoundary> for Curve {
    fn from(boundary: CompositeBoundary) -> Self {
        Curve::Composite(Arc::new(boundary))
    }
}

impl From<Arc<CompositeBoundary>> for Curve {
    fn from(boundary: Arc<CompositeBoundary>) -> Self {
        Curve::Composite(boundary)
    }
}

impl From<RFunctionNode> for Curve {
    fn from(node: RFunctionNode) -> Self {
        Curve::RFunction(Arc::new(node))
    }
}

impl From<Arc<RFunctionNode>> for Curve {
    fn from(node: Arc<RFunctionNode>) -> Self {
        Curve::RFunction(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Circle, FnCurve};
    use nalgebra::Point2;

    #[test]
    fn test_non_finite_values_are_clamped() {
        let curve = Curve::leaf(FnCurve::new("nan", |_, _| f64::NAN));
        assert_eq!(curve.evaluate(0.0, 0.0), SENTINEL);
        assert!(!curve.contains(0.0, 0.0, 1e-3));

        let curve = Curve::leaf(FnCurve::new("neg_inf", |_, _| f64::NEG_INFINITY));
        assert_eq!(curve.evaluate(0.0, 0.0), -SENTINEL);
    }

    #[test]
    fn test_panicking_leaf_degrades() {
        let curve = Curve::leaf(FnCurve::new("boom", |x, _| {
            if x > 0.0 {
                panic!("leaf exploded");
            }
            x
        }));
        assert!(curve.contains(0.0, 0.0, 1e-3));
        assert!(!curve.contains(1.0, 0.0, 1e-3));
        assert_eq!(curve.evaluate(1.0, 0.0), SENTINEL);
        assert_eq!(curve.gradient(1.0, 0.0), Vector2::zeros());
    }

    #[test]
    fn test_leaf_contains_and_infinite_input() {
        let circle = Curve::leaf(Circle::unit());
        assert!(circle.contains(1.0, 0.0, 1e-3));
        assert!(!circle.contains(0.0, 0.0, 1e-3));
        assert!(!circle.contains(f64::INFINITY, 0.0, 1e-3));
        assert!(!circle.contains(f64::NAN, 0.0, 1e-3));
        assert_eq!(circle.type_name(), "leaf");
        assert_eq!(circle.node_count(), 1);
    }

    #[test]
    fn test_ptr_eq_tracks_sharing() {
        let shared = Curve::leaf(Circle::new(Point2::new(1.0, 0.0), 1.0));
        let alias = shared.clone();
        let other = Curve::leaf(Circle::new(Point2::new(1.0, 0.0), 1.0));
        assert!(shared.ptr_eq(&alias));
        assert!(!shared.ptr_eq(&other));
    }
}

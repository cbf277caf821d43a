// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Regions with holes

use super::{CompositeBoundary, Location};
use crate::error::{CurveError, Result};
use std::sync::Arc;

/// Closed outer boundary minus the open interiors of zero or more closed holes
#[derive(Debug, Clone)]
pub struct AreaRegion {
    outer: Arc<CompositeBoundary>,
    holes: Vec<Arc<CompositeBoundary>>,
}

impl AreaRegion {
    /// Fails unless the outer boundary and every hole are closed.
    ///
    /// Holes are expected to lie inside the outer boundary; that is not checked.
    pub fn new(outer: Arc<CompositeBoundary>, holes: &[Arc<CompositeBoundary>]) -> Result<Self> {
        if !outer.is_closed() {
            return Err(CurveError::OuterNotClosed);
        }
        if let Some(index) = holes.iter().position(|hole| !hole.is_closed()) {
            return Err(CurveError::HoleNotClosed { index });
        }
        Ok(Self {
            outer,
            holes: holes.to_vec(),
        })
    }

    pub fn outer(&self) -> &Arc<CompositeBoundary> {
        &self.outer
    }

    pub fn holes(&self) -> &[Arc<CompositeBoundary>] {
        &self.holes
    }

    /// Inside or on the outer boundary and not strictly inside any hole.
    ///
    /// Hole boundaries belong to the region.
    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.outer.classify(x, y, tolerance) != Location::Outside
            && self
                .holes
                .iter()
                .all(|hole| hole.classify(x, y, tolerance) != Location::Inside)
    }

    /// Shoelace area of the sampled outer loop minus those of the holes
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|hole| hole.enclosed_area()).sum();
        self.outer.enclosed_area() - holes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Circle, Curve, Predicate, TrimmedSegment};
    use crate::geometry::BoundingBox;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn square(half: f64) -> Arc<CompositeBoundary> {
        Arc::new(CompositeBoundary::rectangle(BoundingBox::from_corners(-half, -half, half, half)).unwrap())
    }

    #[test]
    fn test_square_with_hole() {
        let region = AreaRegion::new(square(2.0), &[square(1.0)]).unwrap();
        assert_relative_eq!(region.area(), 12.0, epsilon = 1e-6);
        assert!(region.contains(1.5, 0.0, 1e-3));
        assert!(region.contains(1.0, 0.0, 1e-3));
        assert!(region.contains(2.0, 2.0, 1e-3));
        assert!(!region.contains(0.0, 0.0, 1e-3));
        assert!(!region.contains(2.5, 0.0, 1e-3));
    }

    #[test]
    fn test_open_boundaries_are_rejected() {
        let leaf = Curve::leaf(Circle::unit());
        let open = Arc::new(
            CompositeBoundary::new(vec![
                TrimmedSegment::new(leaf.clone(), Predicate::quadrant(Point2::origin(), 1)),
                TrimmedSegment::new(leaf, Predicate::quadrant(Point2::origin(), 2)),
            ])
            .unwrap(),
        );
        assert!(matches!(AreaRegion::new(open.clone(), &[]), Err(CurveError::OuterNotClosed)));
        assert!(matches!(
            AreaRegion::new(square(3.0), &[square(1.0), open]),
            Err(CurveError::HoleNotClosed { index: 1 })
        ));
    }

    #[test]
    fn test_circle_region_by_ray_casting() {
        let disk = Arc::new(CompositeBoundary::circle(Point2::origin(), 1.0).unwrap());
        let region = AreaRegion::new(disk, &[]).unwrap();
        assert_relative_eq!(region.area(), std::f64::consts::PI, epsilon = 0.05);
        assert!(region.contains(0.0, 0.0, 1e-3));
        assert!(region.contains(0.5, 0.5, 1e-3));
        assert!(region.contains(1.0, 0.0, 1e-3));
        assert!(!region.contains(0.8, 0.8, 1e-3));
        assert!(!region.contains(f64::INFINITY, 0.0, 1e-3));
    }
}

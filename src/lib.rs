// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycurve Composition Kernel
//!
//! Planar shapes as zero-sets of scalar fields `f(x, y) = 0`: masked curve segments,
//! closed boundaries stitched from segments, R-function CSG with gradient propagation,
//! and regions with holes supporting containment and area queries.

pub mod config;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod io;
pub mod utils;

pub use config::SamplingConfig;
pub use curve::{
    AreaRegion, BoundaryHint, Circle, CompositeBoundary, Curve, Ellipse, FnCurve, LeafCurve, Line, Location,
    PointQuery, Predicate, RFunctionNode, RFunctionOp, ScalarField, TrimmedSegment,
};
pub use error::{CurveError, Result};
pub use geometry::BoundingBox;
pub use io::{load_document, save_document, CurveDocument, LeafRegistry, RegionDocument};

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use std::sync::Arc;

    #[test]
    fn test_unit_disk() {
        let boundary = Arc::new(CompositeBoundary::circle(Point2::origin(), 1.0).unwrap());
        let region = AreaRegion::new(boundary, &[]).unwrap();
        assert!((region.area() - std::f64::consts::PI).abs() < 0.1);
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batched point queries using rayon
//!
//! Every batch is split into independent chunks; each point is answered by the scalar
//! query, so batched and scalar results agree elementwise.

use super::{AreaRegion, CompositeBoundary, Curve, RFunctionNode, TrimmedSegment};
use crate::config::SamplingConfig;
use nalgebra::{Point2, Vector2};
use rayon::prelude::*;
use std::sync::Arc;

/// Membership queries, scalar and batched
pub trait PointQuery: Sync {
    fn contains_point(&self, x: f64, y: f64, tolerance: f64) -> bool;

    /// Configuration supplying the batch chunk size and default tolerance
    fn sampling_config(&self) -> Arc<SamplingConfig> {
        SamplingConfig::shared()
    }

    /// Membership with the configured default tolerance
    fn contains_default(&self, x: f64, y: f64) -> bool {
        self.contains_point(x, y, self.sampling_config().default_tolerance)
    }

    fn contains_many(&self, points: &[Point2<f64>], tolerance: f64) -> Vec<bool> {
        let min_chunk = self.sampling_config().parallel_min_chunk.max(1);
        points
            .par_iter()
            .with_min_len(min_chunk)
            .map(|p| self.contains_point(p.x, p.y, tolerance))
            .collect()
    }
}

/// Field queries, scalar and batched
pub trait ScalarField: Sync {
    fn field_value(&self, x: f64, y: f64) -> f64;

    fn field_gradient(&self, x: f64, y: f64) -> Vector2<f64>;

    fn evaluate_many(&self, points: &[Point2<f64>]) -> Vec<f64> {
        let min_chunk = SamplingConfig::shared().parallel_min_chunk.max(1);
        points
            .par_iter()
            .with_min_len(min_chunk)
            .map(|p| self.field_value(p.x, p.y))
            .collect()
    }

    fn gradient_many(&self, points: &[Point2<f64>]) -> Vec<Vector2<f64>> {
        let min_chunk = SamplingConfig::shared().parallel_min_chunk.max(1);
        points
            .par_iter()
            .with_min_len(min_chunk)
            .map(|p| self.field_gradient(p.x, p.y))
            .collect()
    }
}

impl PointQuery for Curve {
    fn contains_point(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.contains(x, y, tolerance)
    }

    fn sampling_config(&self) -> Arc<SamplingConfig> {
        match self {
            Curve::Trimmed(segment) => segment.config().clone(),
            Curve::Composite(boundary) => boundary.config().clone(),
            Curve::Leaf(_) | Curve::RFunction(_) => SamplingConfig::shared(),
        }
    }
}

impl ScalarField for Curve {
    fn field_value(&self, x: f64, y: f64) -> f64 {
        self.evaluate(x, y)
    }

    fn field_gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        self.gradient(x, y)
    }
}

impl PointQuery for TrimmedSegment {
    fn contains_point(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.contains(x, y, tolerance)
    }

    fn sampling_config(&self) -> Arc<SamplingConfig> {
        self.config().clone()
    }
}

impl ScalarField for TrimmedSegment {
    fn field_value(&self, x: f64, y: f64) -> f64 {
        self.evaluate(x, y)
    }

    fn field_gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        self.gradient(x, y)
    }
}

impl PointQuery for CompositeBoundary {
    fn contains_point(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.contains(x, y, tolerance)
    }

    fn sampling_config(&self) -> Arc<SamplingConfig> {
        self.config().clone()
    }
}

impl ScalarField for CompositeBoundary {
    fn field_value(&self, x: f64, y: f64) -> f64 {
        self.evaluate(x, y)
    }

    fn field_gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        self.gradient(x, y)
    }
}

impl PointQuery for RFunctionNode {
    fn contains_point(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.contains(x, y, tolerance)
    }
}

impl ScalarField for RFunctionNode {
    fn field_value(&self, x: f64, y: f64) -> f64 {
        self.evaluate(x, y)
    }

    fn field_gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        self.gradient(x, y)
    }
}

impl PointQuery for AreaRegion {
    fn contains_point(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.contains(x, y, tolerance)
    }

    fn sampling_config(&self) -> Arc<SamplingConfig> {
        self.outer().config().clone()
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Leaf curves - the elementary implicit functions every tree bottoms out in

use crate::geometry::BoundingBox;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Step used for central differences when a leaf has no analytic gradient
const FD_STEP: f64 = 1e-6;

/// Capability every leaf curve provides: a scalar field whose zero-set is the curve.
///
/// Leaves are immutable and shared between tree nodes, so implementations must be
/// `Send + Sync`.
pub trait LeafCurve: Send + Sync + fmt::Debug {
    /// Field value at (x, y); zero on the curve
    fn evaluate(&self, x: f64, y: f64) -> f64;

    /// Field gradient at (x, y)
    fn gradient(&self, x: f64, y: f64) -> Vector2<f64>;

    /// Finite bounds of the zero-set, when known
    fn bounding_box(&self) -> Option<BoundingBox> {
        None
    }

    /// Registry key used in documents
    fn kind(&self) -> &str;

    /// Document parameters; `None` marks the leaf as not serializable
    fn parameters(&self) -> Option<serde_json::Value> {
        None
    }
}

/// Circle `(x-cx)² + (y-cy)² - r² = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn unit() -> Self {
        Self::new(Point2::origin(), 1.0)
    }
}

impl LeafCurve for Circle {
    fn evaluate(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.center.x;
        let dy = y - self.center.y;
        dx * dx + dy * dy - self.radius * self.radius
    }

    fn gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        Vector2::new(2.0 * (x - self.center.x), 2.0 * (y - self.center.y))
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        let r = self.radius.abs();
        Some(BoundingBox::from_corners(
            self.center.x - r,
            self.center.y - r,
            self.center.x + r,
            self.center.y + r,
        ))
    }

    fn kind(&self) -> &str {
        "circle"
    }

    fn parameters(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}

/// Axis-aligned ellipse `((x-cx)/rx)² + ((y-cy)/ry)² - 1 = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point2<f64>,
    pub rx: f64,
    pub ry: f64,
}

impl Ellipse {
    pub fn new(center: Point2<f64>, rx: f64, ry: f64) -> Self {
        Self { center, rx, ry }
    }
}

impl LeafCurve for Ellipse {
    fn evaluate(&self, x: f64, y: f64) -> f64 {
        let u = (x - self.center.x) / self.rx;
        let v = (y - self.center.y) / self.ry;
        u * u + v * v - 1.0
    }

    fn gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        Vector2::new(
            2.0 * (x - self.center.x) / (self.rx * self.rx),
            2.0 * (y - self.center.y) / (self.ry * self.ry),
        )
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        let (rx, ry) = (self.rx.abs(), self.ry.abs());
        Some(BoundingBox::from_corners(
            self.center.x - rx,
            self.center.y - ry,
            self.center.x + rx,
            self.center.y + ry,
        ))
    }

    fn kind(&self) -> &str {
        "ellipse"
    }

    fn parameters(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}

/// Straight line `a·x + b·y + c = 0`, stored normalized so the field is a signed distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Line {
    /// Line from raw coefficients; a zero normal is kept as-is and never vanishes
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        let norm = a.hypot(b);
        if norm > 0.0 && norm.is_finite() {
            Self {
                a: a / norm,
                b: b / norm,
                c: c / norm,
            }
        } else {
            Self { a, b, c }
        }
    }

    /// Line through `p` and `q`; the left side of p→q is negative
    pub fn through(p: Point2<f64>, q: Point2<f64>) -> Self {
        let d = q - p;
        // outward normal of a counter-clockwise edge points to its right
        let (a, b) = (d.y, -d.x);
        Self::new(a, b, -(a * p.x + b * p.y))
    }
}

impl LeafCurve for Line {
    fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.a * x + self.b * y + self.c
    }

    fn gradient(&self, _x: f64, _y: f64) -> Vector2<f64> {
        Vector2::new(self.a, self.b)
    }

    fn kind(&self) -> &str {
        "line"
    }

    fn parameters(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}

type FieldFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;
type GradientFn = Arc<dyn Fn(f64, f64) -> Vector2<f64> + Send + Sync>;

/// Leaf backed by closures. Cannot be written to a document.
#[derive(Clone)]
pub struct FnCurve {
    name: String,
    field: FieldFn,
    gradient: Option<GradientFn>,
    bounds: Option<BoundingBox>,
}

impl FnCurve {
    pub fn new<F>(name: impl Into<String>, field: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            field: Arc::new(field),
            gradient: None,
            bounds: None,
        }
    }

    /// Attach an analytic gradient; otherwise central differences are used
    pub fn with_gradient<G>(mut self, gradient: G) -> Self
    where
        G: Fn(f64, f64) -> Vector2<f64> + Send + Sync + 'static,
    {
        self.gradient = Some(Arc::new(gradient));
        self
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

impl fmt::Debug for FnCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCurve")
            .field("name", &self.name)
            .field("analytic_gradient", &self.gradient.is_some())
            .field("bounds", &self.bounds)
            .finish()
    }
}

impl LeafCurve for FnCurve {
    fn evaluate(&self, x: f64, y: f64) -> f64 {
        (self.field)(x, y)
    }

    fn gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        match &self.gradient {
            Some(gradient) => gradient(x, y),
            None => {
                let fx = ((self.field)(x + FD_STEP, y) - (self.field)(x - FD_STEP, y)) / (2.0 * FD_STEP);
                let fy = ((self.field)(x, y + FD_STEP) - (self.field)(x, y - FD_STEP)) / (2.0 * FD_STEP);
                Vector2::new(fx, fy)
            }
        }
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounds
    }

    fn kind(&self) -> &str {
        &self.name
    }
}

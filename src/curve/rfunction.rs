// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! R-function CSG: boolean combinations of implicit curves via min/max identities

use super::guard::guarded;
use super::Curve;
use crate::error::{CurveError, Result};
use crate::geometry::BoundingBox;
use crate::utils::math::SENTINEL;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower bound on the blend normalizer so the weights stay finite
const BLEND_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RFunctionOp {
    Union,
    Intersection,
    /// `a` minus `b`
    Difference,
    /// Smoothed union; `alpha` sets the rounding radius
    Blend,
}

impl RFunctionOp {
    pub fn name(&self) -> &'static str {
        match self {
            RFunctionOp::Union => "union",
            RFunctionOp::Intersection => "intersection",
            RFunctionOp::Difference => "difference",
            RFunctionOp::Blend => "blend",
        }
    }
}

impl fmt::Display for RFunctionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RFunctionOp {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "union" => Ok(RFunctionOp::Union),
            "intersection" => Ok(RFunctionOp::Intersection),
            "difference" => Ok(RFunctionOp::Difference),
            "blend" => Ok(RFunctionOp::Blend),
            _ => Err(CurveError::UnknownOperation(s.to_string())),
        }
    }
}

/// Binary CSG node over any two curves
pub struct RFunctionNode {
    op: RFunctionOp,
    a: Curve,
    b: Curve,
    alpha: f64,
}

impl RFunctionNode {
    /// Validates that `alpha` is 0 for sharp operations and finite and positive for blends
    pub fn new(op: RFunctionOp, a: impl Into<Curve>, b: impl Into<Curve>, alpha: f64) -> Result<Self> {
        let valid = match op {
            RFunctionOp::Blend => alpha.is_finite() && alpha > 0.0,
            _ => alpha == 0.0,
        };
        if !valid {
            return Err(CurveError::InvalidAlpha { op: op.name(), alpha });
        }
        Ok(Self {
            op,
            a: a.into(),
            b: b.into(),
            alpha,
        })
    }

    /// Build from an operation name and an operand list, as read from a document
    pub fn from_parts(op: &str, mut operands: Vec<Curve>, alpha: f64) -> Result<Self> {
        let op = op.parse()?;
        if operands.len() != 2 {
            return Err(CurveError::OperandCount(operands.len()));
        }
        let b = operands.pop().ok_or(CurveError::OperandCount(0))?;
        let a = operands.pop().ok_or(CurveError::OperandCount(1))?;
        Self::new(op, a, b, alpha)
    }

    pub fn union(a: impl Into<Curve>, b: impl Into<Curve>) -> Self {
        Self::sharp(RFunctionOp::Union, a.into(), b.into())
    }

    pub fn intersection(a: impl Into<Curve>, b: impl Into<Curve>) -> Self {
        Self::sharp(RFunctionOp::Intersection, a.into(), b.into())
    }

    pub fn difference(a: impl Into<Curve>, b: impl Into<Curve>) -> Self {
        Self::sharp(RFunctionOp::Difference, a.into(), b.into())
    }

    pub fn blend(a: impl Into<Curve>, b: impl Into<Curve>, alpha: f64) -> Result<Self> {
        Self::new(RFunctionOp::Blend, a, b, alpha)
    }

    fn sharp(op: RFunctionOp, a: Curve, b: Curve) -> Self {
        Self { op, a, b, alpha: 0.0 }
    }

    pub fn op(&self) -> RFunctionOp {
        self.op
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn a(&self) -> &Curve {
        &self.a
    }

    pub fn b(&self) -> &Curve {
        &self.b
    }

    pub(crate) fn evaluate_unguarded(&self, x: f64, y: f64) -> f64 {
        let f1 = self.a.evaluate_unguarded(x, y);
        let f2 = self.b.evaluate_unguarded(x, y);
        match self.op {
            RFunctionOp::Union => f1.min(f2),
            RFunctionOp::Intersection => f1.max(f2),
            RFunctionOp::Difference => f1.max(-f2),
            RFunctionOp::Blend => {
                let d = f1 - f2;
                (f1 + f2 - (d * d + self.alpha * self.alpha).sqrt()) / 2.0
            }
        }
    }

    /// Gradient of the combined field; ties select operand `a`
    pub(crate) fn gradient_unguarded(&self, x: f64, y: f64) -> Vector2<f64> {
        let f1 = self.a.evaluate_unguarded(x, y);
        let f2 = self.b.evaluate_unguarded(x, y);
        match self.op {
            RFunctionOp::Union if f1 <= f2 => self.a.gradient_unguarded(x, y),
            RFunctionOp::Intersection if f1 >= f2 => self.a.gradient_unguarded(x, y),
            RFunctionOp::Union | RFunctionOp::Intersection => self.b.gradient_unguarded(x, y),
            RFunctionOp::Difference if f1 >= -f2 => self.a.gradient_unguarded(x, y),
            RFunctionOp::Difference => -self.b.gradient_unguarded(x, y),
            RFunctionOp::Blend => {
                let d = f1 - f2;
                let s = (d * d + self.alpha * self.alpha).sqrt().max(BLEND_EPS);
                let w1 = 0.5 * (1.0 - d / s);
                let w2 = 0.5 * (1.0 + d / s);
                self.a.gradient_unguarded(x, y) * w1 + self.b.gradient_unguarded(x, y) * w2
            }
        }
    }

    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        guarded("r-function evaluate", x, y, || self.evaluate_unguarded(x, y)).unwrap_or(SENTINEL)
    }

    pub fn gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        guarded("r-function gradient", x, y, || self.gradient_unguarded(x, y)).unwrap_or_else(Vector2::zeros)
    }

    /// On the combined zero-set within `tolerance`
    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        guarded("r-function contains", x, y, || {
            self.evaluate_unguarded(x, y).abs() <= tolerance
        })
        .unwrap_or(false)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let a = self.a.bounding_box();
        let b = self.b.bounding_box();
        match self.op {
            RFunctionOp::Union => Some(a?.union(&b?)),
            RFunctionOp::Intersection => match (a, b) {
                (Some(a), Some(b)) => Some(a.intersection(&b).unwrap_or_else(BoundingBox::empty)),
                (a, b) => a.or(b),
            },
            RFunctionOp::Difference => a,
            RFunctionOp::Blend => Some(a?.union(&b?).padded(self.alpha)),
        }
    }
}

impl fmt::Debug for RFunctionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RFunctionNode")
            .field("op", &self.op)
            .field("alpha", &self.alpha)
            .field("a", &self.a)
            .field("b", &self.b)
            .finish()
    }
}

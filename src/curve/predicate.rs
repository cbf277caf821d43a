// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Masks restricting which points of a base curve belong to a segment

use crate::geometry::BoundingBox;
use crate::utils::math::normalize_angle;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Closed half-plane `a·x + b·y + c ≤ 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfPlane {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl HalfPlane {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Same half-plane with `(a, b)` scaled to unit length
    pub fn normalized(&self) -> Self {
        let norm = self.a.hypot(self.b);
        if norm > 0.0 && norm.is_finite() {
            Self::new(self.a / norm, self.b / norm, self.c / norm)
        } else {
            *self
        }
    }

    pub fn value(&self, x: f64, y: f64) -> f64 {
        self.a * x + self.b * y + self.c
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.value(x, y) <= 0.0
    }
}

type MaskFn = Arc<dyn Fn(f64, f64) -> bool + Send + Sync>;

/// Boolean predicate over the plane.
///
/// Closed-form variants serialize and expose their bounds; `Custom` wraps an arbitrary
/// callback and cannot be written to a document as code.
#[derive(Clone)]
pub enum Predicate {
    /// Every point passes
    Always,
    /// `min ≤ coordinate ≤ max`; a missing side is unbounded
    AxisRange {
        axis: Axis,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Every half-plane holds
    HalfPlanes(Vec<HalfPlane>),
    /// Polar angle about `center` within `[start, start + sweep]`, in radians
    AngularRange {
        center: Point2<f64>,
        start: f64,
        sweep: f64,
    },
    /// Distance from `center` within `[min, max]`
    RadialRange {
        center: Point2<f64>,
        min: f64,
        max: f64,
    },
    /// Conjunction
    All(Vec<Predicate>),
    /// Opaque callback
    Custom(MaskFn),
}

impl Predicate {
    pub fn from_fn<F>(mask: F) -> Self
    where
        F: Fn(f64, f64) -> bool + Send + Sync + 'static,
    {
        Predicate::Custom(Arc::new(mask))
    }

    /// Inclusive axis-aligned rectangle
    pub fn rect(bounds: &BoundingBox) -> Self {
        Predicate::All(vec![
            Predicate::AxisRange {
                axis: Axis::X,
                min: Some(bounds.min.x),
                max: Some(bounds.max.x),
            },
            Predicate::AxisRange {
                axis: Axis::Y,
                min: Some(bounds.min.y),
                max: Some(bounds.max.y),
            },
        ])
    }

    /// Closed quadrant about `center`, numbered counter-clockwise from `x ≥ cx, y ≥ cy`
    pub fn quadrant(center: Point2<f64>, quadrant: u8) -> Self {
        let (right, up) = match quadrant % 4 {
            1 => (true, true),
            2 => (false, true),
            3 => (false, false),
            _ => (true, false),
        };
        let range = |axis, c: f64, positive: bool| Predicate::AxisRange {
            axis,
            min: positive.then_some(c),
            max: (!positive).then_some(c),
        };
        Predicate::All(vec![range(Axis::X, center.x, right), range(Axis::Y, center.y, up)])
    }

    /// Evaluate the predicate. Callbacks may panic; callers guard against that.
    pub fn test(&self, x: f64, y: f64) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::AxisRange { axis, min, max } => {
                let v = match axis {
                    Axis::X => x,
                    Axis::Y => y,
                };
                min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
            }
            Predicate::HalfPlanes(planes) => planes.iter().all(|p| p.contains(x, y)),
            Predicate::AngularRange { center, start, sweep } => {
                if *sweep >= std::f64::consts::TAU {
                    return true;
                }
                let angle = (y - center.y).atan2(x - center.x);
                normalize_angle(angle - start) <= *sweep
            }
            Predicate::RadialRange { center, min, max } => {
                let r = (x - center.x).hypot(y - center.y);
                r >= *min && r <= *max
            }
            Predicate::All(parts) => parts.iter().all(|p| p.test(x, y)),
            Predicate::Custom(mask) => mask(x, y),
        }
    }

    pub fn is_always(&self) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::All(parts) => parts.iter().all(Predicate::is_always),
            _ => false,
        }
    }

    pub fn is_custom(&self) -> bool {
        match self {
            Predicate::Custom(_) => true,
            Predicate::All(parts) => parts.iter().any(Predicate::is_custom),
            _ => false,
        }
    }

    /// True when the accepted set is exactly the box returned by [`Predicate::bounds`]
    pub fn is_axis_rect(&self) -> bool {
        match self {
            Predicate::AxisRange { .. } => true,
            Predicate::All(parts) => parts.iter().all(Predicate::is_axis_rect),
            _ => false,
        }
    }

    /// Box containing every accepted point; sides may be infinite
    pub fn bounds(&self) -> BoundingBox {
        let unbounded = BoundingBox::from_corners(
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::INFINITY,
        );
        match self {
            Predicate::AxisRange { axis, min, max } => {
                let lo = min.unwrap_or(f64::NEG_INFINITY);
                let hi = max.unwrap_or(f64::INFINITY);
                let mut bounds = unbounded;
                match axis {
                    Axis::X => {
                        bounds.min.x = lo;
                        bounds.max.x = hi;
                    }
                    Axis::Y => {
                        bounds.min.y = lo;
                        bounds.max.y = hi;
                    }
                }
                bounds
            }
            Predicate::RadialRange { center, max, .. } => BoundingBox::from_corners(
                center.x - max,
                center.y - max,
                center.x + max,
                center.y + max,
            ),
            Predicate::All(parts) => parts.iter().fold(unbounded, |acc, p| {
                acc.intersection(&p.bounds()).unwrap_or_else(BoundingBox::empty)
            }),
            _ => unbounded,
        }
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::Always
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => write!(f, "Always"),
            Predicate::AxisRange { axis, min, max } => f
                .debug_struct("AxisRange")
                .field("axis", axis)
                .field("min", min)
                .field("max", max)
                .finish(),
            Predicate::HalfPlanes(planes) => f.debug_tuple("HalfPlanes").field(planes).finish(),
            Predicate::AngularRange { center, start, sweep } => f
                .debug_struct("AngularRange")
                .field("center", center)
                .field("start", start)
                .field("sweep", sweep)
                .finish(),
            Predicate::RadialRange { center, min, max } => f
                .debug_struct("RadialRange")
                .field("center", center)
                .field("min", min)
                .field("max", max)
                .finish(),
            Predicate::All(parts) => f.debug_tuple("All").field(parts).finish(),
            Predicate::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrants_are_closed() {
        let origin = Point2::origin();
        let q1 = Predicate::quadrant(origin, 1);
        let q2 = Predicate::quadrant(origin, 2);
        let q3 = Predicate::quadrant(origin, 3);
        let q4 = Predicate::quadrant(origin, 4);

        assert!(q1.test(1.0, 0.0) && q4.test(1.0, 0.0));
        assert!(q1.test(0.0, 1.0) && q2.test(0.0, 1.0));
        assert!(q3.test(-0.5, -0.5));
        assert!(!q3.test(0.5, -0.5));
        assert!(q1.is_axis_rect());
    }

    #[test]
    fn test_angular_range_wraps() {
        let mask = Predicate::AngularRange {
            center: Point2::origin(),
            start: 1.5 * std::f64::consts::PI,
            sweep: std::f64::consts::PI,
        };
        // right half-plane: from -90° through 0° to +90°
        assert!(mask.test(1.0, 0.0));
        assert!(mask.test(0.5, 0.9));
        assert!(!mask.test(-1.0, 0.1));
    }

    #[test]
    fn test_radial_range_and_bounds() {
        let ring = Predicate::RadialRange {
            center: Point2::new(1.0, 1.0),
            min: 0.5,
            max: 1.0,
        };
        assert!(ring.test(1.75, 1.0));
        assert!(!ring.test(1.0, 1.0));
        assert!(ring
            .bounds()
            .approx_eq(&BoundingBox::from_corners(0.0, 0.0, 2.0, 2.0), 1e-12));
    }

    #[test]
    fn test_rect_bounds() {
        let bounds = BoundingBox::from_corners(-1.0, 0.0, 2.0, 3.0);
        let rect = Predicate::rect(&bounds);
        assert!(rect.bounds().approx_eq(&bounds, 1e-12));
        assert!(rect.test(-1.0, 3.0));
        assert!(!rect.test(-1.0001, 3.0));

        let half = Predicate::quadrant(Point2::origin(), 1).bounds();
        assert_eq!(half.min, Point2::new(0.0, 0.0));
        assert!(half.max.x.is_infinite());
    }

    #[test]
    fn test_custom_and_half_planes() {
        let mask = Predicate::from_fn(|x, _| x > 0.0);
        assert!(mask.is_custom());
        assert!(mask.test(1.0, 0.0));
        assert!(!mask.test(0.0, 0.0));

        let wedge = Predicate::HalfPlanes(vec![HalfPlane::new(-1.0, 0.0, 0.0), HalfPlane::new(0.0, -1.0, 0.0)]);
        assert!(wedge.test(0.0, 0.0));
        assert!(!wedge.test(-0.1, 1.0));
    }
}

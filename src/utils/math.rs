// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point2, Vector2};

/// Finite stand-in for non-finite field values.
///
/// Small enough that its square stays finite, so blend formulas never overflow.
pub const SENTINEL: f64 = 1.0e150;

/// Clamp NaN and infinities to finite sentinels so sign tests stay well-defined.
///
/// NaN maps to `+SENTINEL`, which reads as "far outside, not on the curve".
pub fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        SENTINEL
    } else {
        value.clamp(-SENTINEL, SENTINEL)
    }
}

/// Gradient counterpart of [`sanitize`]; NaN components become zero
pub fn sanitize_gradient(gradient: Vector2<f64>) -> Vector2<f64> {
    gradient.map(|c| if c.is_nan() { 0.0 } else { c.clamp(-SENTINEL, SENTINEL) })
}

/// z-component of the cross product of two plane vectors
pub fn cross2(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Check if two floats are approximately equal
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Point between `a` and `b` at parameter `t`
pub fn lerp_point(a: &Point2<f64>, b: &Point2<f64>, t: f64) -> Point2<f64> {
    Point2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Angle normalized into `[0, 2π)`
pub fn normalize_angle(angle: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let wrapped = angle.rem_euclid(tau);
    if wrapped >= tau {
        0.0
    } else {
        wrapped
    }
}

/// `n + 1` evenly spaced samples over `[start, end]`
pub fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let n = n.max(1);
    let step = (end - start) / n as f64;
    (0..=n).map(move |i| if i == n { end } else { start + step * i as f64 })
}

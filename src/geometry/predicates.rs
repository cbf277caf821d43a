// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Robust planar predicates for ray casting and half-plane tests
//! Near-zero determinants are recomputed with compensated arithmetic

use crate::utils::math::cross2;
use nalgebra::{Point2, Vector2};

/// Epsilon for floating point comparisons
const EPS: f64 = 1e-12;
/// Tolerance on the edge parameter when deciding a ray passes through a vertex
const VERTEX_EPS: f64 = 1e-9;

/// Twice the signed area of triangle (a, b, c).
///
/// Positive if c lies to the left of a→b, negative to the right, near-zero if collinear.
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let result = cross2(&ab, &ac);

    if result.abs() < EPS {
        compensated_orient2d(&ab, &ac)
    } else {
        result
    }
}

/// Difference of products `a*b - c*d` with a fused correction term
fn two_product_diff(a: f64, b: f64, c: f64, d: f64) -> f64 {
    let cd = c * d;
    let err = c.mul_add(d, -cd);
    let dop = a.mul_add(b, -cd);
    dop - err
}

fn compensated_orient2d(ab: &Vector2<f64>, ac: &Vector2<f64>) -> f64 {
    two_product_diff(ab.x, ac.y, ab.y, ac.x)
}

/// Outcome of intersecting a ray with one boundary edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayHit {
    /// The ray does not touch the edge
    Miss,
    /// The ray crosses the edge transversally in its open interior
    Cross,
    /// Tangent, collinear, through a vertex, or starting on the edge
    Degenerate,
}

/// Intersect the ray `origin + t·direction, t > 0` with the segment `a→b`
pub fn ray_segment_hit(
    origin: &Point2<f64>,
    direction: &Vector2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> RayHit {
    let edge = b - a;
    let length = edge.norm();
    if length < EPS {
        return RayHit::Miss;
    }

    let w = a - origin;
    let scale = w.norm().max(length).max(1.0);
    let denom = cross2(direction, &edge);

    if denom.abs() <= EPS * length {
        // Parallel: only a collinear edge ahead of the origin is a problem
        let offset = cross2(&w, direction);
        if offset.abs() <= EPS * scale {
            let ahead_a = w.dot(direction);
            let ahead_b = (b - origin).dot(direction);
            if ahead_a >= 0.0 || ahead_b >= 0.0 {
                return RayHit::Degenerate;
            }
        }
        return RayHit::Miss;
    }

    let t = cross2(&w, &edge) / denom;
    let s = cross2(&w, direction) / denom;

    if !t.is_finite() || !s.is_finite() {
        return RayHit::Miss;
    }
    if s < -VERTEX_EPS || s > 1.0 + VERTEX_EPS {
        return RayHit::Miss;
    }
    if t.abs() <= EPS * scale {
        return RayHit::Degenerate;
    }
    if t < 0.0 {
        return RayHit::Miss;
    }
    if s.abs() <= VERTEX_EPS || (s - 1.0).abs() <= VERTEX_EPS {
        return RayHit::Degenerate;
    }
    RayHit::Cross
}

/// Signed distance of a point from the line `a·x + b·y + c = 0`, with `(a, b)` normalized
pub fn half_plane_distance(a: f64, b: f64, c: f64, x: f64, y: f64) -> f64 {
    let norm = a.hypot(b);
    if norm < EPS {
        return c;
    }
    (a * x + b * y + c) / norm
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sampled polylines: shoelace area and even-odd ray casting

use super::predicates::{ray_segment_hit, RayHit};
use crate::utils::math::cross2;
use nalgebra::{Point2, Vector2};

/// Angle of the primary ray direction (+X)
const PRIMARY_ANGLE: f64 = 0.0;
/// Angular step between successive perturbed rays
const PERTURBATION_STEP: f64 = 0.0317;
/// Second fixed direction used once every perturbed ray was degenerate
const FALLBACK_ANGLE: f64 = 1.9113;

/// Ordered point sequence, optionally closed back onto its first point
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point2<f64>>,
    pub closed: bool,
}

impl Polyline {
    pub fn open(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point2<f64>> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point2<f64>> {
        self.points.last()
    }

    /// Consecutive point pairs, including the closing edge when closed
    pub fn edges(&self) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> + '_ {
        let closing = if self.closed && self.points.len() > 2 {
            self.points.last().zip(self.points.first())
        } else {
            None
        };
        self.points.windows(2).map(|w| (&w[0], &w[1])).chain(closing)
    }

    /// Total length of all edges
    pub fn length(&self) -> f64 {
        self.edges().map(|(a, b)| (b - a).norm()).sum()
    }

    pub fn reversed(&self) -> Polyline {
        let mut points = self.points.clone();
        points.reverse();
        Polyline {
            points,
            closed: self.closed,
        }
    }
}

/// Signed area via the shoelace formula; counter-clockwise is positive.
///
/// The point list is treated as implicitly closed.
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    twice_area / 2.0
}

/// Count ray crossings against every edge; `None` if any crossing is degenerate
fn count_crossings(point: &Point2<f64>, direction: &Vector2<f64>, polylines: &[Polyline]) -> Option<usize> {
    let mut crossings = 0;
    for polyline in polylines {
        for (a, b) in polyline.edges() {
            match ray_segment_hit(point, direction, a, b) {
                RayHit::Miss => {}
                RayHit::Cross => crossings += 1,
                RayHit::Degenerate => return None,
            }
        }
    }
    Some(crossings)
}

/// Count crossings with the half-open rule: an edge crosses when its endpoints lie on
/// strictly different sides of the ray line, where "on the line" counts as the right
/// side. A vertex on the ray is then counted once and collinear edges never count.
fn count_crossings_lenient(point: &Point2<f64>, direction: &Vector2<f64>, polylines: &[Polyline]) -> usize {
    polylines
        .iter()
        .flat_map(|p| p.edges())
        .filter(|(a, b)| {
            let (wa, wb) = (*a - point, *b - point);
            let (sa, sb) = (cross2(direction, &wa), cross2(direction, &wb));
            if (sa > 0.0) == (sb > 0.0) {
                return false;
            }
            let s = sa / (sa - sb);
            (wa + (wb - wa) * s).dot(direction) > 0.0
        })
        .count()
}

fn direction(angle: f64) -> Vector2<f64> {
    let (s, c) = angle.sin_cos();
    Vector2::new(c, s)
}

/// Even-odd point-in-region test against a set of polylines.
///
/// A degenerate hit (the ray passing through a vertex or running along an edge)
/// rotates the ray by a fixed step and retries, at most `retry_limit` times, before
/// falling back to a second fixed direction.
pub fn ray_cast_inside(point: &Point2<f64>, polylines: &[Polyline], retry_limit: usize) -> bool {
    for attempt in 0..=retry_limit {
        let angle = PRIMARY_ANGLE + PERTURBATION_STEP * attempt as f64;
        if let Some(crossings) = count_crossings(point, &direction(angle), polylines) {
            return crossings % 2 == 1;
        }
    }

    let fallback = direction(FALLBACK_ANGLE);
    match count_crossings(point, &fallback, polylines) {
        Some(crossings) => crossings % 2 == 1,
        None => {
            log::warn!(
                "ray cast at ({}, {}) stayed degenerate after {} retries",
                point.x,
                point.y,
                retry_limit
            );
            count_crossings_lenient(point, &fallback, polylines) % 2 == 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Polyline {
        Polyline::closed(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn test_shoelace_orientation() {
        let square = unit_square();
        assert_relative_eq!(signed_area(&square.points), 1.0);
        assert_relative_eq!(signed_area(&square.reversed().points), -1.0);
        assert_eq!(signed_area(&square.points[..2]), 0.0);
    }

    #[test]
    fn test_edges_include_closing_edge() {
        let square = unit_square();
        assert_eq!(square.edges().count(), 4);
        assert_relative_eq!(square.length(), 4.0);

        let open = Polyline::open(square.points.clone());
        assert_eq!(open.edges().count(), 3);
    }

    #[test]
    fn test_ray_cast_inside_and_outside() {
        let polylines = vec![unit_square()];
        assert!(ray_cast_inside(&Point2::new(0.5, 0.25), &polylines, 8));
        assert!(!ray_cast_inside(&Point2::new(1.5, 0.5), &polylines, 8));
        assert!(!ray_cast_inside(&Point2::new(-0.5, 0.5), &polylines, 8));
    }

    #[test]
    fn test_ray_through_vertex_is_retried() {
        // The +X ray from (0.5, 0.0) passes exactly through the vertex (1, 0).
        let diamond = vec![Polyline::closed(vec![
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
            Point2::new(0.0, -1.0),
        ])];
        assert!(ray_cast_inside(&Point2::new(0.5, 0.0), &diamond, 8));
        assert!(ray_cast_inside(&Point2::new(0.0, 0.0), &diamond, 8));
        assert!(!ray_cast_inside(&Point2::new(-2.0, 0.0), &diamond, 8));
    }

    #[test]
    fn test_fallback_direction_after_retries() {
        // retry_limit 0: the +X ray hits the vertex (1, 0) and the fallback ray decides
        let diamond = vec![Polyline::closed(vec![
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
            Point2::new(0.0, -1.0),
        ])];
        let point = Point2::new(0.5, 0.0);
        assert!(count_crossings(&point, &direction(PRIMARY_ANGLE), &diamond).is_none());
        assert!(count_crossings(&point, &direction(FALLBACK_ANGLE), &diamond).is_some());
        assert!(ray_cast_inside(&point, &diamond, 0));
        assert!(!ray_cast_inside(&Point2::new(2.0, 0.0), &diamond, 0));
    }

    #[test]
    fn test_every_direction_degenerate() {
        // vertices sit on both the primary and the fallback ray from the origin
        let corner = |angle: f64| Point2::from(direction(angle));
        let quad = vec![Polyline::closed(vec![
            corner(PRIMARY_ANGLE),
            corner(FALLBACK_ANGLE),
            corner(3.5),
            corner(5.0),
        ])];
        let origin = Point2::origin();
        assert!(count_crossings(&origin, &direction(PRIMARY_ANGLE), &quad).is_none());
        assert!(count_crossings(&origin, &direction(FALLBACK_ANGLE), &quad).is_none());

        let first = ray_cast_inside(&origin, &quad, 0);
        assert!(first);
        assert_eq!(first, ray_cast_inside(&origin, &quad, 0));
        assert_eq!(count_crossings_lenient(&origin, &direction(FALLBACK_ANGLE), &quad), 1);
    }

    #[test]
    fn test_ray_cast_with_hole() {
        let outer = Polyline::closed(vec![
            Point2::new(-2.0, -2.0),
            Point2::new(2.0, -2.0),
            Point2::new(2.0, 2.0),
            Point2::new(-2.0, 2.0),
        ]);
        let hole = Polyline::closed(vec![
            Point2::new(-1.0, -1.0),
            Point2::new(1.0, -1.0),
            Point2::new(1.0, 1.0),
            Point2::new(-1.0, 1.0),
        ]);
        let polylines = vec![outer, hole];
        assert!(!ray_cast_inside(&Point2::new(0.1, 0.2), &polylines, 8));
        assert!(ray_cast_inside(&Point2::new(1.5, 0.2), &polylines, 8));
    }
}

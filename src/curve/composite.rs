// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Composite boundaries
//!
//! An ordered set of trimmed segments that can be read as an open polyline or, once the
//! segment endpoints are found to chain into a single cycle, as the boundary of a region.
//! Point-in-region tests ray cast against the sampled loop unless the boundary carries a
//! closed-form hint (rectangle or convex polygon), in which case they reduce to half-plane
//! tests.

use super::guard::guarded;
use super::predicate::{Axis, HalfPlane};
use super::{Circle, Curve, Line, Predicate, SegmentSamples, TrimmedSegment};
use crate::config::SamplingConfig;
use crate::error::{CurveError, Result};
use crate::geometry::{orient2d, ray_cast_inside, signed_area, BoundingBox, Polyline};
use crate::utils::math::{cross2, SENTINEL};
use nalgebra::{Point2, Vector2};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a point lies relative to a closed boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    OnBoundary,
    Outside,
}

/// Closed-form description of the enclosed region, attached by shape builders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryHint {
    AxisRect { bounds: BoundingBox },
    /// Interior is where every `a·x + b·y + c ≤ 0`; planes are unit-normalized
    ConvexHalfPlanes { planes: Vec<HalfPlane> },
}

impl BoundaryHint {
    /// Largest signed distance outside any edge; negative inside
    fn excess(&self, x: f64, y: f64) -> f64 {
        match self {
            BoundaryHint::AxisRect { bounds } => (bounds.min.x - x)
                .max(x - bounds.max.x)
                .max(bounds.min.y - y)
                .max(y - bounds.max.y),
            BoundaryHint::ConvexHalfPlanes { planes } => planes
                .iter()
                .map(|p| p.value(x, y))
                .fold(f64::NEG_INFINITY, f64::max),
        }
    }

    pub fn classify(&self, x: f64, y: f64, tolerance: f64) -> Location {
        let excess = self.excess(x, y);
        if excess < -tolerance {
            Location::Inside
        } else if excess <= tolerance {
            Location::OnBoundary
        } else {
            Location::Outside
        }
    }

    fn normalized(self) -> Self {
        match self {
            BoundaryHint::ConvexHalfPlanes { planes } => BoundaryHint::ConvexHalfPlanes {
                planes: planes.iter().map(HalfPlane::normalized).collect(),
            },
            rect => rect,
        }
    }
}

struct Closure {
    closed: bool,
    /// The stitched loop when closed, otherwise every sampled piece
    outline: Vec<Polyline>,
}

/// Ordered arrangement of trimmed segments
pub struct CompositeBoundary {
    segments: Vec<TrimmedSegment>,
    hint: Option<BoundaryHint>,
    config: Arc<SamplingConfig>,
    closure: OnceCell<Closure>,
}

impl CompositeBoundary {
    pub fn new(segments: Vec<TrimmedSegment>) -> Result<Self> {
        let config = segments
            .first()
            .map(|s| s.config().clone())
            .ok_or(CurveError::EmptyBoundary)?;
        Ok(Self {
            segments,
            hint: None,
            config,
            closure: OnceCell::new(),
        })
    }

    /// Attach a closed-form interior description used by [`CompositeBoundary::classify`]
    pub fn with_hint(mut self, hint: BoundaryHint) -> Self {
        self.hint = Some(hint.normalized());
        self
    }

    pub fn segments(&self) -> &[TrimmedSegment] {
        &self.segments
    }

    pub fn hint(&self) -> Option<&BoundaryHint> {
        self.hint.as_ref()
    }

    /// Configuration of the first segment, used for closure and ray casting
    pub fn config(&self) -> &Arc<SamplingConfig> {
        &self.config
    }

    /// Axis-aligned rectangle with counter-clockwise edges
    pub fn rectangle(bounds: BoundingBox) -> Result<Self> {
        Self::rectangle_with(bounds, SamplingConfig::shared())
    }

    pub fn rectangle_with(bounds: BoundingBox, config: Arc<SamplingConfig>) -> Result<Self> {
        let size = bounds.size();
        if !bounds.is_finite() || !(size.x > 0.0 && size.y > 0.0) {
            return Err(CurveError::InvalidPolygon(format!(
                "rectangle needs finite positive extent, got {bounds:?}"
            )));
        }

        let (x0, y0, x1, y1) = (bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y);
        let corners = [
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ];

        let segments = (0..4)
            .map(|i| {
                let (p, q) = (corners[i], corners[(i + 1) % 4]);
                let axis = if i % 2 == 0 { Axis::X } else { Axis::Y };
                let (lo, hi) = match axis {
                    Axis::X => (p.x.min(q.x), p.x.max(q.x)),
                    Axis::Y => (p.y.min(q.y), p.y.max(q.y)),
                };
                TrimmedSegment::new(
                    Curve::leaf(Line::through(p, q)),
                    Predicate::AxisRange {
                        axis,
                        min: Some(lo),
                        max: Some(hi),
                    },
                )
                .with_bounds(BoundingBox::from_points(&[p, q]))
                .with_config(config.clone())
            })
            .collect();

        Ok(Self::new(segments)?.with_hint(BoundaryHint::AxisRect { bounds }))
    }

    /// Strictly convex polygon; vertices may be given in either orientation
    pub fn convex_polygon(vertices: &[Point2<f64>]) -> Result<Self> {
        Self::convex_polygon_with(vertices, SamplingConfig::shared())
    }

    pub fn convex_polygon_with(vertices: &[Point2<f64>], config: Arc<SamplingConfig>) -> Result<Self> {
        let n = vertices.len();
        if n < 3 {
            return Err(CurveError::InvalidPolygon(format!("need at least 3 vertices, got {n}")));
        }
        if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
            return Err(CurveError::InvalidPolygon("non-finite vertex".to_string()));
        }

        let mut vertices = vertices.to_vec();
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }

        let mut turning = 0.0;
        for i in 0..n {
            let (a, b, c) = (vertices[i], vertices[(i + 1) % n], vertices[(i + 2) % n]);
            if orient2d(&a, &b, &c) <= 0.0 {
                return Err(CurveError::InvalidPolygon(format!(
                    "vertex {} is not a strictly convex corner",
                    (i + 1) % n
                )));
            }
            let (u, v) = (b - a, c - b);
            turning += cross2(&u, &v).atan2(u.dot(&v));
        }
        if (turning - std::f64::consts::TAU).abs() > 1e-6 {
            return Err(CurveError::InvalidPolygon("polygon winds more than once".to_string()));
        }

        let mut planes = Vec::with_capacity(n);
        let segments = (0..n)
            .map(|i| {
                let (a, b) = (vertices[i], vertices[(i + 1) % n]);
                let u = (b - a).normalize();
                let line = Line::through(a, b);
                planes.push(HalfPlane::new(line.a, line.b, line.c));

                // end caps: behind neither endpoint along the edge direction
                let caps = Predicate::HalfPlanes(vec![
                    HalfPlane::new(-u.x, -u.y, u.dot(&a.coords)),
                    HalfPlane::new(u.x, u.y, -u.dot(&b.coords)),
                ]);
                TrimmedSegment::new(Curve::leaf(line), caps)
                    .with_bounds(BoundingBox::from_points(&[a, b]))
                    .with_config(config.clone())
            })
            .collect();

        Ok(Self::new(segments)?.with_hint(BoundaryHint::ConvexHalfPlanes { planes }))
    }

    /// Full circle as four quarter arcs of one shared leaf
    pub fn circle(center: Point2<f64>, radius: f64) -> Result<Self> {
        Self::circle_with(center, radius, SamplingConfig::shared())
    }

    pub fn circle_with(center: Point2<f64>, radius: f64, config: Arc<SamplingConfig>) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) || !center.x.is_finite() || !center.y.is_finite() {
            return Err(CurveError::InvalidParameters {
                kind: "circle".to_string(),
                reason: format!("center {center:?}, radius {radius}"),
            });
        }

        let leaf = Curve::leaf(Circle::new(center, radius));
        let segments = (1..=4)
            .map(|quadrant| {
                TrimmedSegment::new(leaf.clone(), Predicate::quadrant(center, quadrant))
                    .with_config(config.clone())
            })
            .collect();
        Self::new(segments)
    }

    /// Logical OR of the segments' membership; a failing segment counts as not containing
    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.segments.iter().any(|s| s.contains(x, y, tolerance))
    }

    /// Segment whose base field is closest to zero at (x, y); ties go to the earlier one
    fn nearest_branch(&self, x: f64, y: f64) -> Option<(&TrimmedSegment, f64)> {
        let (first, rest) = self.segments.split_first()?;
        let mut best = (first, first.base().evaluate_unguarded(x, y));
        for segment in rest {
            let value = segment.base().evaluate_unguarded(x, y);
            if value.abs() < best.1.abs() {
                best = (segment, value);
            }
        }
        Some(best)
    }

    pub(crate) fn evaluate_unguarded(&self, x: f64, y: f64) -> f64 {
        self.nearest_branch(x, y).map_or(SENTINEL, |(_, value)| value)
    }

    pub(crate) fn gradient_unguarded(&self, x: f64, y: f64) -> Vector2<f64> {
        self.nearest_branch(x, y)
            .map_or_else(Vector2::zeros, |(segment, _)| segment.base().gradient_unguarded(x, y))
    }

    /// Value of the nearest branch.
    ///
    /// Only meaningful for rendering; containment decisions go through
    /// [`CompositeBoundary::contains`] and [`CompositeBoundary::classify`].
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        guarded("composite evaluate", x, y, || self.evaluate_unguarded(x, y)).unwrap_or(SENTINEL)
    }

    pub fn gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        guarded("composite gradient", x, y, || self.gradient_unguarded(x, y)).unwrap_or_else(Vector2::zeros)
    }

    /// Union of the segment bounds; unknown if any segment is unbounded
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.segments
            .iter()
            .map(TrimmedSegment::bounding_box)
            .try_fold(BoundingBox::empty(), |acc, b| b.map(|b| acc.union(&b)))
    }

    fn closure(&self) -> &Closure {
        self.closure.get_or_init(|| {
            // may run on a rayon batch worker; no nested parallel work while the cell is held
            let samples: Vec<&SegmentSamples> = self.segments.iter().map(TrimmedSegment::samples).collect();
            let factor = self.config.closure_tolerance_factor;

            let stitched = match samples.as_slice() {
                [single] => single_loop(single, factor),
                _ => stitch_loop(&samples, factor),
            };
            log::debug!(
                "closure of {}-segment boundary: {}",
                self.segments.len(),
                if stitched.is_some() { "closed" } else { "open" }
            );

            match stitched {
                Some(outline) => Closure {
                    closed: true,
                    outline: vec![outline],
                },
                None => Closure {
                    closed: false,
                    outline: samples.iter().flat_map(|s| s.pieces.iter().cloned()).collect(),
                },
            }
        })
    }

    /// True when the segment endpoints chain into exactly one cycle through every segment
    pub fn is_closed(&self) -> bool {
        self.closure().closed
    }

    /// Continuity-ordered sampled loop, available once the boundary is closed
    pub fn loop_polyline(&self) -> Option<&Polyline> {
        let closure = self.closure();
        if closure.closed {
            closure.outline.first()
        } else {
            None
        }
    }

    /// Absolute shoelace area of the sampled loop; zero when open
    pub fn enclosed_area(&self) -> f64 {
        self.loop_polyline()
            .map_or(0.0, |outline| signed_area(&outline.points).abs())
    }

    /// Locate a point relative to the region this boundary encloses.
    ///
    /// A hint answers exactly with `tolerance` as a distance. Without one, points on a
    /// segment are `OnBoundary` and the rest are decided by even-odd ray casting.
    pub fn classify(&self, x: f64, y: f64, tolerance: f64) -> Location {
        if !x.is_finite() || !y.is_finite() {
            return Location::Outside;
        }
        if let Some(hint) = &self.hint {
            return hint.classify(x, y, tolerance);
        }
        if self.contains(x, y, tolerance) {
            return Location::OnBoundary;
        }

        let closure = self.closure();
        if ray_cast_inside(&Point2::new(x, y), &closure.outline, self.config.ray_retry_limit) {
            Location::Inside
        } else {
            Location::Outside
        }
    }
}

/// A lone segment closes on itself: one closed piece, or one open piece whose ends meet
fn single_loop(samples: &SegmentSamples, factor: f64) -> Option<Polyline> {
    match samples.pieces.as_slice() {
        [piece] if piece.closed => Some(piece.clone()),
        [piece] if piece.len() > 2 => {
            let (a, b) = (piece.first()?, piece.last()?);
            ((a - b).norm() <= factor * samples.step).then(|| Polyline::closed(piece.points.clone()))
        }
        _ => None,
    }
}

/// Fraction of the matching tolerance by which the nearest endpoint must beat the next one
const AMBIGUITY_MARGIN: f64 = 0.1;

/// Pair every piece endpoint with its nearest endpoint on another segment and walk the
/// pairs; succeeds only if pairing is mutual and the walk is a single cycle through all pieces
fn stitch_loop(samples: &[&SegmentSamples], factor: f64) -> Option<Polyline> {
    let mut pieces: Vec<(usize, &Polyline)> = Vec::new();
    for (segment, s) in samples.iter().enumerate() {
        if s.pieces.is_empty() {
            log::debug!("segment {segment} has no sampled points");
            return None;
        }
        for piece in &s.pieces {
            if piece.closed || piece.len() < 2 {
                return None;
            }
            pieces.push((segment, piece));
        }
    }

    // endpoint 2k is the start of piece k, 2k + 1 its end
    let endpoint = |e: usize| {
        let points = &pieces[e / 2].1.points;
        if e % 2 == 0 {
            points[0]
        } else {
            points[points.len() - 1]
        }
    };

    let count = pieces.len() * 2;
    let mut partner = vec![0usize; count];
    for e in 0..count {
        let segment = pieces[e / 2].0;
        let point = endpoint(e);
        // nearest in-range candidate as (endpoint, distance, tolerance), plus the runner-up distance
        let mut best: Option<(usize, f64, f64)> = None;
        let mut runner_up: Option<f64> = None;
        for f in 0..count {
            let other = pieces[f / 2].0;
            if other == segment {
                continue;
            }
            let tolerance = factor * samples[segment].step.max(samples[other].step);
            let distance = (endpoint(f) - point).norm();
            if distance > tolerance {
                continue;
            }
            match best {
                Some((_, nearest, _)) if distance >= nearest => {
                    runner_up = Some(runner_up.map_or(distance, |r| r.min(distance)));
                }
                _ => {
                    runner_up = best.map(|(_, nearest, _)| nearest);
                    best = Some((f, distance, tolerance));
                }
            }
        }

        let (f, nearest, tolerance) = best?;
        // short neighbouring pieces put several endpoints in range; only a near tie is ambiguous
        if runner_up.is_some_and(|second| second - nearest <= AMBIGUITY_MARGIN * tolerance) {
            log::debug!("endpoint {point:?} of segment {segment} is ambiguous");
            return None;
        }
        partner[e] = f;
    }
    if (0..count).any(|e| partner[partner[e]] != e) {
        return None;
    }

    let mut points = Vec::new();
    let mut visited = vec![false; pieces.len()];
    let mut entry = 0;
    while !visited[entry / 2] {
        let piece = pieces[entry / 2].1;
        visited[entry / 2] = true;
        if entry % 2 == 0 {
            points.extend(piece.points.iter().copied());
        } else {
            points.extend(piece.points.iter().rev().copied());
        }
        entry = partner[entry ^ 1];
    }

    if entry != 0 || visited.contains(&false) {
        return None;
    }
    Some(Polyline::closed(points))
}

impl fmt::Debug for CompositeBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeBoundary")
            .field("segments", &self.segments)
            .field("hint", &self.hint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quarter(leaf: &Curve, quadrant: u8) -> TrimmedSegment {
        TrimmedSegment::new(leaf.clone(), Predicate::quadrant(Point2::origin(), quadrant))
    }

    #[test]
    fn test_four_quarters_close() {
        let leaf = Curve::leaf(Circle::unit());
        let boundary = CompositeBoundary::new((1..=4).map(|q| quarter(&leaf, q)).collect()).unwrap();
        assert!(boundary.is_closed());

        let half = CompositeBoundary::new(vec![quarter(&leaf, 1), quarter(&leaf, 2)]).unwrap();
        assert!(!half.is_closed());
    }

    #[test]
    fn test_empty_boundary_is_rejected() {
        assert!(matches!(CompositeBoundary::new(Vec::new()), Err(CurveError::EmptyBoundary)));
    }

    #[test]
    fn test_single_full_loop_is_closed() {
        let boundary = CompositeBoundary::new(vec![TrimmedSegment::untrimmed(Curve::leaf(Circle::unit()))]).unwrap();
        assert!(boundary.is_closed());
        assert_relative_eq!(boundary.enclosed_area(), std::f64::consts::PI, epsilon = 0.05);

        let arc = TrimmedSegment::new(
            Curve::leaf(Circle::unit()),
            Predicate::AxisRange {
                axis: Axis::Y,
                min: Some(0.0),
                max: None,
            },
        );
        assert!(!CompositeBoundary::new(vec![arc]).unwrap().is_closed());
    }

    #[test]
    fn test_contains_is_or_of_segments() {
        let boundary = CompositeBoundary::circle(Point2::origin(), 1.0).unwrap();
        assert!(boundary.contains(1.0, 0.0, 1e-3));
        assert!(boundary.contains(0.0, -1.0, 1e-3));
        assert!(!boundary.contains(0.0, 0.0, 1e-3));
        assert!(!boundary.contains(0.5, 0.5, 1e-3));
        assert!(!boundary.contains(2.0, 0.0, 1e-3));
    }

    #[test]
    fn test_classify_by_ray_casting() {
        let boundary = CompositeBoundary::circle(Point2::new(1.0, 1.0), 2.0).unwrap();
        assert_eq!(boundary.classify(1.0, 1.0, 1e-3), Location::Inside);
        assert_eq!(boundary.classify(3.0, 1.0, 1e-3), Location::OnBoundary);
        assert_eq!(boundary.classify(3.5, 1.0, 1e-3), Location::Outside);
        assert_eq!(boundary.classify(f64::NAN, 1.0, 1e-3), Location::Outside);
    }

    #[test]
    fn test_rectangle_hint_and_closure() {
        let rect = CompositeBoundary::rectangle(BoundingBox::from_corners(-1.0, -1.0, 1.0, 1.0)).unwrap();
        assert!(rect.is_closed());
        assert_relative_eq!(rect.enclosed_area(), 4.0, epsilon = 1e-6);
        assert_eq!(rect.classify(0.0, 0.0, 1e-3), Location::Inside);
        assert_eq!(rect.classify(1.0, 0.3, 1e-3), Location::OnBoundary);
        assert_eq!(rect.classify(1.1, 0.3, 1e-3), Location::Outside);
        assert!(rect.contains(1.0, 0.3, 1e-3));
        assert!(!rect.contains(1.0, 1.5, 1e-3));
    }

    #[test]
    fn test_convex_polygon() {
        // clockwise input is reoriented
        let triangle = [Point2::new(0.0, 0.0), Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)];
        let boundary = CompositeBoundary::convex_polygon(&triangle).unwrap();
        assert!(boundary.is_closed());
        assert_relative_eq!(boundary.enclosed_area(), 2.0, epsilon = 1e-6);
        assert_eq!(boundary.classify(0.5, 0.5, 1e-3), Location::Inside);
        assert_eq!(boundary.classify(1.0, 1.0, 1e-3), Location::OnBoundary);
        assert_eq!(boundary.classify(1.5, 1.5, 1e-3), Location::Outside);
        assert!(boundary.contains(1.0, 1.0, 1e-3));
        assert!(!boundary.contains(3.0, -1.0, 1e-3));
    }

    #[test]
    fn test_invalid_polygons() {
        let collinear = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert!(CompositeBoundary::convex_polygon(&collinear).is_err());

        let dart = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 0.5),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(matches!(CompositeBoundary::convex_polygon(&dart), Err(CurveError::InvalidPolygon(_))));
        assert!(CompositeBoundary::convex_polygon(&dart[..2]).is_err());
        assert!(CompositeBoundary::rectangle(BoundingBox::from_corners(0.0, 0.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_nearest_branch_evaluate() {
        let rect = CompositeBoundary::rectangle(BoundingBox::from_corners(0.0, 0.0, 4.0, 2.0)).unwrap();
        // nearest edge is the bottom one, at distance 0.5 inside
        assert_relative_eq!(rect.evaluate(2.0, 0.5), -0.5, epsilon = 1e-12);
        let g = rect.gradient(2.0, 0.5);
        assert_relative_eq!(g.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_box_union() {
        let boundary = CompositeBoundary::circle(Point2::new(2.0, 0.0), 1.0).unwrap();
        let bbox = boundary.bounding_box().unwrap();
        assert!(bbox.approx_eq(&BoundingBox::from_corners(1.0, -1.0, 3.0, 1.0), 1e-12));
    }

    #[test]
    fn test_cold_closure_from_parallel_queries() {
        use rayon::prelude::*;

        let leaf = Curve::leaf(Circle::unit());
        let boundary = CompositeBoundary::new((1..=4).map(|q| quarter(&leaf, q)).collect()).unwrap();
        let inside: Vec<bool> = (0..512)
            .into_par_iter()
            .with_min_len(1)
            .map(|i| boundary.classify(0.9 * (i as f64 / 512.0), 0.0, 1e-3) == Location::Inside)
            .collect();
        assert!(inside.iter().all(|&v| v));
        assert!(boundary.is_closed());
    }
}

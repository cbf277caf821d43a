// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closure detection and interior tests on composite boundaries

use nalgebra::Point2;
use polycurve::curve::{Circle, CompositeBoundary, Curve, Line, Location, Predicate, TrimmedSegment};
use polycurve::curve::predicate::HalfPlane;
use polycurve::{AreaRegion, BoundingBox};
use std::sync::Arc;

fn quarter_arcs(quadrants: &[u8]) -> CompositeBoundary {
    let leaf = Curve::leaf(Circle::unit());
    let segments = quadrants
        .iter()
        .map(|&q| TrimmedSegment::new(leaf.clone(), Predicate::quadrant(Point2::origin(), q)))
        .collect();
    CompositeBoundary::new(segments).unwrap()
}

#[test_log::test]
fn four_quarter_arcs_close() {
    assert!(quarter_arcs(&[1, 2, 3, 4]).is_closed());
    // order only affects rendering
    assert!(quarter_arcs(&[3, 1, 4, 2]).is_closed());
}

#[test_log::test]
fn two_quarter_arcs_stay_open() {
    let half = quarter_arcs(&[1, 2]);
    assert!(!half.is_closed());
    assert!(half.loop_polyline().is_none());
}

#[test_log::test]
fn unit_circle_membership() {
    let boundary = quarter_arcs(&[1, 2, 3, 4]);
    assert!(boundary.contains(1.0, 0.0, 1e-3));
    assert!(!boundary.contains(0.0, 0.0, 1e-3));
    assert!(!boundary.contains(0.5, 0.5, 1e-3));
    assert!(!boundary.contains(2.0, 0.0, 1e-3));
}

#[test_log::test]
fn interior_by_ray_casting() {
    let boundary = quarter_arcs(&[1, 2, 3, 4]);
    assert_eq!(boundary.classify(0.0, 0.0, 1e-3), Location::Inside);
    assert_eq!(boundary.classify(0.5, 0.5, 1e-3), Location::Inside);
    assert_eq!(boundary.classify(0.0, 1.0, 1e-3), Location::OnBoundary);
    assert_eq!(boundary.classify(0.9, 0.9, 1e-3), Location::Outside);
    assert_eq!(boundary.classify(f64::INFINITY, 0.0, 1e-3), Location::Outside);
}

#[test_log::test]
fn duplicated_segment_is_ambiguous() {
    // two identical half-lines plus one closing arc: endpoints match more than one partner
    let line = Curve::leaf(Line::new(0.0, 1.0, 0.0));
    let chord = || {
        TrimmedSegment::new(
            line.clone(),
            Predicate::AxisRange {
                axis: polycurve::curve::Axis::X,
                min: Some(-1.0),
                max: Some(1.0),
            },
        )
    };
    let arc = TrimmedSegment::new(
        Curve::leaf(Circle::unit()),
        Predicate::AxisRange {
            axis: polycurve::curve::Axis::Y,
            min: Some(0.0),
            max: None,
        },
    );
    let boundary = CompositeBoundary::new(vec![chord(), chord(), arc]).unwrap();
    assert!(!boundary.is_closed());
}

#[test_log::test]
fn half_disk_from_chord_and_arc() {
    let chord = TrimmedSegment::new(
        Curve::leaf(Line::new(0.0, 1.0, 0.0)),
        Predicate::AxisRange {
            axis: polycurve::curve::Axis::X,
            min: Some(-1.0),
            max: Some(1.0),
        },
    );
    let arc = TrimmedSegment::new(
        Curve::leaf(Circle::unit()),
        Predicate::AxisRange {
            axis: polycurve::curve::Axis::Y,
            min: Some(0.0),
            max: None,
        },
    );
    let boundary = CompositeBoundary::new(vec![chord, arc]).unwrap();
    assert!(boundary.is_closed());
    assert!((boundary.enclosed_area() - std::f64::consts::FRAC_PI_2).abs() < 0.05);
    assert_eq!(boundary.classify(0.0, 0.5, 1e-3), Location::Inside);
    assert_eq!(boundary.classify(0.0, -0.5, 1e-3), Location::Outside);
}

#[test_log::test]
fn hint_matches_ray_casting_away_from_the_boundary() {
    let vertices = [
        Point2::new(0.0, 0.0),
        Point2::new(3.0, 0.0),
        Point2::new(4.0, 2.0),
        Point2::new(1.0, 3.0),
    ];
    let hinted = CompositeBoundary::convex_polygon(&vertices).unwrap();
    let bare = CompositeBoundary::new(
        hinted
            .segments()
            .iter()
            .map(|s| TrimmedSegment::new(s.base().clone(), s.mask().clone()).with_bounds(s.bounding_box().unwrap()))
            .collect(),
    )
    .unwrap();
    assert!(bare.hint().is_none());
    assert!(bare.is_closed());

    for &(x, y) in &[(1.0, 1.0), (3.5, 2.0), (2.0, 2.5), (-1.0, 1.0), (4.5, 2.0), (2.0, -0.5)] {
        assert_eq!(hinted.classify(x, y, 1e-3), bare.classify(x, y, 1e-3), "at ({x}, {y})");
    }
}

#[test_log::test]
fn hint_planes_are_normalized() {
    let leaf = Curve::leaf(Line::new(0.0, -1.0, 0.0));
    let boundary = CompositeBoundary::new(vec![TrimmedSegment::untrimmed(leaf)])
        .unwrap()
        .with_hint(polycurve::BoundaryHint::ConvexHalfPlanes {
            planes: vec![HalfPlane::new(0.0, -4.0, 0.0), HalfPlane::new(0.0, 4.0, -8.0)],
        });
    // planes y ≥ 0 and y ≤ 2, distance tolerance measured in world units
    assert_eq!(boundary.classify(0.0, 1.0, 1e-3), Location::Inside);
    assert_eq!(boundary.classify(0.0, 2.0005, 1e-3), Location::OnBoundary);
    assert_eq!(boundary.classify(0.0, 2.01, 1e-3), Location::Outside);
}

#[test_log::test]
fn rectangle_bounds() {
    let rect = CompositeBoundary::rectangle(BoundingBox::from_corners(1.0, 2.0, 4.0, 3.0)).unwrap();
    let bbox = rect.bounding_box().unwrap();
    assert!(bbox.approx_eq(&BoundingBox::from_corners(1.0, 2.0, 4.0, 3.0), 1e-12));
}

#[test_log::test]
fn thin_rectangle_closes() {
    // the short sides are shorter than the long sides' matching distance
    let rect = CompositeBoundary::rectangle(BoundingBox::from_corners(0.0, 0.0, 1.0, 0.01)).unwrap();
    assert!(rect.is_closed());

    let region = AreaRegion::new(Arc::new(rect), &[]).unwrap();
    assert!((region.area() - 0.01).abs() < 1e-3);
    assert!(region.contains(0.5, 0.005, 1e-4));
    assert!(!region.contains(0.5, 0.02, 1e-4));
}

#[test_log::test]
fn polygon_with_short_edge_closes() {
    let vertices = [
        Point2::new(0.0, 0.0),
        Point2::new(2.0, 0.0),
        Point2::new(2.01, 0.01),
        Point2::new(2.0, 2.0),
        Point2::new(0.0, 2.0),
    ];
    let polygon = CompositeBoundary::convex_polygon(&vertices).unwrap();
    assert!(polygon.is_closed());

    // hint-free copy decides closure and interior from sampling alone
    let bare = CompositeBoundary::new(
        polygon
            .segments()
            .iter()
            .map(|s| TrimmedSegment::new(s.base().clone(), s.mask().clone()).with_bounds(s.bounding_box().unwrap()))
            .collect(),
    )
    .unwrap();
    assert!(bare.is_closed());
    assert_eq!(bare.classify(1.0, 1.0, 1e-3), Location::Inside);
    assert_eq!(bare.classify(2.5, 1.0, 1e-3), Location::Outside);

    let region = AreaRegion::new(Arc::new(polygon), &[]).unwrap();
    assert!((region.area() - 4.01).abs() < 0.05);
}

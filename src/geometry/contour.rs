// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Zero-set extraction by marching squares
//!
//! The field is sampled on a regular grid over a window, every cell whose corners
//! change sign contributes a short segment between interpolated edge crossings, and
//! the segments are chained into polylines through their shared grid edges.

use super::{BoundingBox, Polyline};
use nalgebra::Point2;
use std::collections::HashMap;

/// Points closer than this are merged while chaining
const MERGE_EPS: f64 = 1e-14;

/// Sampled scalar field over a regular grid
pub struct ContourGrid {
    window: BoundingBox,
    cells: usize,
    dx: f64,
    dy: f64,
    values: Vec<f64>,
}

impl ContourGrid {
    /// Sample `field` on `(cells + 1)²` nodes spanning `window`
    pub fn sample<F>(window: &BoundingBox, cells: usize, field: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        let cells = cells.max(2);
        let size = window.size();
        let dx = size.x / cells as f64;
        let dy = size.y / cells as f64;

        let mut values = Vec::with_capacity((cells + 1) * (cells + 1));
        for j in 0..=cells {
            let y = window.min.y + dy * j as f64;
            for i in 0..=cells {
                let x = window.min.x + dx * i as f64;
                values.push(field(x, y));
            }
        }

        Self {
            window: *window,
            cells,
            dx,
            dy,
            values,
        }
    }

    /// Largest spacing between neighbouring grid nodes
    pub fn step(&self) -> f64 {
        self.dx.max(self.dy)
    }

    fn node(&self, i: usize, j: usize) -> Point2<f64> {
        Point2::new(
            self.window.min.x + self.dx * i as f64,
            self.window.min.y + self.dy * j as f64,
        )
    }

    fn value(&self, i: usize, j: usize) -> f64 {
        self.values[j * (self.cells + 1) + i]
    }

    fn horizontal_edge(&self, i: usize, j: usize) -> usize {
        2 * (j * (self.cells + 1) + i)
    }

    fn vertical_edge(&self, i: usize, j: usize) -> usize {
        2 * (j * (self.cells + 1) + i) + 1
    }

    /// Zero crossing along the grid edge with the given id
    fn crossing(&self, edge: usize) -> Point2<f64> {
        let node = edge / 2;
        let i = node % (self.cells + 1);
        let j = node / (self.cells + 1);
        let (i2, j2) = if edge % 2 == 0 { (i + 1, j) } else { (i, j + 1) };

        let a = self.node(i, j);
        let b = self.node(i2, j2);
        let va = self.value(i, j);
        let vb = self.value(i2, j2);

        let denom = vb - va;
        if denom.abs() < f64::MIN_POSITIVE {
            return a;
        }
        let t = (-va / denom).clamp(0.0, 1.0);
        Point2::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
    }

    /// Cell segments as pairs of grid edge ids
    fn cell_segments<F>(&self, field: &F) -> Vec<(usize, usize)>
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut segments = Vec::new();

        for j in 0..self.cells {
            for i in 0..self.cells {
                let v0 = self.value(i, j);
                let v1 = self.value(i + 1, j);
                let v2 = self.value(i + 1, j + 1);
                let v3 = self.value(i, j + 1);

                let mut case = 0u8;
                if v0 >= 0.0 {
                    case |= 1;
                }
                if v1 >= 0.0 {
                    case |= 2;
                }
                if v2 >= 0.0 {
                    case |= 4;
                }
                if v3 >= 0.0 {
                    case |= 8;
                }
                if case == 0 || case == 15 {
                    continue;
                }

                let bottom = self.horizontal_edge(i, j);
                let right = self.vertical_edge(i + 1, j);
                let top = self.horizontal_edge(i, j + 1);
                let left = self.vertical_edge(i, j);

                if case == 5 || case == 10 {
                    // Saddle: the centre sample decides which corners are connected
                    let centre = self.node(i, j) + nalgebra::Vector2::new(self.dx / 2.0, self.dy / 2.0);
                    let centre_positive = field(centre.x, centre.y) >= 0.0;
                    let cut_corners_0_2 = (case == 5) != centre_positive;
                    if cut_corners_0_2 {
                        segments.push((left, bottom));
                        segments.push((right, top));
                    } else {
                        segments.push((bottom, right));
                        segments.push((top, left));
                    }
                    continue;
                }

                let mut crossed = Vec::with_capacity(2);
                if (case & 1 != 0) != (case & 2 != 0) {
                    crossed.push(bottom);
                }
                if (case & 2 != 0) != (case & 4 != 0) {
                    crossed.push(right);
                }
                if (case & 4 != 0) != (case & 8 != 0) {
                    crossed.push(top);
                }
                if (case & 8 != 0) != (case & 1 != 0) {
                    crossed.push(left);
                }
                if let [a, b] = crossed[..] {
                    segments.push((a, b));
                }
            }
        }

        segments
    }

    /// Chain the zero-set into open and closed polylines
    pub fn polylines<F>(&self, field: &F) -> Vec<Polyline>
    where
        F: Fn(f64, f64) -> f64,
    {
        let segments = self.cell_segments(field);

        let mut incident: HashMap<usize, Vec<usize>> = HashMap::new();
        for (index, &(a, b)) in segments.iter().enumerate() {
            incident.entry(a).or_default().push(index);
            incident.entry(b).or_default().push(index);
        }

        let mut used = vec![false; segments.len()];
        let next_unused = |edge: usize, used: &mut Vec<bool>| -> Option<usize> {
            let candidates = incident.get(&edge)?;
            let found = candidates.iter().copied().find(|&k| !used[k])?;
            used[found] = true;
            Some(found)
        };

        let mut result = Vec::new();
        for start in 0..segments.len() {
            if used[start] {
                continue;
            }
            used[start] = true;
            let (first, second) = segments[start];

            let mut forward = vec![first, second];
            let mut closed = false;
            let mut current = second;
            while let Some(k) = next_unused(current, &mut used) {
                let (a, b) = segments[k];
                let other = if a == current { b } else { a };
                if other == first {
                    closed = true;
                    break;
                }
                forward.push(other);
                current = other;
            }

            if !closed {
                let mut backward = Vec::new();
                let mut current = first;
                while let Some(k) = next_unused(current, &mut used) {
                    let (a, b) = segments[k];
                    let other = if a == current { b } else { a };
                    backward.push(other);
                    current = other;
                }
                backward.reverse();
                backward.extend(forward);
                forward = backward;
            }

            let points = merge_duplicates(forward.iter().map(|&edge| self.crossing(edge)), closed);
            if points.len() >= 2 {
                result.push(Polyline { points, closed });
            }
        }

        result
    }
}

fn merge_duplicates(points: impl Iterator<Item = Point2<f64>>, closed: bool) -> Vec<Point2<f64>> {
    let mut merged: Vec<Point2<f64>> = Vec::new();
    for point in points {
        if merged
            .last()
            .map_or(true, |last| (point - last).norm() > MERGE_EPS)
        {
            merged.push(point);
        }
    }
    if closed && merged.len() > 1 {
        if let (Some(first), Some(last)) = (merged.first(), merged.last()) {
            if (first - last).norm() <= MERGE_EPS {
                merged.pop();
            }
        }
    }
    merged
}

/// Sample and contour `field` over `window` in one call
pub fn extract_contours<F>(field: F, window: &BoundingBox, cells: usize) -> (Vec<Polyline>, f64)
where
    F: Fn(f64, f64) -> f64,
{
    let grid = ContourGrid::sample(window, cells, &field);
    let polylines = grid.polylines(&field);
    (polylines, grid.step())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon::signed_area;

    #[test]
    fn test_circle_is_one_closed_loop() {
        let window = BoundingBox::from_corners(-1.2, -1.2, 1.2, 1.2);
        let (polylines, step) = extract_contours(|x, y| x * x + y * y - 1.0, &window, 64);

        assert_eq!(polylines.len(), 1);
        assert!(polylines[0].closed);
        assert!((step - 2.4 / 64.0).abs() < 1e-12);

        for p in &polylines[0].points {
            assert!((p.coords.norm() - 1.0).abs() < 0.01);
        }
        let area = signed_area(&polylines[0].points).abs();
        assert!((area - std::f64::consts::PI).abs() < 0.01);
    }

    #[test]
    fn test_line_leaving_window_is_open() {
        let window = BoundingBox::from_corners(-1.0, -1.0, 1.0, 1.0);
        let (polylines, _) = extract_contours(|x, _y| x - 0.3, &window, 16);

        assert_eq!(polylines.len(), 1);
        assert!(!polylines[0].closed);
        let first = polylines[0].first().unwrap();
        let last = polylines[0].last().unwrap();
        assert!((first.x - 0.3).abs() < 1e-12);
        assert!((first.y.abs() - 1.0).abs() < 1e-12);
        assert!((last.y.abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_circles_give_two_loops() {
        let window = BoundingBox::from_corners(-2.0, -1.0, 2.0, 1.0);
        let field = |x: f64, y: f64| {
            let a = (x + 1.0).hypot(y) - 0.5;
            let b = (x - 1.0).hypot(y) - 0.5;
            a.min(b)
        };
        let (polylines, _) = extract_contours(field, &window, 80);
        assert_eq!(polylines.len(), 2);
        assert!(polylines.iter().all(|p| p.closed));
    }

    #[test]
    fn test_empty_field_has_no_contours() {
        let window = BoundingBox::from_corners(-1.0, -1.0, 1.0, 1.0);
        let (polylines, _) = extract_contours(|_, _| 1.0, &window, 8);
        assert!(polylines.is_empty());
    }
}

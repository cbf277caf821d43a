// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Trimmed segments: a base curve restricted to the points where a mask holds

use super::guard::guarded;
use super::predicate::Axis;
use super::{Curve, Predicate};
use crate::config::SamplingConfig;
use crate::geometry::{extract_contours, BoundingBox, Polyline};
use crate::utils::math::{lerp_point, linspace};
use nalgebra::{Point2, Vector2};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Consecutive run points closer than this are collapsed
const DUPLICATE_EPS: f64 = 1e-12;

/// Mask-honoring polylines sampled from a segment's zero-set
#[derive(Debug, Clone)]
pub struct SegmentSamples {
    pub pieces: Vec<Polyline>,
    /// Grid spacing the pieces were extracted with
    pub step: f64,
}

/// One base curve plus a mask.
///
/// Trimming changes membership only: `evaluate` and `gradient` are the base's.
pub struct TrimmedSegment {
    base: Curve,
    mask: Predicate,
    explicit_bounds: Option<BoundingBox>,
    mask_degraded: bool,
    config: Arc<SamplingConfig>,
    rect_pattern: OnceCell<Option<Predicate>>,
    samples: OnceCell<SegmentSamples>,
}

impl TrimmedSegment {
    pub fn new(base: impl Into<Curve>, mask: Predicate) -> Self {
        Self {
            base: base.into(),
            mask,
            explicit_bounds: None,
            mask_degraded: false,
            config: SamplingConfig::shared(),
            rect_pattern: OnceCell::new(),
            samples: OnceCell::new(),
        }
    }

    /// Segment covering the whole zero-set of `base`
    pub fn untrimmed(base: impl Into<Curve>) -> Self {
        Self::new(base, Predicate::Always)
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.explicit_bounds = Some(bounds);
        self
    }

    pub fn with_config(mut self, config: Arc<SamplingConfig>) -> Self {
        self.config = config;
        self
    }

    /// Mark the mask as a stand-in for one that could not be restored
    pub(crate) fn with_degraded_mask(mut self) -> Self {
        self.mask_degraded = true;
        self
    }

    pub fn base(&self) -> &Curve {
        &self.base
    }

    pub fn mask(&self) -> &Predicate {
        &self.mask
    }

    pub fn explicit_bounds(&self) -> Option<BoundingBox> {
        self.explicit_bounds
    }

    /// True when this segment was loaded from a document whose mask could not be restored,
    /// so the mask now accepts every point
    pub fn mask_degraded(&self) -> bool {
        self.mask_degraded
    }

    pub fn config(&self) -> &Arc<SamplingConfig> {
        &self.config
    }

    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.base.evaluate(x, y)
    }

    pub fn gradient(&self, x: f64, y: f64) -> Vector2<f64> {
        self.base.gradient(x, y)
    }

    pub(crate) fn contains_unguarded(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.base.evaluate_unguarded(x, y).abs() <= tolerance && self.mask.test(x, y)
    }

    /// `|base(x, y)| ≤ tolerance` and the mask holds; a panic in either answers `false`
    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        guarded("segment contains", x, y, || self.contains_unguarded(x, y, tolerance)).unwrap_or(false)
    }

    fn mask_at(&self, p: &Point2<f64>) -> bool {
        guarded("mask", p.x, p.y, || self.mask.test(p.x, p.y)).unwrap_or(false)
    }

    /// Bounds of the trimmed zero-set.
    ///
    /// Explicit bounds win; otherwise the base bounds are narrowed by the mask when the
    /// mask is, or is detected to be, an axis-aligned rectangle.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if let Some(bounds) = self.explicit_bounds {
            return Some(bounds);
        }

        let base = self.base.bounding_box();
        let mask = if self.mask.is_axis_rect() {
            Some(self.mask.bounds())
        } else {
            self.rect_pattern().map(Predicate::bounds)
        };

        match (base, mask) {
            (Some(base), Some(mask)) => Some(base.intersection(&mask).unwrap_or(base)),
            (None, Some(mask)) if mask.is_finite() => Some(mask),
            (base, _) => base,
        }
    }

    /// Closed-form rectangle equivalent to an opaque mask, recovered by sampling
    pub fn rect_pattern(&self) -> Option<&Predicate> {
        self.rect_pattern.get_or_init(|| self.detect_rect_pattern()).as_ref()
    }

    fn detect_rect_pattern(&self) -> Option<Predicate> {
        if self.mask.is_always() || self.mask.is_axis_rect() {
            return None;
        }

        let domain = self
            .base
            .bounding_box()
            .filter(|b| b.is_finite() && !b.is_empty())
            .unwrap_or(self.config.default_window);
        let size = domain.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return None;
        }

        let n = self.config.detection_resolution.max(4);
        let xs: Vec<f64> = linspace(domain.min.x, domain.max.x, n).collect();
        let ys: Vec<f64> = linspace(domain.min.y, domain.max.y, n).collect();

        let (mut imin, mut imax, mut jmin, mut jmax) = (usize::MAX, 0, usize::MAX, 0);
        let mut count = 0usize;
        for (j, &y) in ys.iter().enumerate() {
            for (i, &x) in xs.iter().enumerate() {
                if self.mask_at(&Point2::new(x, y)) {
                    imin = imin.min(i);
                    imax = imax.max(i);
                    jmin = jmin.min(j);
                    jmax = jmax.max(j);
                    count += 1;
                }
            }
        }

        if count == 0 || count == xs.len() * ys.len() {
            return None;
        }
        // every true node lies in the index box, so equal counts mean the box is solid
        if count != (imax - imin + 1) * (jmax - jmin + 1) {
            return None;
        }

        let (mid_i, mid_j) = ((imin + imax) / 2, (jmin + jmax) / 2);
        let at = |i: usize, j: usize| Point2::new(xs[i], ys[j]);
        let min_x = (imin > 0).then(|| self.refine_mask_edge(at(imin - 1, mid_j), at(imin, mid_j)).x);
        let max_x = (imax < n).then(|| self.refine_mask_edge(at(imax + 1, mid_j), at(imax, mid_j)).x);
        let min_y = (jmin > 0).then(|| self.refine_mask_edge(at(mid_i, jmin - 1), at(mid_i, jmin)).y);
        let max_y = (jmax < n).then(|| self.refine_mask_edge(at(mid_i, jmax + 1), at(mid_i, jmax)).y);

        log::debug!("mask recognized as rectangle x∈[{min_x:?}, {max_x:?}], y∈[{min_y:?}, {max_y:?}]");
        Some(Predicate::All(vec![
            Predicate::AxisRange {
                axis: Axis::X,
                min: min_x,
                max: max_x,
            },
            Predicate::AxisRange {
                axis: Axis::Y,
                min: min_y,
                max: max_y,
            },
        ]))
    }

    /// Bisect the chord from a mask-false point to a mask-true point, returning the
    /// last point known to pass
    fn refine_mask_edge(&self, outside: Point2<f64>, inside: Point2<f64>) -> Point2<f64> {
        let (mut lo, mut hi) = (outside, inside);
        for _ in 0..self.config.bisection_steps {
            let mid = lerp_point(&lo, &hi, 0.5);
            if self.mask_at(&mid) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        hi
    }

    /// Window the zero-set is contoured in
    pub fn sampling_window(&self) -> BoundingBox {
        let mask_bounds = self.mask.bounds();
        let window = self
            .explicit_bounds
            .or_else(|| {
                self.base
                    .bounding_box()
                    .map(|b| b.intersection(&mask_bounds).unwrap_or(b))
            })
            .or_else(|| mask_bounds.is_finite().then_some(mask_bounds))
            .unwrap_or_else(|| {
                let window = self.config.default_window;
                window.intersection(&mask_bounds).unwrap_or(window)
            });

        let extent = window.size().x.max(window.size().y);
        window.padded((0.05 * extent).max(1e-9))
    }

    /// Zero-set polylines that honor the mask, sampled once and cached
    pub fn samples(&self) -> &SegmentSamples {
        self.samples.get_or_init(|| {
            let window = self.sampling_window();
            let (polylines, step) =
                extract_contours(|x, y| self.base.evaluate(x, y), &window, self.config.grid_resolution);

            let pieces: Vec<Polyline> = if self.mask.is_always() {
                polylines
            } else {
                polylines.iter().flat_map(|p| self.split_by_mask(p)).collect()
            };

            log::debug!(
                "sampled {} piece(s) for {} segment (step {step:.3e})",
                pieces.len(),
                self.base.type_name()
            );
            SegmentSamples { pieces, step }
        })
    }

    /// Break a polyline into runs of mask-true points, extending each run to the mask boundary
    fn split_by_mask(&self, polyline: &Polyline) -> Vec<Polyline> {
        let flags: Vec<bool> = polyline.points.iter().map(|p| self.mask_at(p)).collect();
        if flags.iter().all(|&f| f) {
            return vec![polyline.clone()];
        }
        if !flags.iter().any(|&f| f) {
            return Vec::new();
        }

        let (points, flags) = if polyline.closed {
            // start the walk at a rejected point so no run wraps around the seam
            let start = flags.iter().position(|f| !f).unwrap_or(0);
            let mut points = polyline.points.clone();
            let mut flags = flags;
            points.rotate_left(start);
            flags.rotate_left(start);
            points.push(points[0]);
            flags.push(flags[0]);
            (points, flags)
        } else {
            (polyline.points.clone(), flags)
        };

        let mut runs = Vec::new();
        let mut i = 0;
        while i < points.len() {
            if !flags[i] {
                i += 1;
                continue;
            }
            let start = i;
            while i < points.len() && flags[i] {
                i += 1;
            }

            let mut run = Vec::with_capacity(i - start + 2);
            if start > 0 {
                run.push(self.refine_mask_edge(points[start - 1], points[start]));
            }
            run.extend_from_slice(&points[start..i]);
            if i < points.len() {
                run.push(self.refine_mask_edge(points[i], points[i - 1]));
            }
            run.dedup_by(|a, b| (*a - *b).norm() <= DUPLICATE_EPS);

            if run.len() >= 2 {
                runs.push(Polyline::open(run));
            }
        }
        runs
    }
}

impl fmt::Debug for TrimmedSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrimmedSegment")
            .field("base", &self.base)
            .field("mask", &self.mask)
            .field("explicit_bounds", &self.explicit_bounds)
            .field("mask_degraded", &self.mask_degraded)
            .finish_non_exhaustive()
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - planar boxes, polylines, predicates and contouring

mod bbox;
pub mod contour;
pub mod polygon;
pub mod predicates;

pub use bbox::BoundingBox;
pub use contour::{extract_contours, ContourGrid};
pub use polygon::{ray_cast_inside, signed_area, Polyline};
pub use predicates::{orient2d, ray_segment_hit, RayHit};

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Curve composition: leaves, trimmed segments, composite boundaries, R-function CSG
//! and regions with holes

mod batch;
mod composite;
mod guard;
mod leaf;
mod node;
pub mod predicate;
mod region;
mod rfunction;
mod trimmed;

pub use batch::{PointQuery, ScalarField};
pub use composite::{BoundaryHint, CompositeBoundary, Location};
pub use leaf::{Circle, Ellipse, FnCurve, LeafCurve, Line};
pub use node::Curve;
pub use predicate::{Axis, HalfPlane, Predicate};
pub use region::AreaRegion;
pub use rfunction::{RFunctionNode, RFunctionOp};
pub use trimmed::{SegmentSamples, TrimmedSegment};

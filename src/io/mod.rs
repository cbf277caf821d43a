// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - structural documents, leaf registry and JSON files

mod document;
mod json;
mod registry;

pub use document::{
    CompositeDocument, CurveDocument, LeafDocument, MaskDocument, RFunctionDocument, RegionDocument, SegmentDocument,
};
pub use json::{load_document, load_region, save_document, save_region};
pub use registry::{LeafFactory, LeafRegistry};

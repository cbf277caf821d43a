// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Structural documents for curve trees and regions
//!
//! Every node carries a `type` discriminator and nests its children. Closed-form masks are
//! written as-is. An opaque mask is written as the rectangle it was found to be by
//! sampling, or as an `opaque` placeholder that reloads as "always true" and marks the
//! segment with `mask_degraded`.

use super::registry::LeafRegistry;
use crate::curve::{
    AreaRegion, Axis, BoundaryHint, CompositeBoundary, Curve, HalfPlane, Predicate, RFunctionNode, TrimmedSegment,
};
use crate::error::{CurveError, Result};
use crate::geometry::BoundingBox;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Node types a document may name
const NODE_TYPES: [&str; 4] = ["leaf", "trimmed", "composite", "r_function"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CurveDocument {
    Leaf(LeafDocument),
    Trimmed(SegmentDocument),
    Composite(CompositeDocument),
    RFunction(RFunctionDocument),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafDocument {
    pub kind: String,
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDocument {
    pub base: Box<CurveDocument>,
    pub mask: MaskDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
    #[serde(default)]
    pub mask_degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeDocument {
    pub segments: Vec<SegmentDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<BoundaryHint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RFunctionDocument {
    pub op: String,
    #[serde(default)]
    pub alpha: f64,
    pub operands: Vec<CurveDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDocument {
    pub outer: CompositeDocument,
    #[serde(default)]
    pub holes: Vec<CompositeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskDocument {
    Always,
    AxisRange {
        axis: Axis,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    HalfPlanes {
        planes: Vec<HalfPlane>,
    },
    AngularRange {
        center: Point2<f64>,
        start: f64,
        sweep: f64,
    },
    RadialRange {
        center: Point2<f64>,
        min: f64,
        max: f64,
    },
    All {
        parts: Vec<MaskDocument>,
    },
    /// Stand-in for a callback mask
    Opaque,
}

impl MaskDocument {
    /// Closed-form document for a predicate; `None` if a callback is involved
    pub fn from_predicate(predicate: &Predicate) -> Option<Self> {
        Some(match predicate {
            Predicate::Always => MaskDocument::Always,
            Predicate::AxisRange { axis, min, max } => MaskDocument::AxisRange {
                axis: *axis,
                min: *min,
                max: *max,
            },
            Predicate::HalfPlanes(planes) => MaskDocument::HalfPlanes { planes: planes.clone() },
            Predicate::AngularRange { center, start, sweep } => MaskDocument::AngularRange {
                center: *center,
                start: *start,
                sweep: *sweep,
            },
            Predicate::RadialRange { center, min, max } => MaskDocument::RadialRange {
                center: *center,
                min: *min,
                max: *max,
            },
            Predicate::All(parts) => MaskDocument::All {
                parts: parts.iter().map(Self::from_predicate).collect::<Option<_>>()?,
            },
            Predicate::Custom(_) => return None,
        })
    }

    pub fn is_opaque(&self) -> bool {
        match self {
            MaskDocument::Opaque => true,
            MaskDocument::All { parts } => parts.iter().any(MaskDocument::is_opaque),
            _ => false,
        }
    }

    /// Rebuild the predicate; opaque parts become "always true"
    pub fn to_predicate(&self) -> Predicate {
        match self {
            MaskDocument::Always | MaskDocument::Opaque => Predicate::Always,
            MaskDocument::AxisRange { axis, min, max } => Predicate::AxisRange {
                axis: *axis,
                min: *min,
                max: *max,
            },
            MaskDocument::HalfPlanes { planes } => Predicate::HalfPlanes(planes.clone()),
            MaskDocument::AngularRange { center, start, sweep } => Predicate::AngularRange {
                center: *center,
                start: *start,
                sweep: *sweep,
            },
            MaskDocument::RadialRange { center, min, max } => Predicate::RadialRange {
                center: *center,
                min: *min,
                max: *max,
            },
            MaskDocument::All { parts } => Predicate::All(parts.iter().map(Self::to_predicate).collect()),
        }
    }
}

fn mask_document(segment: &TrimmedSegment) -> MaskDocument {
    if let Some(document) = MaskDocument::from_predicate(segment.mask()) {
        return document;
    }
    match segment.rect_pattern().and_then(MaskDocument::from_predicate) {
        Some(document) => {
            log::warn!("opaque mask written as the rectangle recovered by sampling: {document:?}");
            document
        }
        None => {
            log::warn!("opaque mask cannot be written; it will reload as always-true");
            MaskDocument::Opaque
        }
    }
}

impl TrimmedSegment {
    pub fn to_document(&self) -> Result<SegmentDocument> {
        Ok(SegmentDocument {
            base: Box::new(self.base().to_document()?),
            mask: mask_document(self),
            bounds: self.explicit_bounds(),
            mask_degraded: self.mask_degraded(),
        })
    }

    pub fn from_document(document: &SegmentDocument, registry: &LeafRegistry) -> Result<Self> {
        let base = Curve::from_document_with(&document.base, registry)?;
        let mut segment = TrimmedSegment::new(base, document.mask.to_predicate());
        if let Some(bounds) = document.bounds {
            segment = segment.with_bounds(bounds);
        }
        if document.mask_degraded || document.mask.is_opaque() {
            log::warn!("segment mask degraded to always-true on load");
            segment = segment.with_degraded_mask();
        }
        Ok(segment)
    }
}

impl CompositeBoundary {
    pub fn to_document(&self) -> Result<CompositeDocument> {
        Ok(CompositeDocument {
            segments: self
                .segments()
                .iter()
                .map(TrimmedSegment::to_document)
                .collect::<Result<_>>()?,
            hint: self.hint().cloned(),
        })
    }

    pub fn from_document(document: &CompositeDocument, registry: &LeafRegistry) -> Result<Self> {
        let segments = document
            .segments
            .iter()
            .map(|s| TrimmedSegment::from_document(s, registry))
            .collect::<Result<Vec<_>>>()?;
        let boundary = CompositeBoundary::new(segments)?;
        Ok(match &document.hint {
            Some(hint) => boundary.with_hint(hint.clone()),
            None => boundary,
        })
    }
}

impl Curve {
    /// Nested document for this tree; shared sub-trees are written once per reference
    pub fn to_document(&self) -> Result<CurveDocument> {
        Ok(match self {
            Curve::Leaf(leaf) => CurveDocument::Leaf(LeafDocument {
                kind: leaf.kind().to_string(),
                params: leaf
                    .parameters()
                    .ok_or_else(|| CurveError::NotSerializable(leaf.kind().to_string()))?,
            }),
            Curve::Trimmed(segment) => CurveDocument::Trimmed(segment.to_document()?),
            Curve::Composite(boundary) => CurveDocument::Composite(boundary.to_document()?),
            Curve::RFunction(node) => CurveDocument::RFunction(RFunctionDocument {
                op: node.op().name().to_string(),
                alpha: node.alpha(),
                operands: vec![node.a().to_document()?, node.b().to_document()?],
            }),
        })
    }

    /// Rebuild a tree using the built-in leaf kinds
    pub fn from_document(document: &CurveDocument) -> Result<Self> {
        Self::from_document_with(document, LeafRegistry::builtin())
    }

    pub fn from_document_with(document: &CurveDocument, registry: &LeafRegistry) -> Result<Self> {
        Ok(match document {
            CurveDocument::Leaf(leaf) => Curve::Leaf(registry.build(&leaf.kind, &leaf.params)?),
            CurveDocument::Trimmed(segment) => TrimmedSegment::from_document(segment, registry)?.into(),
            CurveDocument::Composite(boundary) => CompositeBoundary::from_document(boundary, registry)?.into(),
            CurveDocument::RFunction(node) => {
                let operands = node
                    .operands
                    .iter()
                    .map(|operand| Self::from_document_with(operand, registry))
                    .collect::<Result<Vec<_>>>()?;
                RFunctionNode::from_parts(&node.op, operands, node.alpha)?.into()
            }
        })
    }
}

impl AreaRegion {
    pub fn to_document(&self) -> Result<RegionDocument> {
        Ok(RegionDocument {
            outer: self.outer().to_document()?,
            holes: self
                .holes()
                .iter()
                .map(|hole| hole.to_document())
                .collect::<Result<_>>()?,
        })
    }

    /// Rebuild a region; closure is re-validated on the reloaded boundaries
    pub fn from_document(document: &RegionDocument, registry: &LeafRegistry) -> Result<Self> {
        let outer = Arc::new(CompositeBoundary::from_document(&document.outer, registry)?);
        let holes = document
            .holes
            .iter()
            .map(|hole| CompositeBoundary::from_document(hole, registry).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        AreaRegion::new(outer, &holes)
    }
}

/// Reject unknown node discriminators before typed decoding, so the error names the type
pub(crate) fn check_node_types(value: &Value) -> Result<()> {
    let Some(node) = value.as_object() else {
        return Ok(());
    };
    let Some(kind) = node.get("type").and_then(Value::as_str) else {
        return Ok(());
    };
    if !NODE_TYPES.contains(&kind) {
        return Err(CurveError::UnknownNodeType(kind.to_string()));
    }

    match kind {
        "trimmed" => node.get("base").map_or(Ok(()), check_node_types),
        "composite" => check_segments(node.get("segments")),
        "r_function" => match node.get("operands") {
            Some(Value::Array(operands)) => operands.iter().try_for_each(check_node_types),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

/// Check the base of every segment in a composite's `segments` array
pub(crate) fn check_segments(segments: Option<&Value>) -> Result<()> {
    match segments {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|segment| segment.get("base"))
            .try_for_each(check_node_types),
        _ => Ok(()),
    }
}

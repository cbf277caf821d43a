// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for curve construction and document conversion

use thiserror::Error;

/// Errors raised while building curve trees or converting documents.
///
/// Point queries never produce these; they degrade to a negative answer instead.
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("composite boundary needs at least one segment")]
    EmptyBoundary,

    #[error("unknown r-function operation `{0}`")]
    UnknownOperation(String),

    #[error("r-function expects 2 operands, got {0}")]
    OperandCount(usize),

    #[error("invalid alpha {alpha} for {op} (blend needs a finite alpha > 0, other operations need 0)")]
    InvalidAlpha { op: &'static str, alpha: f64 },

    #[error("outer boundary of the region is not closed")]
    OuterNotClosed,

    #[error("hole {index} of the region is not closed")]
    HoleNotClosed { index: usize },

    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),

    #[error("expected a composite boundary, found `{0}`")]
    ExpectedComposite(&'static str),

    #[error("curve `{0}` cannot be serialized")]
    NotSerializable(String),

    #[error("invalid parameters for `{kind}`: {reason}")]
    InvalidParameters { kind: String, reason: String },

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, CurveError>;

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON text and document files

use super::document::{check_node_types, check_segments, CurveDocument, RegionDocument};
use super::registry::LeafRegistry;
use crate::curve::{AreaRegion, Curve};
use crate::error::Result;
use anyhow::Context;
use serde_json::Value;
use std::fs;
use std::path::Path;

impl Curve {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document()?)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with(json, LeafRegistry::builtin())
    }

    pub fn from_json_with(json: &str, registry: &LeafRegistry) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        check_node_types(&value)?;
        let document: CurveDocument = serde_json::from_value(value)?;
        Curve::from_document_with(&document, registry)
    }
}

impl AreaRegion {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document()?)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with(json, LeafRegistry::builtin())
    }

    pub fn from_json_with(json: &str, registry: &LeafRegistry) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        check_segments(value.get("outer").and_then(|outer| outer.get("segments")))?;
        if let Some(Value::Array(holes)) = value.get("holes") {
            for hole in holes {
                check_segments(hole.get("segments"))?;
            }
        }
        let document: RegionDocument = serde_json::from_value(value)?;
        AreaRegion::from_document(&document, registry)
    }
}

/// Write a curve tree to a JSON file
pub fn save_document(curve: &Curve, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = curve.to_json().context("Failed to serialize curve")?;
    fs::write(path, json).with_context(|| format!("Failed to write document: {}", path.display()))?;
    Ok(())
}

/// Read a curve tree from a JSON file
pub fn load_document(path: impl AsRef<Path>) -> anyhow::Result<Curve> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read document: {}", path.display()))?;
    Curve::from_json(&json).with_context(|| format!("Failed to load curve from {}", path.display()))
}

pub fn save_region(region: &AreaRegion, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = region.to_json().context("Failed to serialize region")?;
    fs::write(path, json).with_context(|| format!("Failed to write region: {}", path.display()))?;
    Ok(())
}

pub fn load_region(path: impl AsRef<Path>) -> anyhow::Result<AreaRegion> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read region: {}", path.display()))?;
    AreaRegion::from_json(&json).with_context(|| format!("Failed to load region from {}", path.display()))
}

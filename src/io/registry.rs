// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Leaf factories keyed by kind, used when loading documents

use crate::curve::{Circle, Ellipse, LeafCurve, Line};
use crate::error::{CurveError, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a leaf from its document parameters
pub type LeafFactory = Arc<dyn Fn(&Value) -> Result<Arc<dyn LeafCurve>> + Send + Sync>;

static BUILTIN: Lazy<LeafRegistry> = Lazy::new(LeafRegistry::with_builtins);

/// Extension point for leaf kinds; new kinds register a factory instead of adding node types
#[derive(Clone)]
pub struct LeafRegistry {
    factories: HashMap<String, LeafFactory>,
}

impl LeafRegistry {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry knowing `circle`, `ellipse` and `line`
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("circle", |params| typed::<Circle>("circle", params));
        registry.register("ellipse", |params| typed::<Ellipse>("ellipse", params));
        registry.register("line", |params| {
            let line: Line = parse("line", params)?;
            Ok(Arc::new(Line::new(line.a, line.b, line.c)) as Arc<dyn LeafCurve>)
        });
        registry
    }

    /// Shared registry with the built-in kinds
    pub fn builtin() -> &'static LeafRegistry {
        &BUILTIN
    }

    /// Register a factory, returning the one it replaces
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> Option<LeafFactory>
    where
        F: Fn(&Value) -> Result<Arc<dyn LeafCurve>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn build(&self, kind: &str, params: &Value) -> Result<Arc<dyn LeafCurve>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| CurveError::UnknownNodeType(format!("leaf/{kind}")))?;
        factory(params)
    }
}

impl Default for LeafRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn parse<T: DeserializeOwned>(kind: &str, params: &Value) -> Result<T> {
    serde_json::from_value(params.clone()).map_err(|err| CurveError::InvalidParameters {
        kind: kind.to_string(),
        reason: err.to_string(),
    })
}

fn typed<T>(kind: &str, params: &Value) -> Result<Arc<dyn LeafCurve>>
where
    T: LeafCurve + DeserializeOwned + 'static,
{
    Ok(Arc::new(parse::<T>(kind, params)?))
}

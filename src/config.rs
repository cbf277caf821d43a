// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sampling configuration system

use crate::geometry::BoundingBox;
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

static GLOBAL: OnceCell<Arc<SamplingConfig>> = OnceCell::new();

/// Resolutions and tolerances used by every sampled query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Cells per axis when contouring a segment's zero-set
    pub grid_resolution: usize,
    /// Cells per axis when probing a mask for a rectangular pattern
    pub detection_resolution: usize,
    /// Endpoint matching distance, in multiples of the grid step
    pub closure_tolerance_factor: f64,
    /// Bisection iterations when refining a mask boundary
    pub bisection_steps: usize,
    /// Perturbed rays tried before the fallback direction
    pub ray_retry_limit: usize,
    /// Tolerance used by the `*_default` query helpers
    pub default_tolerance: f64,
    /// Smallest chunk a batched query hands to one worker
    pub parallel_min_chunk: usize,
    /// Window used for curves with no bounds of their own
    pub default_window: BoundingBox,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            grid_resolution: 160,
            detection_resolution: 64,
            closure_tolerance_factor: 2.0,
            bisection_steps: 48,
            ray_retry_limit: 8,
            default_tolerance: 1e-3,
            parallel_min_chunk: 256,
            default_window: BoundingBox::from_corners(-10.0, -10.0, 10.0, 10.0),
        }
    }
}

impl SamplingConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SamplingConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from("polycurve.toml").exists() {
            Self::from_file("polycurve.toml")?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(value) = env_parse("CURVE_GRID_RESOLUTION") {
            self.grid_resolution = value;
        }
        if let Some(value) = env_parse("CURVE_DETECTION_RESOLUTION") {
            self.detection_resolution = value;
        }
        if let Some(value) = env_parse("CURVE_RAY_RETRIES") {
            self.ray_retry_limit = value;
        }
        if let Some(value) = env_parse("CURVE_PARALLEL_MIN_CHUNK") {
            self.parallel_min_chunk = value;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Process-wide configuration, loaded on first use.
    ///
    /// A broken config file is logged and replaced by the defaults.
    pub fn shared() -> Arc<SamplingConfig> {
        GLOBAL
            .get_or_init(|| match Self::load() {
                Ok(config) => Arc::new(config),
                Err(err) => {
                    log::warn!("falling back to default sampling config: {err:#}");
                    Arc::new(Self::default())
                }
            })
            .clone()
    }

    /// Install the process-wide configuration; fails if it was already initialized
    pub fn install(config: SamplingConfig) -> std::result::Result<(), SamplingConfig> {
        GLOBAL
            .set(Arc::new(config))
            .map_err(|rejected| (*rejected).clone())
    }
}

fn env_parse(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring {name}={raw:?}: not an unsigned integer");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sampling.toml");

        let config = SamplingConfig {
            grid_resolution: 96,
            ray_retry_limit: 3,
            ..SamplingConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = SamplingConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "grid_resolution = 40\n").unwrap();

        let loaded = SamplingConfig::from_file(&path).unwrap();
        assert_eq!(loaded.grid_resolution, 40);
        assert_eq!(loaded.ray_retry_limit, SamplingConfig::default().ray_retry_limit);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = SamplingConfig::from_file("/nonexistent/polycurve.toml").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config file"));
    }
}

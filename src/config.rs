// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edgeline configuration
//!
//! Settings come from `edgeline.toml` when present, then `EDGELINE_*`
//! environment variables, then command-line flags.

use crate::io::SvgOptions;
use crate::pipeline::PipelineOptions;
use crate::polyline::{LinkStrategy, ReconstructOptions};
use anyhow::{bail, Context, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "edgeline.toml";

/// Edge extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Crease threshold in degrees
    pub angle_threshold: f64,
    /// View direction as `[x, y, z]`
    pub projection_dir: [f64; 3],
    pub include_intersection_refinement: bool,
    /// Time budget per refinement slice in milliseconds
    pub max_slice_ms: u64,
    pub sort_edges: bool,
    pub precision_digits: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let options = PipelineOptions::default();
        Self {
            angle_threshold: options.angle_threshold,
            projection_dir: options.projection_dir.into(),
            include_intersection_refinement: options.include_intersection_refinement,
            max_slice_ms: options.max_slice_time.as_millis() as u64,
            sort_edges: options.sort_edges,
            precision_digits: options.precision_digits,
        }
    }
}

/// Polyline reconstruction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolylineConfig {
    pub max_link_distance: f64,
    pub weld_tolerance: f64,
    pub strategy: LinkStrategy,
}

impl Default for PolylineConfig {
    fn default() -> Self {
        let options = ReconstructOptions::default();
        Self {
            max_link_distance: options.max_link_distance,
            weld_tolerance: options.weld_tolerance,
            strategy: options.strategy,
        }
    }
}

/// SVG layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    pub target_width: f64,
    pub margin_ratio: f64,
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for SvgConfig {
    fn default() -> Self {
        let options = SvgOptions::default();
        Self {
            target_width: options.target_width,
            margin_ratio: options.margin_ratio,
            stroke: options.stroke,
            stroke_width: options.stroke_width,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgelineConfig {
    pub pipeline: PipelineConfig,
    pub polylines: PolylineConfig,
    pub svg: SvgConfig,
}

impl EdgelineConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: EdgelineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `edgeline.toml` if present, with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `EDGELINE_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("EDGELINE_THRESHOLD") {
            self.pipeline.angle_threshold = parse_env("EDGELINE_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("EDGELINE_DIRECTION") {
            self.pipeline.projection_dir = parse_vector(&value)
                .context("Invalid EDGELINE_DIRECTION")?
                .into();
        }
        if let Some(value) = lookup("EDGELINE_SLICE_MS") {
            self.pipeline.max_slice_ms = parse_env("EDGELINE_SLICE_MS", &value)?;
        }
        if let Some(value) = lookup("EDGELINE_INTERSECTIONS") {
            self.pipeline.include_intersection_refinement =
                parse_env("EDGELINE_INTERSECTIONS", &value)?;
        }
        if let Some(value) = lookup("EDGELINE_LINK_DISTANCE") {
            self.polylines.max_link_distance = parse_env("EDGELINE_LINK_DISTANCE", &value)?;
        }
        if let Some(value) = lookup("EDGELINE_WELD_TOLERANCE") {
            self.polylines.weld_tolerance = parse_env("EDGELINE_WELD_TOLERANCE", &value)?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            angle_threshold: self.pipeline.angle_threshold,
            projection_dir: Vector3::from(self.pipeline.projection_dir),
            include_intersection_refinement: self.pipeline.include_intersection_refinement,
            max_slice_time: Duration::from_millis(self.pipeline.max_slice_ms),
            sort_edges: self.pipeline.sort_edges,
            precision_digits: self.pipeline.precision_digits,
            emit_partial: false,
        }
    }

    pub fn reconstruct_options(&self) -> ReconstructOptions {
        ReconstructOptions {
            max_link_distance: self.polylines.max_link_distance,
            weld_tolerance: self.polylines.weld_tolerance,
            strategy: self.polylines.strategy,
        }
    }

    pub fn svg_options(&self) -> SvgOptions {
        SvgOptions {
            projection_dir: Vector3::from(self.pipeline.projection_dir),
            target_width: self.svg.target_width,
            margin_ratio: self.svg.margin_ratio,
            stroke: self.svg.stroke.clone(),
            stroke_width: self.svg.stroke_width,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {key}: {value:?}"))
}

/// Parse a vector written as `x,y,z`
pub fn parse_vector(text: &str) -> Result<Vector3<f64>> {
    let parts = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid vector: {text:?}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => bail!("Expected three comma-separated components, got {text:?}"),
    }
}

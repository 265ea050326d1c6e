// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pipeline options

use crate::edges::EdgeClassifier;
use crate::error::EdgeResult;
use crate::geometry::{Quantizer, DEFAULT_PRECISION_DIGITS};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for one projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Crease threshold in degrees
    pub angle_threshold: f64,
    /// View direction; silhouettes are taken relative to it
    pub projection_dir: Vector3<f64>,
    /// Run the intersection refinement stage after classification
    pub include_intersection_refinement: bool,
    /// Time budget for one refinement slice
    pub max_slice_time: Duration,
    /// Sort the final segments for reproducible output
    pub sort_edges: bool,
    /// Decimal digits used for vertex identity
    pub precision_digits: u32,
    /// Hand out refinement snapshots for live preview
    pub emit_partial: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            angle_threshold: 50.0,
            projection_dir: Vector3::y(),
            include_intersection_refinement: true,
            max_slice_time: Duration::from_millis(30),
            sort_edges: true,
            precision_digits: DEFAULT_PRECISION_DIGITS,
            emit_partial: false,
        }
    }
}

impl PipelineOptions {
    /// Validate the options and build the classifier they describe
    pub fn classifier(&self) -> EdgeResult<EdgeClassifier> {
        let quantizer = Quantizer::new(self.precision_digits)?;
        let classifier = EdgeClassifier::new(self.projection_dir, self.angle_threshold)?;
        Ok(classifier.with_quantizer(quantizer))
    }
}

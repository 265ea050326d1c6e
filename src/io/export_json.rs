// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON exporter for segments and polylines

use crate::edges::ClassifyStats;
use crate::geometry::{Polyline, Segment};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything one projection run produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeDocument {
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polylines: Vec<Polyline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ClassifyStats>,
}

impl EdgeDocument {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            ..Default::default()
        }
    }
}

/// Pretty-printed JSON for a document
pub fn to_json(document: &EdgeDocument) -> Result<String> {
    serde_json::to_string_pretty(document).context("Failed to serialize edge document")
}

/// Write a document to disk as JSON
pub fn export_json<P: AsRef<Path>>(document: &EdgeDocument, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(document)?;
    fs::write(path, json).with_context(|| format!("Failed to write JSON file: {}", path.display()))
}

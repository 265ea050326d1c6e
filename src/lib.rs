// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edgeline
//!
//! Feature-edge extraction for mesh line art. Boundary, crease and
//! silhouette edges are pulled from a triangle mesh as seen along a view
//! direction, optionally split at their image-plane crossings by a
//! time-sliced pipeline, and stitched into polylines for vector export.

pub mod config;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod polyline;
pub mod projector;
pub mod utils;

pub use config::EdgelineConfig;
pub use edges::{classify, EdgeClassifier, EdgeKind, FeatureEdge};
pub use error::{EdgeError, EdgeResult};
pub use geometry::{Mesh, MeshView, Polyline, Primitive, Segment};
pub use io::{export_json, export_svg, import_stl};
pub use pipeline::{PipelineOptions, PipelineTask, StepReport};
pub use polyline::{reconstruct, reconstruct_with, LinkStrategy, ReconstructOptions};
pub use projector::Projector;

use anyhow::Result;
use std::path::Path;

/// Run the whole pipeline on an STL file and return the final segments
pub fn project_file<P: AsRef<Path>>(path: P, options: PipelineOptions) -> Result<Vec<Segment>> {
    let mesh = import_stl(path)?;
    let task = Projector::new().start(mesh, options)?;
    // A task nobody else holds a projector for cannot be superseded
    Ok(task.run_to_end().unwrap_or_default())
}

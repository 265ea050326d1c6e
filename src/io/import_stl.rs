// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL importer

use crate::geometry::{Mesh, MeshView};
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::info;

/// Import an ASCII or binary STL file as an indexed mesh
pub fn import_stl<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open STL file: {}", path.display()))?;
    let mesh = read_stl(&mut BufReader::new(file))
        .with_context(|| format!("Failed to parse STL file: {}", path.display()))?;

    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "Imported STL"
    );
    Ok(mesh)
}

/// Read STL data from any seekable reader. File normals are ignored;
/// winding alone decides face orientation.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<Mesh> {
    let stl = stl_io::read_stl(reader).context("Invalid STL data")?;

    let positions = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let indices = stl
        .faces
        .iter()
        .flat_map(|face| face.vertices)
        .collect();

    Ok(Mesh::indexed(positions, indices))
}

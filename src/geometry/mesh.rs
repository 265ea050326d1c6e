// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Position-only triangle mesh and the read-only view the classifier consumes

use super::BoundingBox;
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

/// Read-only access to a triangle mesh.
///
/// When `indices` is `None` the position buffer is read as sequential
/// triples. An incomplete trailing triple is not a triangle.
pub trait MeshView {
    /// Number of vertex positions
    fn vertex_count(&self) -> usize;

    /// Flat triangle index list, if the mesh is indexed
    fn indices(&self) -> Option<&[usize]>;

    /// Position of a vertex, `None` when out of range
    fn position(&self, index: usize) -> Option<Point3<f64>>;

    /// Number of complete triangles
    fn triangle_count(&self) -> usize {
        match self.indices() {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Vertex indices of triangle `t`
    fn triangle(&self, t: usize) -> Option<[usize; 3]> {
        if t >= self.triangle_count() {
            return None;
        }
        let base = t * 3;
        match self.indices() {
            Some(indices) => Some([indices[base], indices[base + 1], indices[base + 2]]),
            None => Some([base, base + 1, base + 2]),
        }
    }
}

/// Triangular mesh holding positions only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub positions: Vec<Point3<f64>>,
    pub indices: Option<Vec<usize>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            indices: Some(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            indices: Some(Vec::with_capacity(triangle_count * 3)),
        }
    }

    /// Non-indexed triangle soup: every three positions form a triangle
    pub fn from_soup(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    /// Indexed mesh from positions and a flat index list
    pub fn indexed(positions: Vec<Point3<f64>>, indices: Vec<usize>) -> Self {
        Self {
            positions,
            indices: Some(indices),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        self.positions.push(position);
        self.positions.len() - 1
    }

    /// Add a triangle by vertex indices, converting a soup to indexed form first
    pub fn add_triangle(&mut self, triangle: [usize; 3]) {
        self.indices
            .get_or_insert_with(|| (0..self.positions.len() / 3 * 3).collect())
            .extend_from_slice(&triangle);
    }

    /// Apply a transformation matrix to all positions
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for position in &mut self.positions {
            *position = matrix.transform_point(position);
        }
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.positions)
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Expand to a non-indexed soup, dropping triangles with out-of-range indices
    pub fn to_soup(&self) -> Mesh {
        let mut positions = Vec::with_capacity(MeshView::triangle_count(self) * 3);
        for t in 0..MeshView::triangle_count(self) {
            let Some(tri) = self.triangle(t) else { continue };
            let corners: Option<Vec<_>> = tri.iter().map(|&i| self.position(i)).collect();
            if let Some(corners) = corners {
                positions.extend(corners);
            }
        }
        Mesh::from_soup(positions)
    }

    /// Merge with another mesh (simple concatenation, no CSG)
    ///
    /// Stays indexed only when both sides are indexed.
    pub fn merge(&mut self, other: &Mesh) {
        match (self.indices.is_some(), other.indices.as_ref()) {
            (true, Some(other_indices)) => {
                let offset = self.positions.len();
                self.positions.extend_from_slice(&other.positions);
                if let Some(indices) = self.indices.as_mut() {
                    indices.extend(other_indices.iter().map(|i| i + offset));
                }
            }
            _ => {
                let mut soup = if self.indices.is_some() {
                    self.to_soup()
                } else {
                    Mesh::from_soup(self.positions[..self.positions.len() / 3 * 3].to_vec())
                };
                let other_soup = other.to_soup();
                soup.positions.extend_from_slice(&other_soup.positions);
                *self = soup;
            }
        }
    }

    /// Merge any number of meshes into one
    pub fn merge_all<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> Mesh {
        let mut iter = meshes.into_iter();
        let Some(first) = iter.next() else {
            return Mesh::empty();
        };
        let mut merged = first.clone();
        for mesh in iter {
            merged.merge(mesh);
        }
        merged
    }
}

impl MeshView for Mesh {
    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn indices(&self) -> Option<&[usize]> {
        self.indices.as_deref()
    }

    fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.positions.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_soup_ignores_trailing_vertices() {
        let mesh = Mesh::from_soup(vec![Point3::origin(); 7]);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle(1), Some([3, 4, 5]));
        assert_eq!(mesh.triangle(2), None);
    }

    #[test]
    fn test_indexed_ignores_trailing_indices() {
        let mesh = Mesh::indexed(vec![Point3::origin(); 3], vec![0, 1, 2, 0]);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_merge_indexed_offsets_indices() {
        let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let mut merged = cube.clone();
        merged.merge(&cube);

        assert!(merged.is_indexed());
        assert_eq!(merged.vertex_count(), 16);
        assert_eq!(merged.triangle_count(), 24);
        assert_eq!(merged.triangle(12).unwrap()[0], cube.triangle(0).unwrap()[0] + 8);
    }

    #[test]
    fn test_merge_mixed_becomes_soup() {
        let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let soup = cube.to_soup();
        let merged = Mesh::merge_all([&cube, &soup]);

        assert!(!merged.is_indexed());
        assert_eq!(merged.triangle_count(), 24);
    }

    #[test]
    fn test_merge_all_empty() {
        let merged = Mesh::merge_all(std::iter::empty());
        assert_eq!(merged.triangle_count(), 0);
    }

    #[test]
    fn test_transform_translates_positions() {
        let mut mesh = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_mesh();
        mesh.transform(&Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0)));
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min, Point3::new(0.0, -1.0, -1.0));
        assert_eq!(bbox.max, Point3::new(2.0, 1.0, 1.0));
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Feature edge classification on closed and open meshes

use approx::assert_relative_eq;
use edgeline::edges::{midpoint, EdgeClassifier, EdgeKind};
use edgeline::geometry::{Mesh, MeshView, Primitive};
use edgeline::{classify, EdgeError};
use nalgebra::{Point3, Vector3};

fn unit_cube() -> Mesh {
    Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh()
}

#[test]
fn test_cube_emits_all_twelve_edges_from_any_direction() {
    let mesh = unit_cube();
    let directions = [
        Vector3::x(),
        Vector3::y(),
        -Vector3::z(),
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(0.3, -0.7, 0.2),
    ];

    for direction in directions {
        let segments = classify(&mesh, &direction, 30.0).unwrap();
        assert_eq!(segments.len(), 12, "direction {direction:?}");
        for segment in &segments {
            assert_relative_eq!(segment.length(), 1.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_single_triangle_along_its_normal() {
    let mesh = Primitive::triangle(1.0).to_mesh();
    let (edges, stats) = EdgeClassifier::new(Vector3::y(), 50.0)
        .unwrap()
        .classify_tagged(&mesh);

    assert_eq!(edges.len(), 3);
    assert!(edges.iter().all(|e| e.kind == EdgeKind::Boundary));
    assert_eq!(stats.creases + stats.silhouettes, 0);
}

#[test]
fn test_open_box_keeps_rim_as_boundary() {
    let cube = unit_cube();
    // Drop the two top (y+) triangles
    let indices: Vec<usize> = cube
        .indices
        .as_ref()
        .unwrap()
        .chunks(3)
        .enumerate()
        .filter(|(t, _)| *t != 8 && *t != 9)
        .flat_map(|(_, tri)| tri.to_vec())
        .collect();
    let mesh = Mesh::indexed(cube.positions.clone(), indices);

    let (edges, stats) = EdgeClassifier::new(Vector3::y(), 50.0)
        .unwrap()
        .classify_tagged(&mesh);

    assert_eq!(stats.boundaries, 4);
    assert_eq!(edges.len(), 12);
    for edge in edges.iter().filter(|e| e.kind == EdgeKind::Boundary) {
        assert_relative_eq!(midpoint(&edge.segment).y, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_sphere_silhouette_is_the_equator() {
    let mesh = Primitive::sphere(1.0, 16).to_mesh();
    let (edges, stats) = EdgeClassifier::new(Vector3::y(), 50.0)
        .unwrap()
        .classify_tagged(&mesh);

    assert!(stats.degenerate > 0, "pole rows collapse");
    assert_eq!(stats.boundaries, 0);
    assert_eq!(stats.creases, 0);
    assert_eq!(edges.len(), 16);
    for edge in &edges {
        assert_eq!(edge.kind, EdgeKind::Silhouette);
        assert_relative_eq!(edge.segment.start.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(edge.segment.end.y, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_cylinder_rims_and_side_silhouettes() {
    let mesh = Primitive::cylinder(2.0, 1.0, 16).to_mesh();
    let (edges, stats) = EdgeClassifier::new(Vector3::y(), 50.0)
        .unwrap()
        .classify_tagged(&mesh);

    assert_eq!(stats.boundaries, 0);
    assert_eq!(stats.creases, 32);
    assert_eq!(stats.silhouettes, 2);
    assert_eq!(edges.len(), 34);

    for edge in edges.iter().filter(|e| e.kind == EdgeKind::Silhouette) {
        // Vertical edges on the x axis, where the sides turn away from +Y
        assert_relative_eq!(edge.segment.start.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(edge.segment.length(), 2.0, epsilon = 1e-12);
    }
}

#[test]
fn test_shallow_fold_facing_viewer_drops_shared_edge() {
    let mesh = Mesh::from_soup(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(-1.0, 0.2, 0.0),
    ]);
    let (edges, _) = EdgeClassifier::new(Vector3::y(), 50.0)
        .unwrap()
        .classify_tagged(&mesh);

    assert_eq!(edges.len(), 4);
    assert!(edges.iter().all(|e| e.kind == EdgeKind::Boundary));
    let shared = Point3::new(0.0, 0.0, 0.5);
    assert!(edges
        .iter()
        .all(|e| (midpoint(&e.segment) - shared).norm() > 1e-9));
}

#[test]
fn test_soup_and_indexed_agree() {
    let indexed = unit_cube();
    let soup = indexed.to_soup();
    assert!(!soup.is_indexed());

    let direction = Vector3::new(0.2, 1.0, -0.4);
    let from_indexed = classify(&indexed, &direction, 30.0).unwrap();
    let from_soup = classify(&soup, &direction, 30.0).unwrap();
    assert_eq!(from_indexed.len(), from_soup.len());
}

#[test]
fn test_fully_degenerate_mesh_emits_nothing() {
    let p = Point3::new(1.0, 2.0, 3.0);
    let q = Point3::new(1.00001, 2.0, 3.0);
    let mesh = Mesh::from_soup(vec![p, p, p, p, q, Point3::new(4.0, 0.0, 0.0)]);

    let (edges, stats) = EdgeClassifier::new(Vector3::y(), 50.0)
        .unwrap()
        .classify_tagged(&mesh);
    assert!(edges.is_empty());
    assert_eq!(stats.degenerate, 2);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn test_empty_mesh() {
    let mesh = Mesh::new();
    assert!(classify(&mesh, &Vector3::y(), 50.0).unwrap().is_empty());
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let mesh = unit_cube();
    assert_eq!(
        classify(&mesh, &Vector3::y(), 200.0).unwrap_err(),
        EdgeError::InvalidThreshold(200.0)
    );
    assert_eq!(
        classify(&mesh, &Vector3::zeros(), 50.0).unwrap_err(),
        EdgeError::DegenerateProjection
    );
}

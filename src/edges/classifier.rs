// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Feature edge classification
//!
//! Walks every triangle once. The first triangle to see an edge parks a
//! pending record under the directed key; the neighbour traversing the edge
//! in the opposite direction consumes it and decides whether the shared edge
//! is a crease or a silhouette. Records nobody consumed are boundary edges.

use crate::error::{EdgeError, EdgeResult};
use crate::geometry::{EdgeKey, MeshView, Quantizer, Segment, VertexKey};
use crate::utils::math::{deg_to_rad, sign, snap_to_zero, triangle_normal, SIGN_EPSILON};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Why an edge was kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Exactly one adjacent triangle
    Boundary,
    /// Dihedral angle at or beyond the threshold
    Crease,
    /// Adjacent faces point to opposite sides of the projection direction
    Silhouette,
}

/// A kept edge with the reason it was kept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureEdge {
    pub segment: Segment,
    pub kind: EdgeKind,
}

/// Counters collected during one classification pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyStats {
    pub triangles: usize,
    pub degenerate: usize,
    pub out_of_range: usize,
    pub boundaries: usize,
    pub creases: usize,
    pub silhouettes: usize,
}

impl ClassifyStats {
    pub fn emitted(&self) -> usize {
        self.boundaries + self.creases + self.silhouettes
    }
}

/// Per-edge state: parked by the first triangle, consumed by its twin.
/// Consumed records stay in the table so a third triangle cannot re-park them.
#[derive(Debug, Clone, Copy)]
enum EdgeRecord {
    Pending {
        indices: [usize; 2],
        normal: Vector3<f64>,
    },
    Consumed,
}

/// Arena of edge records keyed by directed edge. Arena order is first-seen
/// order, which keeps boundary emission deterministic.
#[derive(Debug, Default)]
struct EdgeTable {
    slots: AHashMap<EdgeKey, usize>,
    records: Vec<EdgeRecord>,
}

impl EdgeTable {
    fn with_capacity(edges: usize) -> Self {
        Self {
            slots: AHashMap::with_capacity(edges),
            records: Vec::with_capacity(edges),
        }
    }

    /// Take the pending record under `key`, leaving a tombstone behind
    fn consume(&mut self, key: &EdgeKey) -> Option<Vector3<f64>> {
        let slot = *self.slots.get(key)?;
        match std::mem::replace(&mut self.records[slot], EdgeRecord::Consumed) {
            EdgeRecord::Pending { normal, .. } => Some(normal),
            EdgeRecord::Consumed => None,
        }
    }

    /// Park a record unless the key was ever seen
    fn park(&mut self, key: EdgeKey, indices: [usize; 2], normal: Vector3<f64>) {
        if self.slots.contains_key(&key) {
            return;
        }
        self.slots.insert(key, self.records.len());
        self.records.push(EdgeRecord::Pending { indices, normal });
    }

    fn pending(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        self.records.iter().filter_map(|record| match record {
            EdgeRecord::Pending { indices, .. } => Some(*indices),
            EdgeRecord::Consumed => None,
        })
    }
}

/// Extracts boundary, crease and silhouette edges from a triangle mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeClassifier {
    projection_dir: Vector3<f64>,
    threshold_angle: f64,
    threshold_dot: f64,
    quantizer: Quantizer,
}

impl EdgeClassifier {
    /// Classifier for a view direction and a crease threshold in degrees.
    ///
    /// The direction is used as given; a non-unit vector only scales the
    /// silhouette dot products.
    pub fn new(projection_dir: Vector3<f64>, threshold_angle: f64) -> EdgeResult<Self> {
        if !threshold_angle.is_finite() || !(0.0..=180.0).contains(&threshold_angle) {
            return Err(EdgeError::InvalidThreshold(threshold_angle));
        }
        if !projection_dir.iter().all(|c| c.is_finite()) || projection_dir.norm_squared() == 0.0 {
            return Err(EdgeError::DegenerateProjection);
        }

        Ok(Self {
            projection_dir,
            threshold_angle,
            threshold_dot: deg_to_rad(threshold_angle).cos(),
            quantizer: Quantizer::default(),
        })
    }

    /// Replace the vertex quantizer (default: 4 decimal digits)
    pub fn with_quantizer(mut self, quantizer: Quantizer) -> Self {
        self.quantizer = quantizer;
        self
    }

    pub fn projection_dir(&self) -> &Vector3<f64> {
        &self.projection_dir
    }

    pub fn threshold_angle(&self) -> f64 {
        self.threshold_angle
    }

    /// Kept edges as plain segments
    pub fn classify<M: MeshView + ?Sized>(&self, mesh: &M) -> Vec<Segment> {
        self.classify_tagged(mesh)
            .0
            .into_iter()
            .map(|edge| edge.segment)
            .collect()
    }

    /// Kept edges with their kind, plus pass statistics
    pub fn classify_tagged<M: MeshView + ?Sized>(
        &self,
        mesh: &M,
    ) -> (Vec<FeatureEdge>, ClassifyStats) {
        let triangle_count = mesh.triangle_count();
        let mut table = EdgeTable::with_capacity(triangle_count * 3 / 2 + 1);
        let mut edges = Vec::new();
        let mut stats = ClassifyStats {
            triangles: triangle_count,
            ..Default::default()
        };

        for t in 0..triangle_count {
            let Some(indices) = mesh.triangle(t) else { continue };
            let (Some(a), Some(b), Some(c)) = (
                mesh.position(indices[0]),
                mesh.position(indices[1]),
                mesh.position(indices[2]),
            ) else {
                stats.out_of_range += 1;
                continue;
            };

            let corners = [a, b, c];
            let normal = triangle_normal(&a, &b, &c);
            let keys: [VertexKey; 3] = corners.map(|p| self.quantizer.key(&p));

            if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
                stats.degenerate += 1;
                continue;
            }

            for j in 0..3 {
                let next = (j + 1) % 3;
                let key = EdgeKey::new(keys[j], keys[next]);

                if let Some(other) = table.consume(&key.reverse()) {
                    if let Some(kind) = self.shared_edge_kind(&normal, &other) {
                        match kind {
                            EdgeKind::Crease => stats.creases += 1,
                            EdgeKind::Silhouette => stats.silhouettes += 1,
                            EdgeKind::Boundary => {}
                        }
                        edges.push(FeatureEdge {
                            segment: Segment::new(corners[j], corners[next]),
                            kind,
                        });
                    }
                } else {
                    table.park(key, [indices[j], indices[next]], normal);
                }
            }
        }

        for [i0, i1] in table.pending() {
            // Parked indices were resolved above, so lookups succeed
            if let (Some(start), Some(end)) = (mesh.position(i0), mesh.position(i1)) {
                stats.boundaries += 1;
                edges.push(FeatureEdge {
                    segment: Segment::new(start, end),
                    kind: EdgeKind::Boundary,
                });
            }
        }

        debug!(
            triangles = stats.triangles,
            degenerate = stats.degenerate,
            boundaries = stats.boundaries,
            creases = stats.creases,
            silhouettes = stats.silhouettes,
            "Classified feature edges"
        );

        (edges, stats)
    }

    /// Decide whether an edge shared by two faces is kept
    fn shared_edge_kind(&self, normal: &Vector3<f64>, other: &Vector3<f64>) -> Option<EdgeKind> {
        if normal.dot(other) <= self.threshold_dot {
            return Some(EdgeKind::Crease);
        }

        let facing = sign(snap_to_zero(self.projection_dir.dot(normal), SIGN_EPSILON));
        let other_facing = sign(snap_to_zero(self.projection_dir.dot(other), SIGN_EPSILON));
        if facing != other_facing {
            return Some(EdgeKind::Silhouette);
        }

        None
    }
}

/// Extract feature edges from `mesh` as seen along `projection_dir`
pub fn classify<M: MeshView + ?Sized>(
    mesh: &M,
    projection_dir: &Vector3<f64>,
    threshold_angle: f64,
) -> EdgeResult<Vec<Segment>> {
    Ok(EdgeClassifier::new(*projection_dir, threshold_angle)?.classify(mesh))
}

/// Midpoint of a segment, handy for matching edges in tests and reports
pub fn midpoint(segment: &Segment) -> Point3<f64> {
    nalgebra::center(&segment.start, &segment.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, Primitive};

    #[test]
    fn test_single_triangle_has_three_boundaries() {
        let mesh = Primitive::triangle(1.0).to_mesh();
        let classifier = EdgeClassifier::new(Vector3::y(), 30.0).unwrap();
        let (edges, stats) = classifier.classify_tagged(&mesh);

        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| e.kind == EdgeKind::Boundary));
        assert_eq!(stats.boundaries, 3);
    }

    #[test]
    fn test_flat_quad_drops_diagonal() {
        let mesh = Primitive::quad(2.0).to_mesh();
        let segments = classify(&mesh, &Vector3::y(), 1.0).unwrap();
        assert_eq!(segments.len(), 4);
        for s in &segments {
            assert!((s.length() - 2.0).abs() < 1e-12, "diagonal emitted: {s:?}");
        }
    }

    #[test]
    fn test_third_triangle_on_consumed_edge_is_not_reparked() {
        // Two triangles share 0-1, a third repeats the first's winding on it
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = Mesh::indexed(positions, vec![0, 2, 1, 1, 3, 0, 0, 4, 1]);
        let (edges, _) = EdgeClassifier::new(Vector3::y(), 179.0)
            .unwrap()
            .classify_tagged(&mesh);

        let on_shared = edges
            .iter()
            .filter(|e| {
                let m = midpoint(&e.segment);
                (m - Point3::new(0.5, 0.0, 0.0)).norm() < 1e-12
            })
            .count();
        assert_eq!(on_shared, 0);
    }

    #[test]
    fn test_out_of_range_index_skips_triangle() {
        let mesh = Mesh::indexed(vec![Point3::origin(); 2], vec![0, 1, 5]);
        let (edges, stats) = EdgeClassifier::new(Vector3::y(), 30.0)
            .unwrap()
            .classify_tagged(&mesh);
        assert!(edges.is_empty());
        assert_eq!(stats.out_of_range, 1);
    }

    #[test]
    fn test_parameter_validation() {
        assert_eq!(
            EdgeClassifier::new(Vector3::y(), 181.0),
            Err(EdgeError::InvalidThreshold(181.0))
        );
        assert_eq!(
            EdgeClassifier::new(Vector3::y(), -1.0),
            Err(EdgeError::InvalidThreshold(-1.0))
        );
        assert_eq!(
            EdgeClassifier::new(Vector3::zeros(), 30.0),
            Err(EdgeError::DegenerateProjection)
        );
        assert!(EdgeClassifier::new(Vector3::new(f64::NAN, 0.0, 1.0), 30.0).is_err());
    }
}

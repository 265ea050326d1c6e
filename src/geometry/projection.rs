// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Orthographic projection onto the plane perpendicular to a view direction

use crate::error::{EdgeError, EdgeResult};
use nalgebra::{Point2, Point3, Vector3};

/// Orthonormal basis (u, v) spanning the image plane of `direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionPlane {
    pub direction: Vector3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
}

impl ProjectionPlane {
    /// Build the image plane for a view direction.
    ///
    /// Looking along +Y the plane axes are +X and +Z.
    pub fn new(direction: &Vector3<f64>) -> EdgeResult<Self> {
        let direction = direction
            .try_normalize(0.0)
            .filter(|d| d.iter().all(|c| c.is_finite()))
            .ok_or(EdgeError::DegenerateProjection)?;

        let reference = if direction.x.abs() > 0.9 {
            Vector3::z()
        } else {
            Vector3::x()
        };
        let u = (reference - direction * direction.dot(&reference)).normalize();
        let v = u.cross(&direction);

        Ok(Self { direction, u, v })
    }

    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        Point2::new(point.coords.dot(&self.u), point.coords.dot(&self.v))
    }
}

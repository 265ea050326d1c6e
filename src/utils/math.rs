// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Dot products below this magnitude are treated as exactly zero
pub const SIGN_EPSILON: f64 = 1e-16;

/// Unit normal of triangle (a, b, c) using the right-hand rule on a→b→c.
///
/// Returns the zero vector for zero-area triangles.
pub fn triangle_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    let ab = b - a;
    let ac = c - a;
    ab.cross(&ac)
        .try_normalize(0.0)
        .unwrap_or_else(Vector3::zeros)
}

/// Snap values within `epsilon` of zero to exactly zero
pub fn snap_to_zero(value: f64, epsilon: f64) -> f64 {
    if value.abs() < epsilon {
        0.0
    } else {
        value
    }
}

/// Three-way sign: -1, 0 or 1
pub fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Linear interpolation between two points
pub fn lerp_point(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    a + (b - a) * t
}

/// Convert degrees to radians
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

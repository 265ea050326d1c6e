// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fixed-point vertex identity
//!
//! Vertices whose coordinates round to the same fixed-point triple are treated
//! as coincident. The precision must suit the mesh units: it decides which
//! triangles are degenerate and which edges find their twin.
//!
//! Keys are `i64`, so a coordinate is keyed reliably only while
//! `|coordinate| / step` stays below 2^63 (about 9.2e18). With 4 digits that
//! is any practical mesh; with 12 digits coordinates must stay under about
//! 9.2e6. Beyond that range the cast saturates and distant points share a key.

use crate::error::{EdgeError, EdgeResult};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Default number of decimal digits kept when quantizing
pub const DEFAULT_PRECISION_DIGITS: u32 = 4;

const MAX_PRECISION_DIGITS: u32 = 12;

/// Quantized vertex position, usable directly as a map key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexKey(pub [i64; 3]);

/// Directed edge between two quantized vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub from: VertexKey,
    pub to: VertexKey,
}

impl EdgeKey {
    pub fn new(from: VertexKey, to: VertexKey) -> Self {
        Self { from, to }
    }

    /// The same edge seen from the adjacent triangle
    pub fn reverse(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

/// Rounds positions to a fixed number of decimal digits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    scale: f64,
}

impl Quantizer {
    /// Quantizer keeping `digits` decimal digits
    pub fn new(digits: u32) -> EdgeResult<Self> {
        if digits > MAX_PRECISION_DIGITS {
            return Err(EdgeError::InvalidPrecision(digits));
        }
        Ok(Self {
            scale: 10f64.powi(digits as i32),
        })
    }

    /// Quantizer snapping to multiples of `tolerance` (a tolerance of 0 keeps full precision).
    /// Tolerances so small that their reciprocal overflows are rejected.
    pub fn with_tolerance(tolerance: f64) -> EdgeResult<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(EdgeError::InvalidTolerance(tolerance));
        }
        if tolerance == 0.0 {
            return Ok(Self { scale: 0.0 });
        }
        let scale = 1.0 / tolerance;
        if !scale.is_finite() {
            return Err(EdgeError::InvalidTolerance(tolerance));
        }
        Ok(Self { scale })
    }

    pub fn key(&self, point: &Point3<f64>) -> VertexKey {
        if self.scale == 0.0 {
            // Exact identity: bit patterns, with -0.0 folded onto 0.0
            return VertexKey([
                exact_bits(point.x),
                exact_bits(point.y),
                exact_bits(point.z),
            ]);
        }
        VertexKey([
            (point.x * self.scale).round() as i64,
            (point.y * self.scale).round() as i64,
            (point.z * self.scale).round() as i64,
        ])
    }
}

impl Default for Quantizer {
    fn default() -> Self {
        Self {
            scale: 10f64.powi(DEFAULT_PRECISION_DIGITS as i32),
        }
    }
}

fn exact_bits(value: f64) -> i64 {
    let value = if value == 0.0 { 0.0 } else { value };
    value.to_bits() as i64
}

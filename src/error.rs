// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for edge extraction and reconstruction

use thiserror::Error;

/// Parameter errors raised before any geometry is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EdgeError {
    /// Crease threshold outside [0, 180] degrees or not finite.
    #[error("Invalid threshold angle: {0} (must be within 0..=180 degrees)")]
    InvalidThreshold(f64),

    /// Projection direction has zero length or non-finite components.
    #[error("Projection direction must be a finite, non-zero vector")]
    DegenerateProjection,

    /// Negative or non-finite link distance for polyline reconstruction.
    #[error("Invalid link distance: {0} (must be >= 0)")]
    InvalidLinkDistance(f64),

    /// Negative or non-finite weld tolerance.
    #[error("Invalid weld tolerance: {0} (must be >= 0)")]
    InvalidTolerance(f64),

    /// Quantization precision outside the supported range.
    #[error("Invalid quantization precision: {0} decimal digits (supported: 0..=12)")]
    InvalidPrecision(u32),
}

/// Result type for core operations.
pub type EdgeResult<T> = std::result::Result<T, EdgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EdgeError::InvalidThreshold(200.0);
        assert!(format!("{err}").contains("200"));

        let err = EdgeError::DegenerateProjection;
        assert_eq!(
            format!("{err}"),
            "Projection direction must be a finite, non-zero vector"
        );
    }
}

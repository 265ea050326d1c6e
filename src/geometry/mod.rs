// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, segments and projection

mod bbox;
mod mesh;
mod primitives;
mod projection;
mod quantize;
mod segment;

pub use bbox::BoundingBox;
pub use mesh::{Mesh, MeshView};
pub use primitives::Primitive;
pub use projection::ProjectionPlane;
pub use quantize::{EdgeKey, Quantizer, VertexKey, DEFAULT_PRECISION_DIGITS};
pub use segment::{Polyline, Segment};

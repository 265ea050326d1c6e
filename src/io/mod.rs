// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh import and line-art export

mod export_json;
mod export_svg;
mod import_stl;

pub use export_json::{export_json, to_json, EdgeDocument};
pub use export_svg::{export_svg, polylines_to_svg, segments_to_svg, SvgOptions};
pub use import_stl::{import_stl, read_stl};

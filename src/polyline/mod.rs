// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyline reconstruction from unordered segments

mod reconstruct;

pub use reconstruct::{reconstruct, reconstruct_with, LinkStrategy, ReconstructOptions};

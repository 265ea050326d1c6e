// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Feature edge extraction: boundaries, creases and silhouettes

mod classifier;

pub use classifier::{classify, midpoint, ClassifyStats, EdgeClassifier, EdgeKind, FeatureEdge};

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cooperative, time-sliced projection pipeline

mod intersection;
mod options;
mod refine;
mod task;

pub use intersection::IntersectionSplitter;
pub use options::PipelineOptions;
pub use refine::{PassThrough, RefineStep, Refiner};
pub use task::{PipelineTask, StepReport};

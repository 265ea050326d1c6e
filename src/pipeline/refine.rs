// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Contract for the optional refinement stage that runs after classification

use crate::geometry::Segment;
use std::time::Instant;

/// Outcome of one refinement slice
#[derive(Debug, Clone, PartialEq)]
pub enum RefineStep {
    /// More work remains. `fraction` is the share of work done so far in [0, 1];
    /// `partial` is an optional snapshot for live preview.
    Progress {
        fraction: f64,
        partial: Option<Vec<Segment>>,
    },
    /// Refinement finished with these segments
    Finished(Vec<Segment>),
}

/// A refinement stage driven in bounded slices.
///
/// `step` should return once `deadline` has passed, but always completes at
/// least one unit of work so a zero budget still makes progress.
pub trait Refiner {
    /// Load the classified segments
    fn begin(&mut self, segments: Vec<Segment>);

    /// Run until the deadline or until done
    fn step(&mut self, deadline: Instant) -> RefineStep;
}

/// Refiner that returns its input unchanged
#[derive(Debug, Default)]
pub struct PassThrough {
    segments: Vec<Segment>,
}

impl Refiner for PassThrough {
    fn begin(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    fn step(&mut self, _deadline: Instant) -> RefineStep {
        RefineStep::Finished(std::mem::take(&mut self.segments))
    }
}

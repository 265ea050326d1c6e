// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Projector API: owns the current projection run

use crate::error::EdgeResult;
use crate::geometry::{Mesh, ProjectionPlane};
use crate::pipeline::{IntersectionSplitter, PipelineOptions, PipelineTask, Refiner};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Builds the refinement stage for a run
pub type RefinerFactory = Box<dyn Fn(&PipelineOptions) -> EdgeResult<Box<dyn Refiner>>>;

/// Starts projection runs. Starting a run invalidates the previous one.
pub struct Projector {
    generation: Arc<AtomicU64>,
    refiner_factory: RefinerFactory,
}

impl Projector {
    /// Create a projector using the built-in intersection splitter
    pub fn new() -> Self {
        Self::with_refiner(|options: &PipelineOptions| {
            let plane = ProjectionPlane::new(&options.projection_dir)?;
            let splitter = IntersectionSplitter::new(plane).with_partial(options.emit_partial);
            Ok(Box::new(splitter) as Box<dyn Refiner>)
        })
    }

    /// Create a projector with a custom refinement stage
    pub fn with_refiner<F>(factory: F) -> Self
    where
        F: Fn(&PipelineOptions) -> EdgeResult<Box<dyn Refiner>> + 'static,
    {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            refiner_factory: Box::new(factory),
        }
    }

    /// Start a run on an already merged mesh
    pub fn start(&mut self, mesh: Mesh, options: PipelineOptions) -> EdgeResult<PipelineTask> {
        let (classifier, refiner) = self.prepare(&options)?;
        let generation = self.bump_generation();
        Ok(PipelineTask::from_merged(
            mesh,
            classifier,
            refiner,
            options,
            Arc::clone(&self.generation),
            generation,
        ))
    }

    /// Start a run that merges `sources` as its first step
    pub fn start_sources(
        &mut self,
        sources: Vec<Mesh>,
        options: PipelineOptions,
    ) -> EdgeResult<PipelineTask> {
        let (classifier, refiner) = self.prepare(&options)?;
        let generation = self.bump_generation();
        Ok(PipelineTask::from_sources(
            sources,
            classifier,
            refiner,
            options,
            Arc::clone(&self.generation),
            generation,
        ))
    }

    /// Invalidate the live run without starting a new one
    pub fn abandon(&mut self) {
        self.bump_generation();
    }

    /// Generation of the most recently started run
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn prepare(
        &self,
        options: &PipelineOptions,
    ) -> EdgeResult<(crate::edges::EdgeClassifier, Option<Box<dyn Refiner>>)> {
        let classifier = options.classifier()?;
        let refiner = if options.include_intersection_refinement {
            Some((self.refiner_factory)(options)?)
        } else {
            None
        };
        Ok((classifier, refiner))
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Started projection run");
        generation
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}

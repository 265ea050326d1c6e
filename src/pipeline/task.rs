// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Step-wise projection task
//!
//! A task advances through merge, classification and optional refinement,
//! doing a bounded amount of work per `advance()` call. Tasks carry the
//! generation they were started in; once their owner starts a newer run
//! they go stale and every further call is a no-op.

use super::options::PipelineOptions;
use super::refine::{RefineStep, Refiner};
use crate::edges::{ClassifyStats, EdgeClassifier};
use crate::geometry::{Mesh, MeshView, Segment};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Progress reported once the sources are merged
const MERGED_PROGRESS: f64 = 0.05;

/// Progress reported after classification when refinement follows
const CLASSIFIED_PROGRESS: f64 = 0.5;

/// Result of one `advance()` call
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub done: bool,
    pub progress: f64,
    /// Intermediate geometry for live preview, when the stage provides one
    pub partial: Option<Vec<Segment>>,
}

/// Stage the task will run on its next advance
enum Stage {
    Merge(Vec<Mesh>),
    Classify(Mesh),
    Refine(Box<dyn Refiner>),
    Done,
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Merge(_) => "merge",
            Stage::Classify(_) => "classify",
            Stage::Refine(_) => "refine",
            Stage::Done => "done",
        }
    }
}

/// One in-flight projection run
pub struct PipelineTask {
    generation: u64,
    owner: Arc<AtomicU64>,
    stage: Stage,
    classifier: EdgeClassifier,
    refiner: Option<Box<dyn Refiner>>,
    options: PipelineOptions,
    progress: f64,
    segments: Vec<Segment>,
    stats: Option<ClassifyStats>,
    started: Instant,
}

impl PipelineTask {
    pub(crate) fn from_sources(
        sources: Vec<Mesh>,
        classifier: EdgeClassifier,
        refiner: Option<Box<dyn Refiner>>,
        options: PipelineOptions,
        owner: Arc<AtomicU64>,
        generation: u64,
    ) -> Self {
        Self {
            generation,
            owner,
            stage: Stage::Merge(sources),
            classifier,
            refiner,
            options,
            progress: 0.0,
            segments: Vec::new(),
            stats: None,
            started: Instant::now(),
        }
    }

    pub(crate) fn from_merged(
        mesh: Mesh,
        classifier: EdgeClassifier,
        refiner: Option<Box<dyn Refiner>>,
        options: PipelineOptions,
        owner: Arc<AtomicU64>,
        generation: u64,
    ) -> Self {
        let mut task =
            Self::from_sources(Vec::new(), classifier, refiner, options, owner, generation);
        if mesh.triangle_count() == 0 {
            task.finish(Vec::new());
        } else {
            task.stage = Stage::Classify(mesh);
        }
        task
    }

    /// Run the next bounded unit of work
    pub fn advance(&mut self) -> StepReport {
        if self.is_stale() {
            return StepReport {
                done: true,
                progress: self.progress,
                partial: None,
            };
        }

        let mut partial = None;
        match std::mem::replace(&mut self.stage, Stage::Done) {
            Stage::Merge(sources) => {
                let merged = Mesh::merge_all(&sources);
                debug!(
                    sources = sources.len(),
                    triangles = merged.triangle_count(),
                    "Merged source geometry"
                );
                if merged.triangle_count() == 0 {
                    self.finish(Vec::new());
                } else {
                    self.stage = Stage::Classify(merged);
                    self.bump(MERGED_PROGRESS);
                }
            }
            Stage::Classify(mesh) => {
                let (edges, stats) = self.classifier.classify_tagged(&mesh);
                self.stats = Some(stats);
                let segments: Vec<Segment> = edges.into_iter().map(|e| e.segment).collect();

                match self.refiner.take() {
                    Some(mut refiner) => {
                        refiner.begin(segments);
                        self.stage = Stage::Refine(refiner);
                        self.bump(CLASSIFIED_PROGRESS);
                    }
                    None => self.finish(segments),
                }
            }
            Stage::Refine(mut refiner) => {
                let deadline = Instant::now() + self.options.max_slice_time;
                match refiner.step(deadline) {
                    RefineStep::Progress {
                        fraction,
                        partial: snapshot,
                    } => {
                        let fraction = if fraction.is_finite() {
                            fraction.clamp(0.0, 1.0)
                        } else {
                            0.0
                        };
                        self.bump(CLASSIFIED_PROGRESS + (1.0 - CLASSIFIED_PROGRESS) * fraction);
                        if self.options.emit_partial {
                            partial = snapshot;
                        }
                        self.stage = Stage::Refine(refiner);
                    }
                    RefineStep::Finished(segments) => self.finish(segments),
                }
            }
            Stage::Done => {}
        }

        StepReport {
            done: self.is_done(),
            progress: self.progress,
            partial,
        }
    }

    /// Advance until done and return the result, `None` if superseded
    pub fn run_to_end(mut self) -> Option<Vec<Segment>> {
        while !self.advance().done {}
        self.into_segments()
    }

    /// Superseded by a newer run of the same owner
    pub fn is_stale(&self) -> bool {
        self.owner.load(Ordering::SeqCst) != self.generation
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done)
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn stage_name(&self) -> &'static str {
        self.stage.name()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Statistics of the classification pass, once it ran
    pub fn stats(&self) -> Option<&ClassifyStats> {
        self.stats.as_ref()
    }

    /// Final segments of a finished, current task
    pub fn segments(&self) -> Option<&[Segment]> {
        (self.is_done() && !self.is_stale()).then_some(self.segments.as_slice())
    }

    /// Take the final segments of a finished, current task
    pub fn into_segments(self) -> Option<Vec<Segment>> {
        (self.is_done() && !self.is_stale()).then_some(self.segments)
    }

    fn bump(&mut self, progress: f64) {
        self.progress = self.progress.max(progress);
    }

    fn finish(&mut self, mut segments: Vec<Segment>) {
        if self.options.sort_edges {
            segments.sort_by(Segment::total_cmp);
        }
        info!(
            segments = segments.len(),
            elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0,
            "Projection finished"
        );
        self.segments = segments;
        self.stage = Stage::Done;
        self.progress = 1.0;
    }
}

impl std::fmt::Debug for PipelineTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineTask")
            .field("generation", &self.generation)
            .field("stage", &self.stage.name())
            .field("progress", &self.progress)
            .field("segments", &self.segments.len())
            .finish()
    }
}

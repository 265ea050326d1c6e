// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Segment-segment intersection splitting in the image plane
//!
//! Every segment is tested against every later one after projecting both
//! onto the plane perpendicular to the view direction. Crossings split the
//! 3D segments at the matching parameter, so visible line art meets at
//! junctions instead of overlapping.

use super::refine::{RefineStep, Refiner};
use crate::geometry::{ProjectionPlane, Segment};
use crate::utils::math::lerp_point;
use nalgebra::{Point2, Vector2};
use std::time::Instant;

/// Parameters within this distance of 0 or 1 count as endpoints
const PARAM_EPS: f64 = 1e-9;

/// Relative tolerance for treating two directions as parallel
const PARALLEL_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct Flat {
    a: Point2<f64>,
    b: Point2<f64>,
    min: Point2<f64>,
    max: Point2<f64>,
}

impl Flat {
    fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            a,
            b,
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    fn bounds_overlap(&self, other: &Flat) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Parameters (t on `p`, u on `q`) where two flat segments cross
fn crossing(p: &Flat, q: &Flat) -> Option<(f64, f64)> {
    if !p.bounds_overlap(q) {
        return None;
    }

    let r = p.b - p.a;
    let s = q.b - q.a;
    let denom = cross(&r, &s);
    if denom.abs() <= PARALLEL_EPS * r.norm() * s.norm() || denom == 0.0 {
        return None;
    }

    let qp = q.a - p.a;
    let t = cross(&qp, &s) / denom;
    let u = cross(&qp, &r) / denom;

    let within = |x: f64| (-PARAM_EPS..=1.0 + PARAM_EPS).contains(&x);
    if within(t) && within(u) {
        Some((t, u))
    } else {
        None
    }
}

fn is_interior(t: f64) -> bool {
    t > PARAM_EPS && t < 1.0 - PARAM_EPS
}

/// Built-in refiner splitting segments at their image-plane crossings
#[derive(Debug, Clone)]
pub struct IntersectionSplitter {
    plane: ProjectionPlane,
    emit_partial: bool,
    segments: Vec<Segment>,
    flat: Vec<Flat>,
    splits: Vec<Vec<f64>>,
    cursor: usize,
    pairs_done: usize,
    pairs_total: usize,
}

impl IntersectionSplitter {
    pub fn new(plane: ProjectionPlane) -> Self {
        Self {
            plane,
            emit_partial: false,
            segments: Vec::new(),
            flat: Vec::new(),
            splits: Vec::new(),
            cursor: 0,
            pairs_done: 0,
            pairs_total: 0,
        }
    }

    /// Return a snapshot of the split geometry with every progress step
    pub fn with_partial(mut self, emit_partial: bool) -> Self {
        self.emit_partial = emit_partial;
        self
    }

    /// Test one segment against all later ones
    fn process_row(&mut self) {
        let i = self.cursor;
        for j in (i + 1)..self.flat.len() {
            if let Some((t, u)) = crossing(&self.flat[i], &self.flat[j]) {
                if is_interior(t) {
                    self.splits[i].push(t);
                }
                if is_interior(u) {
                    self.splits[j].push(u);
                }
            }
        }
        self.pairs_done += self.flat.len() - i - 1;
        self.cursor += 1;
    }

    /// Current segments with all splits found so far applied
    fn assemble(&self) -> Vec<Segment> {
        let mut out = Vec::with_capacity(self.segments.len());
        for (segment, params) in self.segments.iter().zip(&self.splits) {
            if params.is_empty() {
                out.push(*segment);
                continue;
            }

            let mut params = params.clone();
            params.sort_by(f64::total_cmp);
            params.dedup_by(|a, b| (*a - *b).abs() <= PARAM_EPS);

            let mut start = segment.start;
            for t in params {
                let point = lerp_point(&segment.start, &segment.end, t);
                out.push(Segment::new(start, point));
                start = point;
            }
            out.push(Segment::new(start, segment.end));
        }
        out
    }

    fn fraction(&self) -> f64 {
        if self.pairs_total == 0 {
            1.0
        } else {
            self.pairs_done as f64 / self.pairs_total as f64
        }
    }
}

impl Refiner for IntersectionSplitter {
    fn begin(&mut self, segments: Vec<Segment>) {
        self.flat = segments
            .iter()
            .map(|s| Flat::new(self.plane.project(&s.start), self.plane.project(&s.end)))
            .collect();
        self.splits = vec![Vec::new(); segments.len()];
        self.segments = segments;
        self.cursor = 0;
        self.pairs_done = 0;
        let n = self.segments.len();
        self.pairs_total = n * n.saturating_sub(1) / 2;
    }

    fn step(&mut self, deadline: Instant) -> RefineStep {
        while self.cursor < self.flat.len() {
            self.process_row();
            if Instant::now() >= deadline {
                break;
            }
        }

        if self.cursor >= self.flat.len() {
            let result = self.assemble();
            self.segments.clear();
            self.flat.clear();
            self.splits.clear();
            return RefineStep::Finished(result);
        }

        RefineStep::Progress {
            fraction: self.fraction(),
            partial: self.emit_partial.then(|| self.assemble()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};
    use std::time::Duration;

    fn splitter() -> IntersectionSplitter {
        IntersectionSplitter::new(ProjectionPlane::new(&Vector3::y()).unwrap())
    }

    fn run(splitter: &mut IntersectionSplitter) -> Vec<Segment> {
        loop {
            if let RefineStep::Finished(result) = splitter.step(Instant::now()) {
                return result;
            }
        }
    }

    #[test]
    fn test_crossing_segments_split_in_four() {
        let mut s = splitter();
        s.begin(vec![
            Segment::new(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
            // Different heights, but they cross when seen from above
            Segment::new(Point3::new(0.0, 5.0, -1.0), Point3::new(0.0, 5.0, 1.0)),
        ]);
        let result = run(&mut s);

        assert_eq!(result.len(), 4);
        assert!(result.iter().any(|seg| seg.end == Point3::new(0.0, 0.0, 0.0)));
        assert!(result.iter().any(|seg| seg.end == Point3::new(0.0, 5.0, 0.0)));
    }

    #[test]
    fn test_shared_endpoints_are_not_split() {
        let mut s = splitter();
        s.begin(vec![
            Segment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
            Segment::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 1.0)),
        ]);
        assert_eq!(run(&mut s).len(), 2);
    }

    #[test]
    fn test_t_junction_splits_the_through_segment() {
        let mut s = splitter();
        s.begin(vec![
            Segment::new(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
            Segment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0)),
        ]);
        assert_eq!(run(&mut s).len(), 3);
    }

    #[test]
    fn test_parallel_segments_untouched() {
        let mut s = splitter();
        s.begin(vec![
            Segment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
            Segment::new(Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 1.0)),
        ]);
        assert_eq!(run(&mut s).len(), 2);
    }

    #[test]
    fn test_zero_budget_progresses_one_row_at_a_time() {
        let mut s = splitter().with_partial(true);
        let segments: Vec<Segment> = (0..4)
            .map(|i| {
                let x = i as f64;
                Segment::new(Point3::new(x, 0.0, 0.0), Point3::new(x, 0.0, 1.0))
            })
            .collect();
        s.begin(segments);

        let expired = Instant::now() - Duration::from_millis(1);
        match s.step(expired) {
            RefineStep::Progress { fraction, partial } => {
                assert!((fraction - 0.5).abs() < 1e-12);
                assert_eq!(partial.map(|p| p.len()), Some(4));
            }
            RefineStep::Finished(_) => panic!("finished after one row"),
        }
        assert_eq!(run(&mut s).len(), 4);
    }

    #[test]
    fn test_empty_input_finishes() {
        let mut s = splitter();
        s.begin(Vec::new());
        assert_eq!(s.step(Instant::now()), RefineStep::Finished(Vec::new()));
    }
}

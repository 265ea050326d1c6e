// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Greedy nearest-neighbour polyline reconstruction
//!
//! A spatial stitcher, not a graph walk: it can join two unrelated paths that
//! pass close to each other and it splits a path at any gap wider than the
//! link distance. Both strategies scan the whole pool for every link, so cost
//! grows with the square of the endpoint count.

use crate::error::{EdgeError, EdgeResult};
use crate::geometry::{Polyline, Quantizer, Segment, VertexKey};
use ahash::{AHashMap, AHashSet};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How candidates for the next link are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStrategy {
    /// Pool of segments; links follow shared or nearby segment endpoints
    #[default]
    Segments,
    /// Pool of distinct endpoints; links jump to the nearest remaining point
    Endpoints,
}

/// Options for polyline reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconstructOptions {
    /// Largest gap bridged between consecutive points
    pub max_link_distance: f64,
    /// Endpoints closer than this are the same point (0 = exact match)
    pub weld_tolerance: f64,
    pub strategy: LinkStrategy,
}

impl ReconstructOptions {
    pub fn new(max_link_distance: f64) -> Self {
        Self {
            max_link_distance,
            ..Default::default()
        }
    }

    pub fn with_weld_tolerance(mut self, weld_tolerance: f64) -> Self {
        self.weld_tolerance = weld_tolerance;
        self
    }

    pub fn with_strategy(mut self, strategy: LinkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn validate(&self) -> EdgeResult<()> {
        if !self.max_link_distance.is_finite() || self.max_link_distance < 0.0 {
            return Err(EdgeError::InvalidLinkDistance(self.max_link_distance));
        }
        if !self.weld_tolerance.is_finite() || self.weld_tolerance < 0.0 {
            return Err(EdgeError::InvalidTolerance(self.weld_tolerance));
        }
        Ok(())
    }
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            max_link_distance: 10.0,
            weld_tolerance: 0.0,
            strategy: LinkStrategy::Segments,
        }
    }
}

/// Chain segments into polylines, bridging gaps up to `max_link_distance`
pub fn reconstruct(segments: &[Segment], max_link_distance: f64) -> EdgeResult<Vec<Polyline>> {
    reconstruct_with(segments, &ReconstructOptions::new(max_link_distance))
}

/// Chain segments into polylines with explicit options
pub fn reconstruct_with(
    segments: &[Segment],
    options: &ReconstructOptions,
) -> EdgeResult<Vec<Polyline>> {
    options.validate()?;

    let polylines = match options.strategy {
        LinkStrategy::Segments => chain_segments(segments, options),
        LinkStrategy::Endpoints => chain_endpoints(segments, options)?,
    };

    debug!(
        segments = segments.len(),
        polylines = polylines.len(),
        strategy = ?options.strategy,
        "Reconstructed polylines"
    );

    Ok(polylines)
}

fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (b - a).norm()
}

/// Remaining segment whose nearer endpoint is closest to `from`.
/// Returns (pool index, distance, near end is the segment start).
fn nearest_segment(pool: &[Segment], from: &Point3<f64>) -> Option<(usize, f64, bool)> {
    let mut best: Option<(usize, f64, bool)> = None;
    for (index, segment) in pool.iter().enumerate() {
        for (point, is_start) in [(&segment.start, true), (&segment.end, false)] {
            let d = distance(from, point);
            if best.map_or(true, |(_, best_d, _)| d < best_d) {
                best = Some((index, d, is_start));
            }
        }
    }
    best
}

/// Grow `chain` at its tail for as long as a segment lies within reach
fn extend_tail(
    chain: &mut Vec<Point3<f64>>,
    pool: &mut Vec<Segment>,
    options: &ReconstructOptions,
) {
    while let Some(tail) = chain.last().copied() {
        let Some((index, d, near_is_start)) = nearest_segment(pool, &tail) else {
            break;
        };
        if d > options.max_link_distance {
            break;
        }

        let segment = pool.remove(index);
        let (near, far) = if near_is_start {
            (segment.start, segment.end)
        } else {
            (segment.end, segment.start)
        };
        if d > options.weld_tolerance {
            chain.push(near);
        }
        chain.push(far);
    }
}

fn chain_segments(segments: &[Segment], options: &ReconstructOptions) -> Vec<Polyline> {
    let mut pool: Vec<Segment> = segments
        .iter()
        .filter(|s| !s.is_degenerate(options.weld_tolerance))
        .copied()
        .collect();
    let mut polylines = Vec::new();

    while !pool.is_empty() {
        let seed = pool.remove(0);
        let mut chain = vec![seed.start, seed.end];

        extend_tail(&mut chain, &mut pool, options);
        chain.reverse();
        extend_tail(&mut chain, &mut pool, options);
        chain.reverse();

        polylines.push(Polyline::new(chain));
    }

    polylines
}

/// Distinct endpoints in first-seen order.
///
/// With a zero tolerance identity is exact. Otherwise points are bucketed in
/// cells of twice the tolerance and a point is dropped when an earlier kept
/// point in its 3x3x3 neighbourhood lies within the tolerance.
fn distinct_endpoints(segments: &[Segment], tolerance: f64) -> EdgeResult<Vec<Point3<f64>>> {
    let mut points = Vec::with_capacity(segments.len() * 2);

    if tolerance == 0.0 {
        let quantizer = Quantizer::with_tolerance(0.0)?;
        let mut seen: AHashSet<VertexKey> = AHashSet::with_capacity(segments.len() * 2);
        for segment in segments {
            for point in [segment.start, segment.end] {
                if seen.insert(quantizer.key(&point)) {
                    points.push(point);
                }
            }
        }
        return Ok(points);
    }

    let cells = Quantizer::with_tolerance(tolerance * 2.0)?;
    let mut grid: AHashMap<VertexKey, Vec<usize>> = AHashMap::new();
    for segment in segments {
        for point in [segment.start, segment.end] {
            let VertexKey([cx, cy, cz]) = cells.key(&point);
            let mut welded = false;
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let neighbour = VertexKey([
                            cx.saturating_add(dx),
                            cy.saturating_add(dy),
                            cz.saturating_add(dz),
                        ]);
                        let Some(candidates) = grid.get(&neighbour) else {
                            continue;
                        };
                        if candidates
                            .iter()
                            .any(|&kept| distance(&points[kept], &point) <= tolerance)
                        {
                            welded = true;
                            break 'search;
                        }
                    }
                }
            }
            if !welded {
                grid.entry(VertexKey([cx, cy, cz]))
                    .or_default()
                    .push(points.len());
                points.push(point);
            }
        }
    }
    Ok(points)
}

fn chain_endpoints(
    segments: &[Segment],
    options: &ReconstructOptions,
) -> EdgeResult<Vec<Polyline>> {
    let mut remaining = distinct_endpoints(segments, options.weld_tolerance)?;
    let mut polylines = Vec::new();

    while !remaining.is_empty() {
        let mut chain = vec![remaining.remove(0)];

        loop {
            let Some(tail) = chain.last() else { break };
            let nearest = remaining
                .iter()
                .enumerate()
                .map(|(index, point)| (index, distance(tail, point)))
                .fold(None, |best: Option<(usize, f64)>, (index, d)| match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((index, d)),
                });

            match nearest {
                Some((index, d)) if d <= options.max_link_distance => {
                    chain.push(remaining.remove(index));
                }
                _ => break,
            }
        }

        if chain.len() > 1 {
            polylines.push(Polyline::new(chain));
        }
    }

    Ok(polylines)
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyline reconstruction behaviour

use edgeline::geometry::{Polyline, Quantizer, Segment, VertexKey};
use edgeline::{reconstruct, reconstruct_with, LinkStrategy, ReconstructOptions};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

fn p(x: f64, y: f64) -> Point3<f64> {
    Point3::new(x, y, 0.0)
}

fn point_set(points: &[Point3<f64>]) -> BTreeSet<VertexKey> {
    let q = Quantizer::default();
    points.iter().map(|point| q.key(point)).collect()
}

#[test]
fn test_square_becomes_one_closed_looking_polyline() {
    let segments = [
        Segment::new(p(0.0, 0.0), p(1.0, 0.0)),
        Segment::new(p(1.0, 0.0), p(1.0, 1.0)),
        Segment::new(p(1.0, 1.0), p(0.0, 1.0)),
        Segment::new(p(0.0, 1.0), p(0.0, 0.0)),
    ];
    let polylines = reconstruct(&segments, 0.1).unwrap();

    assert_eq!(polylines.len(), 1);
    let square = &polylines[0];
    assert_eq!(square.len(), 5);
    assert!(square.is_closed(1e-12));
    assert_eq!(point_set(&square.points).len(), 4);
}

#[test]
fn test_distant_segments_stay_apart() {
    let segments = [
        Segment::new(p(0.0, 0.0), p(1.0, 0.0)),
        Segment::new(p(5.0, 0.0), p(6.0, 0.0)),
    ];

    for strategy in [LinkStrategy::Segments, LinkStrategy::Endpoints] {
        let options = ReconstructOptions::new(2.0).with_strategy(strategy);
        let polylines = reconstruct_with(&segments, &options).unwrap();
        assert_eq!(polylines.len(), 2, "{strategy:?}");
        assert!(polylines.iter().all(|line| line.len() == 2), "{strategy:?}");
    }
}

#[test]
fn test_near_coincident_endpoints_weld_only_with_tolerance() {
    let segments = [
        Segment::new(p(0.0, 0.0), p(1.0, 0.0)),
        Segment::new(p(1.00001, 0.0), p(2.0, 0.0)),
    ];

    let exact = reconstruct_with(&segments, &ReconstructOptions::new(0.01)).unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].len(), 4);

    let welded = ReconstructOptions::new(0.01).with_weld_tolerance(1e-3);
    let polylines = reconstruct_with(&segments, &welded).unwrap();
    assert_eq!(polylines[0].points, vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]);

    let endpoints = ReconstructOptions::new(1.5).with_strategy(LinkStrategy::Endpoints);
    assert_eq!(reconstruct_with(&segments, &endpoints).unwrap()[0].len(), 4);
    let endpoints = endpoints.with_weld_tolerance(1e-3);
    assert_eq!(reconstruct_with(&segments, &endpoints).unwrap()[0].len(), 3);
}

#[test]
fn test_endpoint_weld_compares_distances_not_grid_cells() {
    let segments = [
        Segment::new(p(0.0, 0.0), p(1.0004999, 0.0)),
        Segment::new(p(1.0005001, 0.0), p(2.0, 0.0)),
    ];
    let options = ReconstructOptions::new(1.5)
        .with_strategy(LinkStrategy::Endpoints)
        .with_weld_tolerance(1e-3);
    let polylines = reconstruct_with(&segments, &options).unwrap();

    assert_eq!(polylines.len(), 1);
    assert_eq!(
        polylines[0].points,
        vec![p(0.0, 0.0), p(1.0004999, 0.0), p(2.0, 0.0)]
    );
}

#[test]
fn test_reconstruct_is_idempotent_on_its_own_output() {
    let zigzag = Polyline::new(vec![
        p(0.0, 0.0),
        p(1.0, 1.0),
        p(2.0, 0.0),
        p(3.0, 1.0),
        p(4.0, 0.0),
        p(5.0, 1.0),
    ]);
    let expected = point_set(&zigzag.points);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let mut segments = zigzag.segments();
        segments.shuffle(&mut rng);
        for segment in segments.iter_mut() {
            if rng.gen_bool(0.5) {
                *segment = segment.reversed();
            }
        }

        let polylines = reconstruct(&segments, 100.0).unwrap();
        assert_eq!(polylines.len(), 1);
        assert_eq!(point_set(&polylines[0].points), expected);

        let again = reconstruct(&polylines[0].segments(), 100.0).unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(point_set(&again[0].points), expected);
    }
}

#[test]
fn test_every_polyline_has_at_least_two_points() {
    let mut rng = StdRng::seed_from_u64(42);
    let segments: Vec<Segment> = (0..200)
        .map(|_| {
            let start = p(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0));
            let end = p(start.x + rng.gen_range(-0.5..0.5), start.y + rng.gen_range(-0.5..0.5));
            Segment::new(start, end)
        })
        .collect();

    for strategy in [LinkStrategy::Segments, LinkStrategy::Endpoints] {
        let options = ReconstructOptions::new(0.3).with_strategy(strategy);
        let polylines = reconstruct_with(&segments, &options).unwrap();
        assert!(!polylines.is_empty());
        assert!(polylines.iter().all(|line| line.len() >= 2), "{strategy:?}");
    }
}

#[test]
fn test_empty_input() {
    assert!(reconstruct(&[], 1.0).unwrap().is_empty());
}

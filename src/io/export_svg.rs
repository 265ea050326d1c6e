// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! SVG line-art exporter
//!
//! Geometry is projected onto the plane perpendicular to the view direction
//! (the `(x, z)` plane when looking along +Y), scaled so the drawing spans
//! the target width, and framed with a margin proportional to that width.

use crate::geometry::{Polyline, ProjectionPlane, Segment};
use anyhow::{Context, Result};
use nalgebra::{Point2, Vector3};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Lines shorter than this after scaling are not written
const MIN_SCALED_LENGTH: f64 = 1e-4;

/// Layout and styling of the exported drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvgOptions {
    /// View direction the drawing is projected along
    pub projection_dir: Vector3<f64>,
    /// Width of the drawing itself, before margins
    pub target_width: f64,
    /// Margin on each side as a fraction of the target width
    pub margin_ratio: f64,
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            projection_dir: Vector3::y(),
            target_width: 1000.0,
            margin_ratio: 0.1,
            stroke: "black".to_string(),
            stroke_width: 2.0,
        }
    }
}

/// Scale and view box shared by all elements of one drawing
struct Frame {
    scale: f64,
    view_box: String,
}

impl Frame {
    fn fit<'a>(points: impl Iterator<Item = &'a Point2<f64>>, options: &SvgOptions) -> Self {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min = Point2::new(min.x.min(p.x), min.y.min(p.y));
            max = Point2::new(max.x.max(p.x), max.y.max(p.y));
        }
        if min.x > max.x {
            min = Point2::origin();
            max = Point2::origin();
        }

        let width = max.x - min.x;
        let height = max.y - min.y;
        // Fall back to the height, then to unit scale, for flat drawings
        let extent = if width > 0.0 { width } else { height };
        let scale = if extent > 0.0 { options.target_width / extent } else { 1.0 };
        let margin = options.target_width * options.margin_ratio;

        Self {
            scale,
            view_box: format!(
                "{} {} {} {}",
                min.x * scale - margin,
                min.y * scale - margin,
                width * scale + 2.0 * margin,
                height * scale + 2.0 * margin
            ),
        }
    }

    fn apply(&self, point: &Point2<f64>) -> Point2<f64> {
        Point2::from(point.coords * self.scale)
    }
}

fn begin_document(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    frame: &Frame,
    options: &SvgOptions,
) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    svg.push_attribute(("viewBox", frame.view_box.as_str()));
    writer.write_event(Event::Start(svg))?;

    let mut group = BytesStart::new("g");
    group.push_attribute(("fill", "none"));
    group.push_attribute(("stroke", options.stroke.as_str()));
    group.push_attribute(("stroke-width", options.stroke_width.to_string().as_str()));
    writer.write_event(Event::Start(group))?;
    Ok(())
}

fn end_document(mut writer: Writer<Cursor<Vec<u8>>>) -> Result<String> {
    writer.write_event(Event::End(BytesEnd::new("g")))?;
    writer.write_event(Event::End(BytesEnd::new("svg")))?;
    String::from_utf8(writer.into_inner().into_inner()).context("SVG output is not UTF-8")
}

/// Render segments as one `<line>` each
pub fn segments_to_svg(segments: &[Segment], options: &SvgOptions) -> Result<String> {
    let plane = ProjectionPlane::new(&options.projection_dir)?;
    let flat: Vec<[Point2<f64>; 2]> = segments
        .iter()
        .map(|s| [plane.project(&s.start), plane.project(&s.end)])
        .collect();
    let frame = Frame::fit(flat.iter().flatten(), options);

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    begin_document(&mut writer, &frame, options)?;

    for [a, b] in &flat {
        let a = frame.apply(a);
        let b = frame.apply(b);
        if (b - a).norm() < MIN_SCALED_LENGTH {
            continue;
        }
        let mut line = BytesStart::new("line");
        line.push_attribute(("x1", a.x.to_string().as_str()));
        line.push_attribute(("y1", a.y.to_string().as_str()));
        line.push_attribute(("x2", b.x.to_string().as_str()));
        line.push_attribute(("y2", b.y.to_string().as_str()));
        writer.write_event(Event::Empty(line))?;
    }

    end_document(writer)
}

/// Render polylines as one `<polyline>` each
pub fn polylines_to_svg(polylines: &[Polyline], options: &SvgOptions) -> Result<String> {
    let plane = ProjectionPlane::new(&options.projection_dir)?;
    let flat: Vec<Vec<Point2<f64>>> = polylines
        .iter()
        .map(|p| p.points.iter().map(|point| plane.project(point)).collect())
        .collect();
    let frame = Frame::fit(flat.iter().flatten(), options);

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    begin_document(&mut writer, &frame, options)?;

    for points in &flat {
        let scaled: Vec<Point2<f64>> = points.iter().map(|p| frame.apply(p)).collect();
        let length: f64 = scaled.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        if scaled.len() < 2 || length < MIN_SCALED_LENGTH {
            continue;
        }
        let coords = scaled
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        let mut polyline = BytesStart::new("polyline");
        polyline.push_attribute(("points", coords.as_str()));
        writer.write_event(Event::Empty(polyline))?;
    }

    end_document(writer)
}

/// Write an SVG document to disk
pub fn export_svg<P: AsRef<Path>>(svg: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, svg).with_context(|| format!("Failed to write SVG file: {}", path.display()))
}

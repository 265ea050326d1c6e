// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edgeline CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use edgeline::config::{parse_vector, EdgelineConfig};
use edgeline::io::{self, EdgeDocument};
use edgeline::{reconstruct_with, Mesh, MeshView, PipelineTask, Projector, Segment};
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::{Matrix4, Rotation3};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edgeline")]
#[command(about = "Edgeline - feature edges and line art from triangle meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./edgeline.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Flags shared by the commands that run the pipeline
#[derive(clap::Args)]
struct ProjectionArgs {
    /// Input STL file
    input: PathBuf,

    /// Crease threshold in degrees
    #[arg(short, long)]
    threshold: Option<f64>,

    /// View direction as x,y,z
    #[arg(short, long, value_name = "X,Y,Z", allow_hyphen_values = true)]
    direction: Option<String>,

    /// Rotate the mesh before projecting, in degrees about x,y,z
    #[arg(long, value_name = "X,Y,Z", allow_hyphen_values = true)]
    rotate: Option<String>,

    /// Skip splitting edges at their image-plane crossings
    #[arg(long)]
    no_intersections: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Project an STL file to SVG line art
    Project {
        #[command(flatten)]
        projection: ProjectionArgs,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,

        /// Stitch segments into polylines before writing
        #[arg(long)]
        polylines: bool,

        /// Largest gap bridged when stitching polylines
        #[arg(long)]
        link_distance: Option<f64>,

        /// Endpoints closer than this are welded when stitching
        #[arg(long)]
        weld_tolerance: Option<f64>,
    },

    /// Extract feature edges from an STL file as JSON
    Edges {
        #[command(flatten)]
        projection: ProjectionArgs,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = EdgelineConfig::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            config
        }
        None => EdgelineConfig::load()?,
    };

    match cli.command {
        Commands::Project {
            projection,
            output,
            polylines,
            link_distance,
            weld_tolerance,
        } => {
            if let Some(distance) = link_distance {
                config.polylines.max_link_distance = distance;
            }
            if let Some(tolerance) = weld_tolerance {
                config.polylines.weld_tolerance = tolerance;
            }
            project_command(&projection, &output, polylines, &mut config, cli.verbose)?;
        }
        Commands::Edges { projection, output } => {
            edges_command(&projection, output.as_deref(), &mut config, cli.verbose)?;
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::Version => {
            println!("Edgeline v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "edgeline=debug" } else { "edgeline=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Apply projection flags on top of the loaded configuration
fn apply_projection_args(args: &ProjectionArgs, config: &mut EdgelineConfig) -> Result<()> {
    if let Some(threshold) = args.threshold {
        config.pipeline.angle_threshold = threshold;
    }
    if let Some(direction) = &args.direction {
        config.pipeline.projection_dir = parse_vector(direction)
            .context("Invalid --direction")?
            .into();
    }
    if args.no_intersections {
        config.pipeline.include_intersection_refinement = false;
    }
    Ok(())
}

fn load_mesh(args: &ProjectionArgs, verbose: bool) -> Result<Mesh> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut mesh = io::import_stl(&args.input)?;
    if let Some(rotate) = &args.rotate {
        let degrees = parse_vector(rotate).context("Invalid --rotate")?;
        let radians = degrees.map(f64::to_radians);
        let rotation = Rotation3::from_euler_angles(radians.x, radians.y, radians.z);
        // Rotate about the mesh center so the drawing stays in place
        let center = mesh.bounding_box().center().coords;
        let matrix = Matrix4::new_translation(&center)
            * rotation.to_homogeneous()
            * Matrix4::new_translation(&-center);
        mesh.transform(&matrix);
    }

    if verbose {
        eprintln!("{} {}", "Input:".bold(), args.input.display().to_string().cyan());
        eprintln!("Vertices: {}", mesh.vertex_count());
        eprintln!("Triangles: {}", mesh.triangle_count());
        let size = mesh.bounding_box().size();
        eprintln!("Size: {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
    }
    Ok(mesh)
}

/// Drive a task to completion, one slice per progress tick
fn run_task(mut task: PipelineTask, verbose: bool) -> Result<(Vec<Segment>, PipelineTask)> {
    let progress = if verbose {
        let pb = ProgressBar::new(1000);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    loop {
        let report = task.advance();
        if let Some(pb) = &progress {
            pb.set_position((report.progress * 1000.0).round() as u64);
            pb.set_message(task.stage_name());
        }
        if report.done {
            break;
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let segments = task
        .segments()
        .map(<[Segment]>::to_vec)
        .context("Projection run was superseded")?;
    Ok((segments, task))
}

fn project_command(
    args: &ProjectionArgs,
    output: &Path,
    polylines: bool,
    config: &mut EdgelineConfig,
    verbose: bool,
) -> Result<()> {
    apply_projection_args(args, config)?;
    let mesh = load_mesh(args, verbose)?;

    let start = Instant::now();
    let task = Projector::new().start(mesh, config.pipeline_options())?;
    let (segments, _) = run_task(task, verbose)?;

    let svg_options = config.svg_options();
    let svg = if polylines {
        let chains = reconstruct_with(&segments, &config.reconstruct_options())?;
        if verbose {
            eprintln!("Polylines: {}", chains.len());
        }
        io::polylines_to_svg(&chains, &svg_options)?
    } else {
        io::segments_to_svg(&segments, &svg_options)?
    };
    io::export_svg(&svg, output)?;

    if verbose {
        eprintln!("Segments: {}", segments.len());
        eprintln!("Projected in {:.2?}", start.elapsed());
    }
    println!(
        "{} {} -> {}",
        "✅".green(),
        args.input.display(),
        output.display().to_string().green()
    );
    Ok(())
}

fn edges_command(
    args: &ProjectionArgs,
    output: Option<&Path>,
    config: &mut EdgelineConfig,
    verbose: bool,
) -> Result<()> {
    apply_projection_args(args, config)?;
    let mesh = load_mesh(args, verbose)?;

    let task = Projector::new().start(mesh, config.pipeline_options())?;
    let (segments, task) = run_task(task, verbose)?;

    let document = EdgeDocument {
        segments,
        polylines: Vec::new(),
        stats: task.stats().copied(),
    };

    match output {
        Some(path) => {
            io::export_json(&document, path)?;
            println!(
                "{} {} edges -> {}",
                "✅".green(),
                document.segments.len(),
                path.display().to_string().green()
            );
        }
        None => println!("{}", io::to_json(&document)?),
    }

    if verbose {
        let [x, y, z] = config.pipeline.projection_dir;
        eprintln!(
            "{} threshold {}°, direction ({x}, {y}, {z})",
            "Settings:".bold(),
            config.pipeline.angle_threshold,
        );
    }
    Ok(())
}

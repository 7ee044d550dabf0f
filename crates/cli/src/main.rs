mod provenance;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use convex::api::{
    build_convex_hull, build_convex_hull_2d, sample, simplify_default, Aabb, ConvexData,
    ConvexError, PipelineCfg, Polytope, ReplayToken, Shape, SimplifyCfg, Vec3,
};
use serde_json::json;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Build simplified convex proxies from point clouds")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Hull a point cloud, decimate it, and write the exported convex data
    Hull {
        /// JSON array of `[x, y, z]` points
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Optional JSON `PipelineCfg`; missing fields use defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Stop at this face count instead of the fully decimated state
        #[arg(long, conflicts_with = "error")]
        faces: Option<usize>,
        /// Stop before the first removal whose relative error reaches this
        #[arg(long)]
        error: Option<f64>,
        /// Also write the little-endian binary form here
        #[arg(long)]
        binary: Option<PathBuf>,
        /// Wrap the xz shadow and extrude it into a prism
        #[arg(long)]
        planar: bool,
    },
    /// Write a seeded random point cloud
    Sample {
        #[arg(long, value_enum, default_value_t = ShapeArg::Sphere)]
        shape: ShapeArg,
        #[arg(long, default_value_t = 64)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Radius, or half extent for boxes
        #[arg(long, default_value_t = 1.0)]
        size: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeArg {
    Sphere,
    Ball,
    Box,
}

impl From<ShapeArg> for Shape {
    fn from(s: ShapeArg) -> Self {
        match s {
            ShapeArg::Sphere => Shape::Sphere,
            ShapeArg::Ball => Shape::Ball,
            ShapeArg::Box => Shape::Box,
        }
    }
}

/// Options of one `hull` run.
struct HullJob {
    input: PathBuf,
    out: PathBuf,
    config: Option<PathBuf>,
    faces: Option<usize>,
    error: Option<f64>,
    binary: Option<PathBuf>,
    planar: bool,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Hull {
            input,
            out,
            config,
            faces,
            error,
            binary,
            planar,
        } => {
            let job = HullJob {
                input,
                out,
                config,
                faces,
                error,
                binary,
                planar,
            };
            hull(&job).map(|_| ())
        }
        Action::Sample {
            shape,
            count,
            seed,
            size,
            out,
        } => sample_cloud(shape, count, seed, size, &out),
        Action::Report => report(),
    }
}

fn read_points(path: &Path) -> Result<Vec<Vec3>> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing points in {}", path.display()))
}

fn load_cfg(path: Option<&Path>) -> Result<PipelineCfg> {
    let Some(path) = path else {
        return Ok(PipelineCfg::default());
    };
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing config {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

fn decimate(points: &[Vec3], job: &HullJob, cfg: &PipelineCfg) -> convex::Result<ConvexData> {
    let hull = if job.planar {
        build_convex_hull_2d(points, &cfg.hull2d)?
    } else {
        build_convex_hull(points, &cfg.hull)?
    };
    let mut poly = simplify_default(hull, &cfg.simplify)?;
    if let Some(n) = job.faces {
        poly.goto_face_count(n)?;
    } else if let Some(e) = job.error {
        poly.goto_error(e)?;
    }
    Ok(poly.to_convex_data())
}

/// Padded bounding box of `points` as convex data, flagged `BAD_FIT`.
fn box_fallback(points: &[Vec3], cfg: &PipelineCfg) -> Result<ConvexData> {
    let finite: Vec<Vec3> = points
        .iter()
        .copied()
        .filter(|p| p.iter().all(|c| c.is_finite()))
        .collect();
    let mut b = Aabb::from_points(&finite);
    anyhow::ensure!(!b.is_empty(), "no finite input point to bound");
    b.expand(cfg.simplify.prism_half_thickness);
    let corners: Vec<Vec3> = (0..8)
        .map(|i| {
            Vec3::new(
                if i & 1 == 0 { b.min.x } else { b.max.x },
                if i & 2 == 0 { b.min.y } else { b.max.y },
                if i & 4 == 0 { b.min.z } else { b.max.z },
            )
        })
        .collect();
    let hull = build_convex_hull(&corners, &cfg.hull).context("wrapping fallback box")?;
    let poly = Polytope::from_hull(hull, 1.0, SimplifyCfg::default())
        .context("building fallback box")?;
    let mut cd = poly.to_convex_data();
    cd.set_bad_fit(true);
    Ok(cd)
}

fn hull(job: &HullJob) -> Result<ConvexData> {
    tracing::info!(
        input = %job.input.display(),
        out = %job.out.display(),
        faces = ?job.faces,
        error = ?job.error,
        planar = job.planar,
        "hull"
    );
    let cfg = load_cfg(job.config.as_deref())?;
    let points = read_points(&job.input)?;
    let cd = match decimate(&points, job, &cfg) {
        Ok(cd) => cd,
        Err(e @ ConvexError::FaceCount { .. }) => return Err(e).context("face count target"),
        Err(e) => {
            tracing::warn!(error = %e, "hull pipeline failed; writing bounding box");
            box_fallback(&points, &cfg)?
        }
    };

    ensure_parent(&job.out)?;
    fs::write(&job.out, serde_json::to_vec_pretty(&cd)?)
        .with_context(|| format!("writing {}", job.out.display()))?;
    let mut extra = Vec::new();
    if let Some(bin) = &job.binary {
        ensure_parent(bin)?;
        let file = fs::File::create(bin).with_context(|| format!("creating {}", bin.display()))?;
        let mut w = BufWriter::new(file);
        cd.write_to(&mut w)
            .with_context(|| format!("writing {}", bin.display()))?;
        w.flush()?;
        extra.push(bin.clone());
    }

    let payload = Payload::new(json!({
        "faces": job.faces,
        "error": job.error,
        "planar": job.planar,
        "config": cfg,
    }))
    .with_input(&job.input)
    .with_summary(json!({
        "input_points": points.len(),
        "vertex_count": cd.vertex_count(),
        "face_count": cd.face_count(),
        "bad_fit": cd.is_bad_fit(),
    }));
    let prov = write_sidecar(&job.out, &extra, payload)?;
    tracing::info!(
        faces = cd.face_count(),
        vertices = cd.vertex_count(),
        provenance = %prov.display(),
        "hull written"
    );
    Ok(cd)
}

fn sample_cloud(shape: ShapeArg, count: usize, seed: u64, size: f64, out: &Path) -> Result<()> {
    tracing::info!(?shape, count, seed, size, out = %out.display(), "sample");
    let pts = sample(shape.into(), count, size, ReplayToken::new(seed, 0));
    ensure_parent(out)?;
    fs::write(out, serde_json::to_vec(&pts)?)
        .with_context(|| format!("writing {}", out.display()))?;
    let payload = Payload::new(json!({
        "shape": format!("{shape:?}").to_lowercase(),
        "count": count,
        "seed": seed,
        "size": size,
    }));
    write_sidecar(out, &[], payload)?;
    Ok(())
}

fn report() -> Result<()> {
    let mut obj = provenance::header();
    obj["params"] = json!({});
    obj["outputs"] = json!([]);
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

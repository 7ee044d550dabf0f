//! End-to-end entry points: points to hull, hull to decimated polytope,
//! polytope to exported `ConvexData`.
//!
//! Purpose
//! - One free function per stage so callers (the CLI, asset tooling, tests)
//!   never touch the builder state machine or the polytope arena directly.
//!
//! Notes
//! - A simplification that raised the exception flag is reported as an error
//!   even though the polytope itself is left in its last good state; callers
//!   are expected to fall back to a coarser proxy (e.g. the AABB).

use serde::{Deserialize, Serialize};

use crate::convex_data::ConvexData;
use crate::error::{ConvexError, Result};
use crate::geom3::{all_finite, dedup_points, Aabb, Vec3};
use crate::hull::{build_planar, GiftWrap, Hull2dCfg, HullCfg, HullResult};
use crate::polytope::{Polytope, SimplifyCfg};

/// Every knob of the pipeline; the CLI loads this from JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineCfg {
    pub hull: HullCfg,
    pub hull2d: Hull2dCfg,
    pub simplify: SimplifyCfg,
}

fn prepare(points: &[Vec3], dedup_eps: f64) -> Result<Vec<Vec3>> {
    if !all_finite(points) {
        return Err(ConvexError::degenerate("non-finite input coordinate"));
    }
    let pts = dedup_points(points, dedup_eps);
    if pts.len() < 3 {
        return Err(ConvexError::TooFewPoints {
            found: pts.len(),
            needed: 3,
        });
    }
    Ok(pts)
}

/// Gift-wrap `points` after merging near-duplicates.
pub fn build_convex_hull(points: &[Vec3], cfg: &HullCfg) -> Result<HullResult> {
    let pts = prepare(points, cfg.dedup_eps)?;
    GiftWrap::new(pts, *cfg)?.compute()
}

/// Planar variant: wrap the `xz` shadow of `points` as one polygon.
pub fn build_convex_hull_2d(points: &[Vec3], cfg: &Hull2dCfg) -> Result<HullResult> {
    let pts = prepare(points, cfg.identical_eps * 0.1)?;
    build_planar(&pts, cfg)
}

/// Build the polytope and decimate it. Recorded errors are divided by
/// `error_scale`, which `goto_error` compares against.
pub fn simplify(hull: HullResult, error_scale: f64, cfg: &SimplifyCfg) -> Result<Polytope> {
    let mut poly = Polytope::from_hull(hull, error_scale, *cfg)?;
    poly.reduce_all()?;
    Ok(poly)
}

/// `simplify` with the hull's bounding-box diagonal as error scale.
pub fn simplify_default(hull: HullResult, cfg: &SimplifyCfg) -> Result<Polytope> {
    let diag = Aabb::from_points(&hull.vertices).diagonal();
    let scale = if diag > 0.0 { diag } else { 1.0 };
    simplify(hull, scale, cfg)
}

/// `false` if `n` lies outside the recorded history.
pub fn goto_face_count(poly: &mut Polytope, n: usize) -> bool {
    poly.goto_face_count(n).is_ok()
}

pub fn goto_error(poly: &mut Polytope, relative_error: f64) -> bool {
    poly.goto_error(relative_error).is_ok()
}

#[inline]
pub fn export_convex_data(poly: &Polytope) -> ConvexData {
    poly.to_convex_data()
}

/// Hull, decimate and stop at the requested face count or error; `None` for
/// both keeps the fully decimated state.
pub fn run(
    points: &[Vec3],
    cfg: &PipelineCfg,
    faces: Option<usize>,
    error: Option<f64>,
) -> Result<ConvexData> {
    let hull = build_convex_hull(points, &cfg.hull)?;
    let mut poly = simplify_default(hull, &cfg.simplify)?;
    if let Some(n) = faces {
        poly.goto_face_count(n)?;
    } else if let Some(e) = error {
        poly.goto_error(e)?;
    }
    Ok(poly.to_convex_data())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Vec<Vec3> {
        (0..8)
            .map(|i| Vec3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
            .collect()
    }

    fn icosahedron() -> Vec<Vec3> {
        let phi = (1.0 + 5f64.sqrt()) / 2.0;
        let mut v = Vec::new();
        for a in [-1.0, 1.0] {
            for b in [-phi, phi] {
                v.push(Vec3::new(0.0, a, b) * 0.05);
                v.push(Vec3::new(a, b, 0.0) * 0.05);
                v.push(Vec3::new(b, 0.0, a) * 0.05);
            }
        }
        v
    }

    #[test]
    fn identical_points_fail_before_wrapping() {
        let pts = vec![Vec3::new(1.0, 2.0, 3.0); 10];
        assert!(matches!(
            build_convex_hull(&pts, &HullCfg::default()),
            Err(ConvexError::TooFewPoints { found: 1, needed: 3 })
        ));
        let mut pts = cube_with_extras();
        pts[2].y = f64::NAN;
        assert!(matches!(
            build_convex_hull(&pts, &HullCfg::default()),
            Err(ConvexError::Degenerate { .. })
        ));
    }

    fn cube_with_extras() -> Vec<Vec3> {
        let mut pts = cube();
        pts.push(Vec3::repeat(0.5));
        pts.push(Vec3::new(1.0 + 1e-5, 1.0, 1.0));
        pts
    }

    #[test]
    fn cube_survives_the_whole_pipeline() {
        let hull = build_convex_hull(&cube_with_extras(), &HullCfg::default()).unwrap();
        let poly = simplify_default(hull, &SimplifyCfg::default()).unwrap();
        assert_eq!(poly.face_count(), 6);
        assert!((poly.error_scale() - 3f64.sqrt()).abs() < 1e-9);
        let cd = export_convex_data(&poly);
        assert_eq!((cd.vertex_count(), cd.face_count()), (8, 6));
        assert!(cd.is_valid());
    }

    #[test]
    fn icosahedron_reaches_six_faces() {
        let hull = build_convex_hull(&icosahedron(), &HullCfg::default()).unwrap();
        let mut poly = simplify(hull, 1.0, &SimplifyCfg::default()).unwrap();
        assert!(goto_face_count(&mut poly, 6));
        assert_eq!(poly.face_count(), 6);
        assert!(!goto_face_count(&mut poly, 3));
        assert!(goto_face_count(&mut poly, 20));
        assert!(goto_error(&mut poly, 1e9));
        assert_eq!(poly.face_count(), 5);
        assert!(goto_face_count(&mut poly, 6));

        let cd = export_convex_data(&poly);
        assert_eq!(cd.face_count(), 6);
        for v in &icosahedron() {
            assert!(cd.contains(v, 1e-9));
        }
    }

    #[test]
    fn planar_cloud_becomes_prism() {
        let pts: Vec<Vec3> = (0..12)
            .map(|i| {
                let t = i as f64 * std::f64::consts::TAU / 12.0;
                Vec3::new(t.cos(), 0.3 * t.sin(), t.sin())
            })
            .collect();
        let hull = build_convex_hull_2d(&pts, &Hull2dCfg::default()).unwrap();
        assert!(hull.hull_is_2d);
        assert!(hull.vertices.iter().all(|v| v.y == 0.0));
        let poly = simplify(hull, 1.0, &SimplifyCfg::default()).unwrap();
        assert!(poly.is_prism());
        assert_eq!(poly.face_count(), 14);
        assert!(poly.is_closed());
    }

    #[test]
    fn run_honors_face_target() {
        let cfg = PipelineCfg::default();
        let cd = run(&icosahedron(), &cfg, Some(12), None).unwrap();
        assert_eq!(cd.face_count(), 12);
        assert!(run(&icosahedron(), &cfg, Some(2), None).is_err());
        let full = run(&icosahedron(), &cfg, None, None).unwrap();
        assert_eq!(full.face_count(), 5);
    }

    #[test]
    fn partial_json_config_uses_defaults() {
        let cfg: PipelineCfg =
            serde_json::from_str(r#"{ "simplify": { "accept_below": 0.05 } }"#).unwrap();
        assert_eq!(cfg.simplify.accept_below, 0.05);
        assert_eq!(cfg.simplify.min_face_count, 4);
        assert_eq!(cfg.hull, HullCfg::default());
    }
}

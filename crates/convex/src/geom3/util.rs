//! Input hygiene for point clouds: dedup, finiteness, collinearity.

use super::cfg::COLLINEAR_EPS;
use super::types::{normalize_or_zero, Vec3};

/// Keep the first of every cluster of points closer than `eps` to an earlier
/// survivor. Order of survivors follows the input.
pub fn dedup_points(pts: &[Vec3], eps: f64) -> Vec<Vec3> {
    let eps2 = eps * eps;
    let mut out: Vec<Vec3> = Vec::with_capacity(pts.len());
    for p in pts {
        if out.iter().all(|q| (p - q).norm_squared() >= eps2) {
            out.push(*p);
        }
    }
    out
}

#[inline]
pub fn all_finite(pts: &[Vec3]) -> bool {
    pts.iter().all(|p| p.iter().all(|c| c.is_finite()))
}

/// True if every point lies on the line through the first two distinct points
/// (directions within `COLLINEAR_EPS` of parallel). Fewer than three points
/// are trivially collinear.
pub fn is_collinear(pts: &[Vec3]) -> bool {
    let Some(a) = pts.first() else {
        return true;
    };
    let Some(dir) = pts
        .iter()
        .map(|p| normalize_or_zero(p - a))
        .find(|d| d.norm_squared() > 0.0)
    else {
        return true;
    };
    pts.iter().all(|p| {
        let d = normalize_or_zero(p - a);
        d.norm_squared() == 0.0 || 1.0 - d.dot(&dir).abs() < COLLINEAR_EPS
    })
}

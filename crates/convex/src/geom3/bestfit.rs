//! Least-squares plane through a point set.
//!
//! The normal is the eigenvector of the smallest eigenvalue of the covariance
//! about the centroid (`nalgebra::SymmetricEigen`); the offset passes through
//! the centroid.

use nalgebra::{Matrix3, SymmetricEigen};

use super::types::{normalize_or_zero, HalfSpace, Vec3};

/// Best-fit plane and the largest absolute distance of any input point to it.
#[derive(Clone, Copy, Debug)]
pub struct PlaneFit {
    pub plane: HalfSpace,
    pub max_dist: f64,
}

impl PlaneFit {
    #[inline]
    pub fn fits(&self, max_err: f64) -> bool {
        self.max_dist <= max_err
    }
}

/// Fit a plane to `pts`. Returns `None` for an empty slice.
///
/// For collinear or coincident input the covariance has a repeated smallest
/// eigenvalue and the returned normal is one arbitrary member of the pencil.
pub fn best_fit_plane(pts: &[Vec3]) -> Option<PlaneFit> {
    if pts.is_empty() {
        return None;
    }
    let inv = 1.0 / pts.len() as f64;
    let centroid = pts.iter().fold(Vec3::zeros(), |acc, p| acc + p) * inv;
    let mut cov = Matrix3::zeros();
    for p in pts {
        let d = p - centroid;
        cov += d * d.transpose() * inv;
    }
    let eig = SymmetricEigen::new(cov);
    let mut k = 0;
    for i in 1..3 {
        if eig.eigenvalues[i] < eig.eigenvalues[k] {
            k = i;
        }
    }
    let n = normalize_or_zero(eig.eigenvectors.column(k).into_owned());
    let plane = HalfSpace::new(n, n.dot(&centroid));
    let max_dist = pts
        .iter()
        .map(|p| plane.distance(p).abs())
        .fold(0.0, f64::max);
    Some(PlaneFit { plane, max_dist })
}

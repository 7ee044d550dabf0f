//! Basic 3D types: oriented half-spaces, segment hits, mirror modes.
//!
//! - `HalfSpace`: plane `n·x = d` with unit `n`; `n·x < d` is inside.
//! - `SegmentHit`: result of clipping a segment against a plane.
//! - `Mirror`: axis reflections and axis swaps applied to exported hulls.

use nalgebra::{Similarity3, Vector3};
use serde::{Deserialize, Serialize};

use super::cfg::NORMAL_EPS;

/// 3D vector alias used throughout the kernel.
pub type Vec3 = Vector3<f64>;

/// Oriented plane `n · x = d`; the side `n · x < d` is inside.
///
/// Invariants:
/// - `n` is unit length, or zero for a degenerate construction.
/// - Exactly one of `inside/outside/on_plane` holds for any point and `eps >= 0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HalfSpace {
    pub n: Vec3,
    pub d: f64,
}

impl Default for HalfSpace {
    fn default() -> Self {
        Self {
            n: Vec3::y(),
            d: 0.0,
        }
    }
}

impl HalfSpace {
    #[inline]
    pub fn new(n: Vec3, d: f64) -> Self {
        Self { n, d }
    }

    /// Plane through three points; normal follows `(v2 - v1) × (v3 - v1)`.
    #[inline]
    pub fn from_points(v1: &Vec3, v2: &Vec3, v3: &Vec3) -> Self {
        let n = normalize_or_zero((v2 - v1).cross(&(v3 - v1)));
        Self { n, d: n.dot(v1) }
    }

    /// Plane with (normalized) normal `n` through point `p`.
    #[inline]
    pub fn from_normal_point(n: &Vec3, p: &Vec3) -> Self {
        let n = normalize_or_zero(*n);
        Self { n, d: n.dot(p) }
    }

    #[inline]
    pub fn distance(&self, p: &Vec3) -> f64 {
        self.n.dot(p) - self.d
    }
    #[inline]
    pub fn inside(&self, p: &Vec3, eps: f64) -> bool {
        self.distance(p) < -eps
    }
    #[inline]
    pub fn outside(&self, p: &Vec3, eps: f64) -> bool {
        self.distance(p) > eps
    }
    #[inline]
    pub fn on_plane(&self, p: &Vec3, eps: f64) -> bool {
        self.distance(p).abs() <= eps
    }

    /// Shift the plane along its normal (positive grows the inside).
    #[inline]
    pub fn translate(&mut self, delta: f64) {
        self.d += delta;
    }

    /// Flip inside and outside.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            n: -self.n,
            d: -self.d,
        }
    }

    /// Orthogonal projection of `p` onto the plane.
    #[inline]
    pub fn project(&self, p: &Vec3) -> Vec3 {
        p - self.n * self.distance(p)
    }

    /// Clip segment `v1 → v2` against the plane under band `eps`.
    pub fn intersect_segment(&self, v1: &Vec3, v2: &Vec3, eps: f64) -> SegmentHit {
        let on1 = self.on_plane(v1, eps);
        let on2 = self.on_plane(v2, eps);
        match (on1, on2) {
            (true, true) => return SegmentHit::BothOnPlane,
            (true, false) => return SegmentHit::V1OnPlane,
            (false, true) => return SegmentHit::V2OnPlane,
            _ => {}
        }
        if self.outside(v1, eps) == self.outside(v2, eps) {
            return SegmentHit::NoHit;
        }
        let dir = v2 - v1;
        let t = (self.d - self.n.dot(v1)) / self.n.dot(&dir);
        SegmentHit::Hit(v1 + dir * t)
    }

    /// Apply a uniform-scale similarity: `n' = R n`, `d' = s d + n'·t`.
    pub fn transform(&mut self, sim: &Similarity3<f64>) {
        let n = normalize_or_zero(sim.isometry.rotation * self.n);
        let t = sim.isometry.translation.vector;
        self.d = sim.scaling() * self.d + n.dot(&t);
        self.n = n;
    }

    /// Mirror the normal; the offset is unchanged because mirrored points
    /// keep their dot product with the mirrored normal.
    #[inline]
    pub fn mirror(&mut self, m: Mirror) {
        self.n = m.apply(&self.n);
    }
}

/// Outcome of `HalfSpace::intersect_segment`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentHit {
    NoHit,
    V1OnPlane,
    V2OnPlane,
    BothOnPlane,
    Hit(Vec3),
}

/// Reflection across a coordinate plane (`X`, `Y`, `Z`) or swap of two axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mirror {
    X,
    Y,
    Z,
    XY,
    YZ,
    XZ,
}

impl Mirror {
    #[inline]
    pub fn apply(self, v: &Vec3) -> Vec3 {
        match self {
            Mirror::X => Vec3::new(-v.x, v.y, v.z),
            Mirror::Y => Vec3::new(v.x, -v.y, v.z),
            Mirror::Z => Vec3::new(v.x, v.y, -v.z),
            Mirror::XY => Vec3::new(v.y, v.x, v.z),
            Mirror::YZ => Vec3::new(v.x, v.z, v.y),
            Mirror::XZ => Vec3::new(v.z, v.y, v.x),
        }
    }
}

/// Unit vector along `v`, or zero if `|v| <= NORMAL_EPS`.
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len = v.norm();
    if len <= NORMAL_EPS {
        Vec3::zeros()
    } else {
        v / len
    }
}

//! Seeded 3D point-cloud samplers.
//!
//! Purpose
//! - Reproducible clouds for hull tests, benches and the CLI `sample` command.
//!
//! Model
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG,
//!   so a stream of clouds can be regenerated one draw at a time.
//!
//! References
//! - Code cross-refs: `hull::GiftWrap`, `pipeline::build_convex_hull`

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geom3::Vec3;

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    /// Token for the next draw in the same stream.
    #[inline]
    pub fn next(self) -> Self {
        Self {
            index: self.index.wrapping_add(1),
            ..self
        }
    }

    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Cloud shapes understood by the samplers and the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Sphere,
    Ball,
    Box,
}

/// Draw `count` points of `shape` with size `r` (radius or half extent).
pub fn sample(shape: Shape, count: usize, r: f64, token: ReplayToken) -> Vec<Vec3> {
    match shape {
        Shape::Sphere => sphere_points(count, r, token),
        Shape::Ball => ball_points(count, r, token),
        Shape::Box => box_points(count, Vec3::repeat(r), token),
    }
}

/// Uniform on the sphere of `radius` about the origin.
pub fn sphere_points(count: usize, radius: f64, token: ReplayToken) -> Vec<Vec3> {
    let mut rng = token.to_std_rng();
    (0..count)
        .map(|_| unit_vector(&mut rng) * radius)
        .collect()
}

/// Uniform in the closed ball of `radius` (cube-root radial law).
pub fn ball_points(count: usize, radius: f64, token: ReplayToken) -> Vec<Vec3> {
    let mut rng = token.to_std_rng();
    (0..count)
        .map(|_| {
            let u: f64 = rng.gen_range(0.0..=1.0);
            unit_vector(&mut rng) * (radius * u.cbrt())
        })
        .collect()
}

/// Uniform in the box `[-half, half]` per axis.
pub fn box_points(count: usize, half: Vec3, token: ReplayToken) -> Vec<Vec3> {
    let mut rng = token.to_std_rng();
    (0..count)
        .map(|_| {
            Vector3::new(
                rng.gen_range(-1.0..=1.0) * half.x,
                rng.gen_range(-1.0..=1.0) * half.y,
                rng.gen_range(-1.0..=1.0) * half.z,
            )
        })
        .collect()
}

fn unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vector3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let n2: f64 = v.norm_squared();
        // Rejection inside the unit ball keeps the direction uniform.
        if n2 > 1e-12 && n2 <= 1.0 {
            return v / n2.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_token_replays_same_cloud() {
        let t = ReplayToken::new(42, 3);
        assert_eq!(sphere_points(16, 1.0, t), sphere_points(16, 1.0, t));
        assert_ne!(sphere_points(16, 1.0, t), sphere_points(16, 1.0, t.next()));
    }

    #[test]
    fn samplers_respect_their_bounds() {
        let t = ReplayToken::new(7, 0);
        for p in sphere_points(64, 2.0, t) {
            assert!((p.norm() - 2.0).abs() < 1e-12);
        }
        for p in ball_points(64, 2.0, t) {
            assert!(p.norm() <= 2.0 + 1e-12);
        }
        let half = Vec3::new(1.0, 0.5, 0.25);
        for p in box_points(64, half, t) {
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 0.5 && p.z.abs() <= 0.25);
        }
        assert_eq!(sample(Shape::Ball, 5, 1.0, t).len(), 5);
    }
}

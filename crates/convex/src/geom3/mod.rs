//! 3D plane and linear-algebra primitives.
//!
//! Purpose
//! - Provide the oriented `HalfSpace` with explicit-tolerance classification,
//!   a full-pivot Gaussian solver for plane triples, lazy combinations, and a
//!   best-fit plane. Hull construction and face removal both build on these.
//!
//! Why explicit tolerances
//! - Every predicate takes its band as an argument. A hull attempt owns its
//!   current band, so retries and concurrent builds never share mutable state.
//!
//! References
//! - Code cross-refs: `hull::GiftWrap`, `polytope::Polytope`, `convex_data::CovFace`

pub mod aabb;
pub mod bestfit;
pub(crate) mod cfg;
pub mod comb;
mod solvers;
mod types;
mod util;

pub use aabb::Aabb;
pub use bestfit::{best_fit_plane, PlaneFit};
pub use cfg::DIST_EPS;
pub use comb::{triples, CombGenerator};
pub use solvers::{intersect_planes, solve_full_pivot};
pub use types::{normalize_or_zero, HalfSpace, Mirror, SegmentHit, Vec3};
pub use util::{all_finite, dedup_points, is_collinear};

#[cfg(test)]
mod tests;

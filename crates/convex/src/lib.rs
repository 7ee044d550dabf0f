//! Convex proxy kernel: gift-wrap hulls, greedy face decimation, and the
//! exported `ConvexData` used by collision code.
//!
//! Pipeline
//! - `pipeline::build_convex_hull` wraps a point cloud (`hull::GiftWrap`).
//! - `pipeline::simplify` turns the hull into a `polytope::Polytope` and
//!   removes least-error faces while recording history.
//! - `pipeline::export_convex_data` copies the chosen state out.
//!
//! API Policy
//! - `api` is the curated surface for callers; module paths may move.

pub mod api;
pub mod convex_data;
pub mod error;
pub mod geom3;
pub mod hull;
pub mod pipeline;
pub mod polytope;
pub mod rand3;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{ConvexError, Result};
pub use geom3::Vec3;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::convex_data::{ConvexData, CovFace};
    pub use crate::geom3::{HalfSpace, Mirror, Vec3};
    pub use crate::hull::{HullCfg, HullResult};
    pub use crate::pipeline::{
        build_convex_hull, export_convex_data, simplify, simplify_default, PipelineCfg,
    };
    pub use crate::polytope::{Polytope, SimplifyCfg};
}

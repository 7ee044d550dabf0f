//! Curated re-exports for callers of the kernel (unstable).
//!
//! Prefer these over deep module paths so internal moves stay cheap.

// Primitives
pub use crate::geom3::{
    best_fit_plane, dedup_points, intersect_planes, solve_full_pivot, triples, Aabb,
    CombGenerator, HalfSpace, Mirror, PlaneFit, SegmentHit, Vec3, DIST_EPS,
};
// Hull construction
pub use crate::hull::{build_planar, GiftWrap, Hull2dCfg, HullCfg, HullResult, Phase, RetrySchedule};
// Decimation
pub use crate::polytope::{FaceView, Patch, PatchId, Polytope, SimplifyCfg};
// Export
pub use crate::convex_data::{
    ConvexData, CovFace, BAD_FIT, BLOCK_NPC, SKIP_CAM_TRACE, SKIP_MOVE_TRACE, SKIP_RAY_TRACE,
};
// Pipeline
pub use crate::pipeline::{
    build_convex_hull, build_convex_hull_2d, export_convex_data, goto_error, goto_face_count, run,
    simplify, simplify_default, PipelineCfg,
};
// Sampling
pub use crate::rand3::{ball_points, box_points, sample, sphere_points, ReplayToken, Shape};
// Errors
pub use crate::error::{ConvexError, Result};

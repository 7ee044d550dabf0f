//! Tolerance defaults for 3D convex geometry (internal).
//!
//! Policy
//! - Fixed constants live here; knobs a caller may want to tune travel in
//!   `HullCfg` / `SimplifyCfg` instead. No tolerance is process-global: the
//!   classification band is always an explicit `eps` argument.

/// Default on-plane band for classification outside of hull retries.
pub const DIST_EPS: f64 = 1e-5;
/// Cross-product length under which a plane normal is treated as zero.
pub(crate) const NORMAL_EPS: f64 = 1e-10;
/// Coplanar groups must stay within this band of their own plane.
pub(crate) const VALID_TOLERANCE: f64 = 0.03;
/// `1 - |cos|` under which two directions count as collinear.
pub(crate) const COLLINEAR_EPS: f64 = 6e-5;
/// Sentinel for "no least-error face yet".
pub(crate) const MAX_ERROR: f64 = 1e8;
/// Consecutive edge normals with a dot below this get a bevel plane.
pub(crate) const ACUTE_THRESH: f64 = 0.0;
/// Exported coordinates must stay within `±VERT_VALUE_MAX`.
pub(crate) const VERT_VALUE_MAX: f64 = 1e5;
/// Padding applied to exported bounding boxes.
pub(crate) const AABB_PAD: f64 = 1e-4;
/// Starting distance for nearest-boundary searches.
pub(crate) const NEAREST_START: f64 = 1000.0;

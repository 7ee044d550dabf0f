//! Planar hull variant: drop every point's elevation (`y`) to zero and wrap
//! the result as a single polygon.
//!
//! Callers wanting a solid extrude the polygon (`polytope::Polytope::from_hull`).

use serde::{Deserialize, Serialize};

use super::{GiftWrap, HullCfg, HullResult, Phase};
use crate::error::{ConvexError, Result};
use crate::geom3::Vec3;

/// Shrinking-eps schedule for the planar variant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hull2dCfg {
    pub identical_eps: f64,
    pub start_eps: f64,
    pub shrink: f64,
    pub floor: f64,
}

impl Default for Hull2dCfg {
    fn default() -> Self {
        Self {
            identical_eps: 0.01,
            start_eps: 0.01,
            shrink: 0.1,
            floor: 5e-7,
        }
    }
}

/// Wrap the `xz` shadow of `pts`. Points are flattened in the result.
pub fn build_planar(pts: &[Vec3], cfg: &Hull2dCfg) -> Result<HullResult> {
    let flat: Vec<Vec3> = pts.iter().map(|p| Vec3::new(p.x, 0.0, p.z)).collect();
    let hull_cfg = HullCfg {
        identical_eps: cfg.identical_eps,
        ..HullCfg::default()
    };
    let mut gw = GiftWrap::new(flat, hull_cfg)?;
    let shrink = cfg.shrink.clamp(1e-6, 0.999);

    let mut eps = cfg.start_eps;
    loop {
        gw.attempts += 1;
        gw.reset_attempt(cfg.identical_eps, eps);
        let e = gw.search_first_edge(&Vec3::y());
        if e.start == e.end {
            gw.exception = true;
        } else {
            gw.deal_edge(e);
        }
        let ok = !gw.exception && gw.groups.len() == 1 && gw.groups_are_planar();
        tracing::debug!(attempt = gw.attempts, eps, ok, "planar hull attempt");
        if ok {
            gw.is_2d = true;
            gw.phase = Phase::Done;
            return gw.into_result();
        }
        if eps <= cfg.floor {
            break;
        }
        eps *= shrink;
    }
    tracing::warn!(attempts = gw.attempts, "planar hull failed");
    Err(ConvexError::degenerate(format!(
        "planar hull failed after {} attempts",
        gw.attempts
    )))
}

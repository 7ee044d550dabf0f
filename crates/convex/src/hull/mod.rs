//! Gift-wrap convex hull over a 3D point cloud.
//!
//! Purpose
//! - Grow the hull edge by edge from a guaranteed-boundary seed edge. Each
//!   popped edge picks the point whose plane through the edge keeps every
//!   other valid point inside. Ties on that plane form a coplanar group that
//!   is walked into an ordered polygon.
//! - Planar input is detected on the first expansion and reported as a 2D
//!   hull with a single polygon group.
//!
//! Why this design
//! - Classification is eps-sensitive and success is not monotone in eps, so
//!   every attempt runs from scratch under a `RetrySchedule` of
//!   (identical-position eps, plane eps) pairs until the result validates.
//!   The schedule is a finite list; there is no recursion and no unbounded loop.
//! - The builder is an explicit state machine (`start/step/is_done`) so callers
//!   and tests can drive or inspect it incrementally; `compute` runs it to the end.
//!
//! References
//! - Code cross-refs: `geom3::HalfSpace`, `geom3::best_fit_plane`,
//!   `polytope::Polytope::from_hull`

mod coplanar;
mod edge;
pub mod hull2d;
mod seed;

pub use edge::{Edge, EdgeStack, TriFace};
pub use hull2d::{build_planar, Hull2dCfg};

use serde::{Deserialize, Serialize};

use crate::error::{ConvexError, Result};
use crate::geom3::cfg::VALID_TOLERANCE;
use crate::geom3::{all_finite, best_fit_plane, is_collinear, HalfSpace, Vec3};

/// Retry schedule for eps-sensitive hull attempts.
///
/// Attempts are generated as: for each identical-position eps
/// `identical_eps * 0.1^k` (`k < identical_steps`), for each base
/// `base - base_step * o` (`o < outer_steps`), shrink the plane eps by
/// `shrink` before every attempt until it is at or below `floor`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySchedule {
    pub identical_steps: usize,
    pub outer_steps: usize,
    pub base: f64,
    pub base_step: f64,
    pub shrink: f64,
    pub floor: f64,
    /// Cap on edge pops within one attempt.
    pub max_steps: usize,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            identical_steps: 4,
            outer_steps: 10,
            base: 0.1,
            base_step: 0.01,
            shrink: 0.1,
            floor: 2e-7,
            max_steps: 1_000_000,
        }
    }
}

impl RetrySchedule {
    /// Ordered `(identical_eps, dist_eps)` pairs to try.
    pub fn plan(&self, identical_eps: f64) -> Vec<(f64, f64)> {
        let mut out = Vec::new();
        let shrink = self.shrink.clamp(1e-6, 0.999);
        let mut idp = identical_eps;
        for _ in 0..self.identical_steps {
            for o in 0..self.outer_steps {
                let base = self.base - self.base_step * o as f64;
                if base <= 0.0 {
                    break;
                }
                let mut t = base;
                loop {
                    t *= shrink;
                    out.push((idp, t));
                    if t <= self.floor {
                        break;
                    }
                }
            }
            idp *= 0.1;
        }
        out
    }
}

/// Hull construction knobs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullCfg {
    /// Starting eps for "same height" ties in the seed search.
    pub identical_eps: f64,
    /// Input points closer than this are merged before building.
    pub dedup_eps: f64,
    pub retry: RetrySchedule,
}

impl Default for HullCfg {
    fn default() -> Self {
        Self {
            identical_eps: 0.01,
            dedup_eps: 1e-3,
            retry: RetrySchedule::default(),
        }
    }
}

/// Builder state; see `GiftWrap::step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    SeedSearch,
    Expanding,
    DegenerateRetry,
    Done,
    Failed,
}

/// Output of a successful build.
#[derive(Clone, Debug)]
pub struct HullResult {
    pub vertices: Vec<Vec3>,
    /// Triangles in emission order, including `in_polygon` fan triangles.
    pub faces: Vec<TriFace>,
    /// Coplanar groups as ordered boundary cycles.
    pub groups: Vec<Vec<usize>>,
    /// `true` for points on the hull boundary.
    pub extreme: Vec<bool>,
    pub hull_is_2d: bool,
    pub attempts: usize,
    pub identical_eps: f64,
    pub dist_eps: f64,
}

impl HullResult {
    /// Triangles that are genuine hull faces (not polygon fans).
    pub fn boundary_triangles(&self) -> impl Iterator<Item = &TriFace> + '_ {
        self.faces.iter().filter(|f| !f.in_polygon)
    }

    #[inline]
    pub fn extreme_count(&self) -> usize {
        self.extreme.iter().filter(|e| **e).count()
    }

    /// Number of polytope faces: genuine triangles plus polygon groups.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.boundary_triangles().count() + self.groups.len()
    }
}

/// Incremental gift-wrap builder.
#[derive(Clone, Debug)]
pub struct GiftWrap {
    pts: Vec<Vec3>,
    cfg: HullCfg,
    fit_normal: Vec3,
    plan: Vec<(f64, f64)>,
    next_try: usize,
    phase: Phase,
    attempts: usize,
    // Per-attempt state.
    identical_eps: f64,
    dist_eps: f64,
    invalid: Vec<bool>,
    extreme: Vec<bool>,
    faces: Vec<TriFace>,
    groups: Vec<Vec<usize>>,
    stack: EdgeStack,
    exception: bool,
    is_2d: bool,
    steps: usize,
}

impl GiftWrap {
    /// New builder over `pts` (used as given; see `geom3::dedup_points`).
    pub fn new(pts: Vec<Vec3>, cfg: HullCfg) -> Result<Self> {
        if pts.len() < 3 {
            return Err(ConvexError::TooFewPoints {
                found: pts.len(),
                needed: 3,
            });
        }
        if !all_finite(&pts) {
            return Err(ConvexError::degenerate("non-finite input coordinate"));
        }
        if is_collinear(&pts) {
            return Err(ConvexError::degenerate("all points are collinear"));
        }
        let fit_normal = best_fit_plane(&pts)
            .map(|f| f.plane.n)
            .filter(|n| n.norm_squared() > 0.0)
            .unwrap_or_else(Vec3::y);
        let n = pts.len();
        Ok(Self {
            plan: cfg.retry.plan(cfg.identical_eps),
            pts,
            cfg,
            fit_normal,
            next_try: 0,
            phase: Phase::Idle,
            attempts: 0,
            identical_eps: cfg.identical_eps,
            dist_eps: cfg.retry.base,
            invalid: vec![false; n],
            extreme: vec![false; n],
            faces: Vec::new(),
            groups: Vec::new(),
            stack: EdgeStack::default(),
            exception: false,
            is_2d: false,
            steps: 0,
        })
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done | Phase::Failed)
    }

    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.pts
    }

    #[inline]
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Current plane-classification band.
    #[inline]
    pub fn dist_eps(&self) -> f64 {
        self.dist_eps
    }

    /// Open edges left in the current attempt.
    #[inline]
    pub fn open_edges(&self) -> usize {
        self.stack.len()
    }

    /// Restart from the first scheduled attempt.
    pub fn start(&mut self) {
        self.next_try = 0;
        self.attempts = 0;
        self.begin_next_attempt();
    }

    /// Advance the state machine by one unit of work.
    pub fn step(&mut self) {
        match self.phase {
            Phase::Idle => self.start(),
            Phase::SeedSearch => self.seed(),
            Phase::Expanding => {
                let stop = self.stack.is_empty()
                    || self.exception
                    || self.is_2d
                    || self.steps >= self.cfg.retry.max_steps;
                if stop {
                    if self.steps >= self.cfg.retry.max_steps && !self.stack.is_empty() {
                        self.exception = true;
                    }
                    self.finish_attempt();
                } else if let Some(e) = self.stack.pop() {
                    self.steps += 1;
                    self.deal_edge(e);
                }
            }
            Phase::DegenerateRetry => self.begin_next_attempt(),
            Phase::Done | Phase::Failed => {}
        }
    }

    /// Run to completion and hand out the result.
    pub fn compute(mut self) -> Result<HullResult> {
        if self.phase == Phase::Idle {
            self.start();
        }
        while !self.is_done() {
            self.step();
        }
        self.into_result()
    }

    /// Consume a finished builder.
    pub fn into_result(self) -> Result<HullResult> {
        match self.phase {
            Phase::Done => Ok(HullResult {
                vertices: self.pts,
                faces: self.faces,
                groups: self.groups,
                extreme: self.extreme,
                hull_is_2d: self.is_2d,
                attempts: self.attempts,
                identical_eps: self.identical_eps,
                dist_eps: self.dist_eps,
            }),
            Phase::Failed => Err(ConvexError::degenerate(format!(
                "no valid hull after {} attempts",
                self.attempts
            ))),
            other => Err(ConvexError::degenerate(format!(
                "builder not finished (phase {other:?})"
            ))),
        }
    }

    fn begin_next_attempt(&mut self) {
        let Some(&(idp, eps)) = self.plan.get(self.next_try) else {
            tracing::warn!(attempts = self.attempts, "hull retry schedule exhausted");
            self.phase = Phase::Failed;
            return;
        };
        self.next_try += 1;
        self.attempts += 1;
        self.reset_attempt(idp, eps);
        self.phase = Phase::SeedSearch;
    }

    pub(crate) fn reset_attempt(&mut self, identical_eps: f64, dist_eps: f64) {
        let n = self.pts.len();
        self.identical_eps = identical_eps;
        self.dist_eps = dist_eps;
        self.invalid.clear();
        self.invalid.resize(n, false);
        self.extreme.clear();
        self.extreme.resize(n, false);
        self.faces.clear();
        self.groups.clear();
        self.stack.clear();
        self.exception = false;
        self.is_2d = false;
        self.steps = 0;
    }

    fn seed(&mut self) {
        let fit = self.fit_normal;
        let mut e = self.search_first_edge(&fit);
        if !self.validate_seed_plane(&e, &fit) {
            for axis in [Vec3::x(), Vec3::y(), Vec3::z()] {
                if fit.dot(&axis).abs() > 0.9 {
                    continue;
                }
                let vn = fit.cross(&axis);
                let e1 = self.search_first_edge(&vn);
                if self.validate_seed_plane(&e1, &vn) {
                    e = e1;
                    break;
                }
            }
        }
        if e.start == e.end {
            self.exception = true;
        }
        // Twice: the first pop handles one side, the copy stays for the other.
        self.stack.push(e);
        self.stack.push(e);
        self.phase = Phase::Expanding;
    }

    fn finish_attempt(&mut self) {
        let ok = !self.exception && self.groups_are_planar();
        tracing::debug!(
            attempt = self.attempts,
            identical_eps = self.identical_eps,
            dist_eps = self.dist_eps,
            steps = self.steps,
            ok,
            "hull attempt"
        );
        if ok {
            tracing::info!(
                points = self.pts.len(),
                triangles = self.faces.iter().filter(|f| !f.in_polygon).count(),
                groups = self.groups.len(),
                planar = self.is_2d,
                attempts = self.attempts,
                "hull accepted"
            );
            self.phase = Phase::Done;
        } else {
            self.phase = Phase::DegenerateRetry;
        }
    }

    /// Every point inside or on the plane through `e` spanned with `dir`.
    fn validate_seed_plane(&self, e: &Edge, dir: &Vec3) -> bool {
        let s = self.pts[e.start];
        let hs = HalfSpace::from_points(&s, &self.pts[e.end], &(s + dir));
        self.pts.iter().all(|p| !hs.outside(p, self.dist_eps))
    }

    /// Each coplanar group stays within `VALID_TOLERANCE` of the plane through
    /// its first three members.
    pub(crate) fn groups_are_planar(&self) -> bool {
        self.groups.iter().filter(|g| g.len() >= 3).all(|g| {
            let hs = HalfSpace::from_points(&self.pts[g[0]], &self.pts[g[1]], &self.pts[g[2]]);
            g[3..]
                .iter()
                .all(|&i| hs.distance(&self.pts[i]).abs() <= VALID_TOLERANCE)
        })
    }

    fn face_in_groups(&self, a: usize, b: usize, c: usize) -> bool {
        self.groups
            .iter()
            .any(|g| g.contains(&a) && g.contains(&b) && g.contains(&c))
    }

    fn edge_in_hull(&self, e: &Edge) -> bool {
        self.faces.iter().any(|f| e.in_face(f))
            || self
                .groups
                .iter()
                .any(|g| g.contains(&e.start) && g.contains(&e.end))
    }

    /// Queue `e`; an edge already covered by an emitted face would be its
    /// third visit, which flags the attempt.
    fn selective_push(&mut self, e: Edge) {
        if self.stack.push_or_cancel(e) && self.edge_in_hull(&e) {
            self.exception = true;
            self.stack.pop();
        }
    }

    fn candidate(&self, e: &Edge, i: usize) -> bool {
        i != e.start && i != e.end && !self.invalid[i] && !self.face_in_groups(e.start, e.end, i)
    }

    pub(crate) fn deal_edge(&mut self, e: Edge) {
        let n = self.pts.len();
        let Some(first) = (0..n).find(|&i| self.candidate(&e, i)) else {
            self.exception = true;
            return;
        };
        let (ps, pe) = (self.pts[e.start], self.pts[e.end]);
        let eps = self.dist_eps;
        let mut hs = HalfSpace::from_points(&ps, &pe, &self.pts[first]);
        let mut cop = vec![first];
        for i in first + 1..n {
            if !self.candidate(&e, i) || hs.inside(&self.pts[i], eps) {
                continue;
            }
            if hs.on_plane(&self.pts[i], eps) {
                cop.push(i);
            } else {
                hs = HalfSpace::from_points(&ps, &pe, &self.pts[i]);
                cop.clear();
                cop.push(i);
            }
        }

        // Planar input: every remaining valid point lies on the winning plane.
        let plane = HalfSpace::from_points(&ps, &pe, &self.pts[cop[0]]);
        self.is_2d = true;
        for i in 0..n {
            if i == e.start || i == e.end || self.invalid[i] || cop.contains(&i) {
                continue;
            }
            if plane.on_plane(&self.pts[i], eps) {
                cop.push(i);
            } else {
                self.is_2d = false;
                break;
            }
        }

        if cop.len() == 1 {
            let v3 = cop[0];
            self.selective_push(Edge::new(e.start, v3));
            self.selective_push(Edge::new(v3, e.end));
            self.faces.push(TriFace::new(e.start, e.end, v3, false));
            for v in [e.start, e.end, v3] {
                self.extreme[v] = true;
            }
            if self.is_2d {
                self.groups.push(vec![v3, e.start, e.end]);
            }
        } else {
            self.deal_coplanar(e, cop);
        }
    }

    fn sort_by_dist(&self, from: usize, ids: &mut [usize]) {
        let o = self.pts[from];
        ids.sort_by(|a, b| {
            let da = (self.pts[*a] - o).norm_squared();
            let db = (self.pts[*b] - o).norm_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

#[cfg(test)]
mod tests;

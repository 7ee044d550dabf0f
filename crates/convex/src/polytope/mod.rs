//! Convex polytope simplifier: greedy least-error face removal with history.
//!
//! Purpose
//! - Turn a finished hull into a bounded-complexity convex proxy. Each step
//!   deletes the patch whose removal moves the boundary the least; the
//!   neighbors are extended to close the gap.
//! - Every removal is logged so callers can scrub between face counts
//!   (`undo/redo/goto_face_count/goto_error`) after one decimation pass.
//!
//! Why this design
//! - Patches live in an arena addressed by `PatchId`; neighbor links are ids,
//!   so removal and undo are slot writes rather than graph surgery.
//! - A removal is computed in full before anything is written. A topology
//!   failure leaves the previous state intact and raises `exception_occurred`.
//!
//! References
//! - Code cross-refs: `hull::HullResult`, `geom3::intersect_planes`,
//!   `convex_data::ConvexData`

mod build;
mod export;
mod history;
mod removal;
mod types;

pub use types::{Corner, Patch, PatchId, SimplifyCfg};

use std::collections::HashMap;

use crate::error::{ConvexError, Result};
use crate::geom3::cfg::MAX_ERROR;
use crate::geom3::{HalfSpace, Vec3};
use types::Removal;

/// Arena polytope with removal history. Built by `Polytope::from_hull`.
#[derive(Clone, Debug)]
pub struct Polytope {
    verts: Vec<Vec3>,
    /// Number of active patches using each vertex.
    degree: Vec<usize>,
    patches: Vec<Patch>,
    active: Vec<PatchId>,
    history: Vec<Removal>,
    cursor: usize,
    origin_face_count: usize,
    min_face_count_reached: usize,
    /// `errors_by_count[n]`: least removal error seen at `n` faces, over
    /// `error_scale`; `-1` where no removal was recorded.
    errors_by_count: Vec<f64>,
    error_scale: f64,
    cfg: SimplifyCfg,
    exception: bool,
    is_prism: bool,
}

/// Borrowed view of one active face.
#[derive(Clone, Copy, Debug)]
pub struct FaceView<'a> {
    pub id: PatchId,
    pub patch: &'a Patch,
    verts: &'a [Vec3],
}

impl<'a> FaceView<'a> {
    #[inline]
    pub fn plane(&self) -> &'a HalfSpace {
        &self.patch.plane
    }

    /// Boundary positions in ring order.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + 'a {
        let verts = self.verts;
        self.patch.ring.iter().map(move |c| verts[c.vid])
    }
}

impl Polytope {
    #[inline]
    pub fn cfg(&self) -> &SimplifyCfg {
        &self.cfg
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.active.len()
    }

    /// Vertices used by at least one active face.
    pub fn vertex_count(&self) -> usize {
        self.degree.iter().filter(|d| **d >= 3).count()
    }

    /// All vertex slots, including ones no active face uses any more.
    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.verts
    }

    #[inline]
    pub fn origin_face_count(&self) -> usize {
        self.origin_face_count
    }

    /// Face count where the last `reduce_all` stopped.
    #[inline]
    pub fn min_face_count_reached(&self) -> usize {
        self.min_face_count_reached
    }

    /// Number of applied removals.
    #[inline]
    pub fn current_step(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn errors_by_count(&self) -> &[f64] {
        &self.errors_by_count
    }

    #[inline]
    pub fn error_scale(&self) -> f64 {
        self.error_scale
    }

    #[inline]
    pub fn exception_occurred(&self) -> bool {
        self.exception
    }

    #[inline]
    pub fn is_prism(&self) -> bool {
        self.is_prism
    }

    #[inline]
    pub fn patch(&self, id: PatchId) -> &Patch {
        &self.patches[id.0]
    }

    pub fn faces(&self) -> impl Iterator<Item = FaceView<'_>> + '_ {
        self.active.iter().map(move |&id| FaceView {
            id,
            patch: &self.patches[id.0],
            verts: &self.verts,
        })
    }

    /// Cheapest removable face, if one is below `accept_below` and the
    /// polytope is above its face floor.
    pub fn least_error_face(&self) -> Option<PatchId> {
        let floor = if self.is_prism {
            self.origin_face_count
        } else {
            self.cfg.min_face_count
        };
        if self.active.len() <= floor {
            return None;
        }
        let mut best = None;
        let mut least = MAX_ERROR;
        for &id in &self.active {
            let e = self.patches[id.0].removal_error;
            if e >= 0.0 && e < least {
                least = e;
                best = Some(id);
            }
        }
        best.filter(|_| least < self.cfg.accept_below)
    }

    /// Remove least-error faces until none qualifies. Returns the number of
    /// removals; a topology failure raises the exception flag and stops.
    pub fn reduce_all(&mut self) -> Result<usize> {
        let mut removed = 0;
        let outcome = loop {
            let Some(id) = self.least_error_face() else {
                break Ok(removed);
            };
            let count = self.active.len();
            self.errors_by_count[count] = self.patches[id.0].removal_error / self.error_scale;
            if let Err(e) = self.remove_face(id) {
                self.exception = true;
                tracing::warn!(patch = id.0, faces = count, error = %e, "face removal failed");
                break Err(e);
            }
            removed += 1;
        };
        self.min_face_count_reached = self.active.len();
        if self.min_face_count_reached < 4 {
            self.exception = true;
            return Err(ConvexError::topology(format!(
                "decimated to {} faces",
                self.min_face_count_reached
            )));
        }
        tracing::info!(
            from = self.origin_face_count,
            to = self.min_face_count_reached,
            removed,
            "decimation finished"
        );
        outcome
    }

    /// Every directed boundary edge has exactly one reversed partner, and
    /// each corner names the patch owning that partner.
    pub fn is_closed(&self) -> bool {
        let mut owner: HashMap<(usize, usize), PatchId> = HashMap::new();
        for f in self.faces() {
            let r = &f.patch.ring;
            for k in 0..r.len() {
                if owner.insert((r[k].vid, r[(k + 1) % r.len()].vid), f.id).is_some() {
                    return false;
                }
            }
        }
        self.faces().all(|f| {
            let r = &f.patch.ring;
            (0..r.len()).all(|k| {
                let (a, b) = (r[k].vid, r[(k + 1) % r.len()].vid);
                owner.get(&(b, a)) == Some(&r[k].nb)
            })
        })
    }

    /// No used vertex lies outside any active face by more than `eps`.
    pub fn is_convex(&self, eps: f64) -> bool {
        self.faces().all(|f| {
            self.faces()
                .all(|g| g.positions().all(|p| !f.plane().outside(&p, eps)))
        })
    }
}

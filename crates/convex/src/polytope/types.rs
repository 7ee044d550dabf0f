//! Data types for the polytope arena and its removal history.

use serde::{Deserialize, Serialize};

use crate::geom3::{HalfSpace, Vec3, DIST_EPS};

/// Index of a patch in the polytope arena. Stable across removal and undo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(pub usize);

/// One boundary corner of a patch: the vertex and the neighbor across the
/// edge that starts at it (`vid -> next vid`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corner {
    pub vid: usize,
    pub nb: PatchId,
}

/// Planar face with an outward plane and a counterclockwise corner ring.
///
/// Invariant: one neighbor per boundary edge; the neighbor stores the same
/// edge reversed.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    pub plane: HalfSpace,
    pub ring: Vec<Corner>,
    /// Largest plane distance a removal would introduce; `-1` if the patch
    /// cannot be removed.
    pub removal_error: f64,
}

impl Patch {
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn is_removable(&self) -> bool {
        self.removal_error >= 0.0
    }

    pub fn vids(&self) -> impl Iterator<Item = usize> + '_ {
        self.ring.iter().map(|c| c.vid)
    }

    pub fn neighbors(&self) -> impl Iterator<Item = PatchId> + '_ {
        self.ring.iter().map(|c| c.nb)
    }
}

/// Simplifier knobs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyCfg {
    /// Classification band for candidate vertices.
    pub dist_eps: f64,
    /// Absolute removal error below which a patch may be removed.
    pub accept_below: f64,
    /// Decimation never goes to or below this many faces.
    pub min_face_count: usize,
    /// Pivot magnitude at or below which a plane triple is unsolvable.
    pub pivot_eps: f64,
    /// Half extrusion depth of prisms built from planar hulls.
    pub prism_half_thickness: f64,
}

impl Default for SimplifyCfg {
    fn default() -> Self {
        Self {
            dist_eps: DIST_EPS,
            accept_below: 0.2,
            min_face_count: 4,
            pivot_eps: 0.0,
            prism_half_thickness: 0.05,
        }
    }
}

/// One committed removal. `before`/`after` hold full copies of every
/// neighbor patch that the removal rewrote.
#[derive(Clone, Debug)]
pub(crate) struct Removal {
    pub patch: PatchId,
    /// Position of `patch` in the active list before removal.
    pub slot: usize,
    pub before: Vec<(PatchId, Patch)>,
    pub after: Vec<(PatchId, Patch)>,
    pub new_verts: Vec<Vec3>,
    pub new_degrees: Vec<usize>,
    pub error: f64,
}

//! Removal error and face removal.
//!
//! Deleting a patch lets its neighbors grow until they meet. The new corners
//! are intersections of neighbor-plane triples that stay inside every other
//! neighbor. Each neighbor then gets its chain of new corners spliced in
//! where the removed patch used to be.

use super::types::{Corner, Patch, PatchId, Removal};
use super::Polytope;
use crate::error::{ConvexError, Result};
use crate::geom3::{intersect_planes, triples, HalfSpace, Vec3};

/// A new vertex and the neighbor slots (ring positions of the removed patch)
/// whose planes pass through it.
#[derive(Clone, Debug)]
struct NewVert {
    pos: Vec3,
    on: Vec<usize>,
}

impl NewVert {
    fn shared(&self, other: &NewVert) -> usize {
        self.on.iter().filter(|i| other.on.contains(i)).count()
    }
}

impl Polytope {
    #[inline]
    fn neighbor_plane(&self, p: &Patch, k: usize) -> &HalfSpace {
        &self.patches[p.ring[k].nb.0].plane
    }

    fn triple_point(&self, p: &Patch, t: [usize; 3]) -> Option<Vec3> {
        intersect_planes(
            self.neighbor_plane(p, t[0]),
            self.neighbor_plane(p, t[1]),
            self.neighbor_plane(p, t[2]),
            self.cfg.pivot_eps,
        )
    }

    /// Removal error of a patch in the current state; `-1` if some neighbor
    /// never bounds a valid candidate.
    pub(crate) fn removal_error_of(&self, id: PatchId) -> f64 {
        let p = &self.patches[id.0];
        let n = p.len();
        if n < 3 {
            return -1.0;
        }
        let eps = self.cfg.dist_eps;
        let mut err = -1.0f64;
        let mut used = vec![false; n];
        for t in triples(n) {
            let Some(v) = self.triple_point(p, t) else {
                continue;
            };
            if p.plane.inside(&v, eps) {
                continue;
            }
            let blocked = (0..n)
                .filter(|i| !t.contains(i))
                .any(|i| self.neighbor_plane(p, i).outside(&v, eps));
            if blocked {
                continue;
            }
            let e = if p.plane.on_plane(&v, eps) {
                0.0
            } else {
                p.plane.distance(&v)
            };
            err = err.max(e);
            for i in t {
                used[i] = true;
            }
        }
        if used.iter().all(|u| *u) {
            err
        } else {
            -1.0
        }
    }

    /// Candidate vertices of removing `p`, merged when more than three
    /// neighbor planes meet in one point.
    fn replacement_vertices(&self, p: &Patch) -> (Vec<NewVert>, Vec<Vec<usize>>) {
        let n = p.len();
        let eps = self.cfg.dist_eps;
        let mut cands: Vec<NewVert> = Vec::new();
        let mut per_slot: Vec<Vec<usize>> = vec![Vec::new(); n];
        for t in triples(n) {
            let covered = cands
                .iter()
                .any(|c| c.on.len() > 3 && t.iter().all(|x| c.on.contains(x)));
            if covered {
                continue;
            }
            let Some(v) = self.triple_point(p, t) else {
                continue;
            };
            if p.plane.inside(&v, eps) {
                continue;
            }
            let mut on = Vec::new();
            let mut blocked = false;
            for i in (0..n).filter(|i| !t.contains(i)) {
                let h = self.neighbor_plane(p, i);
                if h.outside(&v, eps) {
                    blocked = true;
                    break;
                }
                if h.on_plane(&v, eps) {
                    on.push(i);
                }
            }
            if blocked {
                continue;
            }
            on.extend(t);

            let merge = if on.len() > 3 {
                cands.iter().position(|c| c.on.iter().all(|x| on.contains(x)))
            } else {
                None
            };
            match merge {
                Some(k) => {
                    for &x in &on {
                        if !cands[k].on.contains(&x) {
                            per_slot[x].push(k);
                        }
                    }
                    cands[k].on = on;
                }
                None => {
                    let k = cands.len();
                    for &x in &on {
                        per_slot[x].push(k);
                    }
                    cands.push(NewVert { pos: v, on });
                }
            }
        }
        (cands, per_slot)
    }

    /// New ring of the neighbor at slot `i` of the removed patch `p`.
    fn spliced_ring(
        &self,
        p: &Patch,
        i: usize,
        cands: &[NewVert],
        per_slot: &[Vec<usize>],
        base: usize,
    ) -> Result<Vec<Corner>> {
        let n = p.len();
        let nx = (i + 1) % n;
        let pr = (i + n - 1) % n;
        let (g1, g2) = (p.ring[i].vid, p.ring[nx].vid);
        let list = &per_slot[i];

        // Chain the new vertices on this neighbor, from the one shared with
        // the next neighbor to the one shared with the previous neighbor.
        let first = list
            .iter()
            .copied()
            .find(|&x| cands[x].on.contains(&i) && cands[x].on.contains(&nx))
            .ok_or_else(|| ConvexError::topology(format!("no chain start on slot {i}")))?;
        let mut chain = vec![first];
        let mut visited = 1;
        while visited < list.len() {
            visited += 1;
            let last = chain[chain.len() - 1];
            let prev = chain.len().checked_sub(2).map(|k| chain[k]);
            let next = list
                .iter()
                .copied()
                .find(|&x| x != last && Some(x) != prev && cands[last].shared(&cands[x]) >= 2);
            if let Some(x) = next {
                chain.push(x);
            }
        }
        if visited != chain.len() {
            return Err(ConvexError::topology(format!(
                "sorted {} of {} new vertices on slot {i}",
                chain.len(),
                list.len()
            )));
        }
        let tail = &cands[chain[chain.len() - 1]];
        if !(tail.on.contains(&pr) && tail.on.contains(&i)) {
            return Err(ConvexError::topology(format!(
                "chain on slot {i} does not reach the previous neighbor"
            )));
        }

        let cur = &self.patches[p.ring[i].nb.0];
        let mut ring = cur.ring.clone();
        let m = ring.len();
        let mut v2 = ring
            .iter()
            .position(|c| c.vid == g2)
            .ok_or_else(|| ConvexError::topology(format!("vertex {g2} missing from neighbor")))?;
        if ring[(v2 + 1) % m].vid != g1 {
            return Err(ConvexError::topology(format!(
                "edge {g2}->{g1} missing from neighbor"
            )));
        }
        // A vertex of degree three disappears together with the patch.
        if self.degree[g1] == 3 {
            let at = (v2 + 1) % m;
            ring.remove(at);
            if at < v2 {
                v2 -= 1;
            }
        }
        let ins = if self.degree[g2] == 3 {
            ring.remove(v2);
            v2
        } else {
            ring[v2].nb = p.ring[nx].nb;
            v2 + 1
        };

        let mut corners = Vec::with_capacity(chain.len());
        for (j, &x) in chain.iter().enumerate() {
            let nb = match chain.get(j + 1) {
                None => p.ring[pr].nb,
                Some(&y) => (0..n)
                    .filter(|&k| k != i && per_slot[k].contains(&x) && per_slot[k].contains(&y))
                    .last()
                    .map(|k| p.ring[k].nb)
                    .ok_or_else(|| {
                        ConvexError::topology(format!("no neighbor between new vertices {x} and {y}"))
                    })?,
            };
            corners.push(Corner { vid: base + x, nb });
        }
        ring.splice(ins..ins, corners);
        Ok(ring)
    }

    /// Remove an active patch. The polytope is unchanged on error.
    pub fn remove_face(&mut self, id: PatchId) -> Result<()> {
        let slot = self
            .active
            .iter()
            .position(|&a| a == id)
            .ok_or_else(|| ConvexError::topology(format!("patch {} is not active", id.0)))?;
        let p = self.patches[id.0].clone();
        if p.len() < 3 {
            return Err(ConvexError::topology("patch with fewer than three neighbors"));
        }

        let (cands, per_slot) = self.replacement_vertices(&p);
        if cands.is_empty() {
            return Err(ConvexError::topology("no replacement vertex"));
        }
        let base = self.verts.len();
        let mut rings = Vec::with_capacity(p.len());
        for i in 0..p.len() {
            rings.push((p.ring[i].nb, self.spliced_ring(&p, i, &cands, &per_slot, base)?));
        }

        // Redo entries are dropped; their vertices were already truncated on undo.
        self.history.truncate(self.cursor);
        let before: Vec<(PatchId, Patch)> = rings
            .iter()
            .map(|(nb, _)| (*nb, self.patches[nb.0].clone()))
            .collect();
        let new_verts: Vec<Vec3> = cands.iter().map(|c| c.pos).collect();
        let new_degrees: Vec<usize> = cands.iter().map(|c| c.on.len()).collect();
        self.verts.extend_from_slice(&new_verts);
        self.degree.extend_from_slice(&new_degrees);
        for (nb, ring) in rings {
            self.patches[nb.0].ring = ring;
        }
        for (nb, _) in &before {
            self.patches[nb.0].removal_error = self.removal_error_of(*nb);
        }
        for c in &p.ring {
            self.degree[c.vid] = self.degree[c.vid].saturating_sub(1);
        }
        self.active.remove(slot);
        let after = before
            .iter()
            .map(|(nb, _)| (*nb, self.patches[nb.0].clone()))
            .collect();

        tracing::debug!(
            patch = id.0,
            error = p.removal_error,
            faces = self.active.len(),
            new_vertices = new_verts.len(),
            "face removed"
        );
        self.history.push(Removal {
            patch: id,
            slot,
            before,
            after,
            new_verts,
            new_degrees,
            error: p.removal_error,
        });
        self.cursor += 1;
        Ok(())
    }
}

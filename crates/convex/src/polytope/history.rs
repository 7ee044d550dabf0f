//! Undo/redo over committed removals.
//!
//! Entries `..cursor` are applied, `cursor..` can be redone. Undo restores
//! neighbor snapshots, reinserts the patch at its old active slot and drops
//! the vertices the removal appended, so a full undo gives back the original
//! arrays exactly.

use super::Polytope;
use crate::error::{ConvexError, Result};

impl Polytope {
    #[inline]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    /// Revert the last applied removal; `false` if there is none.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        let r = &self.history[self.cursor];
        for (id, patch) in &r.before {
            self.patches[id.0] = patch.clone();
        }
        for c in &self.patches[r.patch.0].ring {
            self.degree[c.vid] += 1;
        }
        let keep = self.verts.len() - r.new_verts.len();
        self.verts.truncate(keep);
        self.degree.truncate(keep);
        self.active.insert(r.slot, r.patch);
        true
    }

    /// Re-apply the next undone removal; `false` if there is none.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        let r = &self.history[self.cursor];
        self.verts.extend_from_slice(&r.new_verts);
        self.degree.extend_from_slice(&r.new_degrees);
        for (id, patch) in &r.after {
            self.patches[id.0] = patch.clone();
        }
        for c in &self.patches[r.patch.0].ring {
            self.degree[c.vid] = self.degree[c.vid].saturating_sub(1);
        }
        self.active.remove(r.slot);
        self.cursor += 1;
        true
    }

    /// Smallest face count reachable through the recorded history.
    #[inline]
    pub fn min_recorded_face_count(&self) -> usize {
        self.origin_face_count - self.history.len()
    }

    /// Undo or redo until the polytope has `n` faces.
    pub fn goto_face_count(&mut self, n: usize) -> Result<()> {
        let (min, max) = (self.min_recorded_face_count(), self.origin_face_count);
        if n < min || n > max {
            return Err(ConvexError::FaceCount {
                requested: n,
                min,
                max,
            });
        }
        let target = max - n;
        while self.cursor > target {
            self.undo();
        }
        while self.cursor < target {
            self.redo();
        }
        Ok(())
    }

    /// Face count reached by `goto_error(e)`: replay the recorded removals
    /// while each one's error, over `error_scale`, stays below `e`.
    pub fn face_count_for_error(&self, e: f64) -> usize {
        let steps = self
            .history
            .iter()
            .take_while(|r| r.error / self.error_scale < e)
            .count();
        self.origin_face_count - steps
    }

    /// Move to the coarsest recorded state whose removal errors (relative to
    /// `error_scale`) all stay below `e`.
    pub fn goto_error(&mut self, e: f64) -> Result<()> {
        let n = self.face_count_for_error(e);
        self.goto_face_count(n)
    }
}

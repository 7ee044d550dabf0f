//! Immutable convex proxy produced by the simplifier.
//!
//! Purpose
//! - Hold the final vertex list and faces in the shape collision code wants:
//!   each face carries its plane, its vertex cycle, one outward "edge"
//!   half-space per boundary edge, and extra bevel half-spaces at acute
//!   corners.
//! - Offer the small queries consumers run on it (support points, neighbor
//!   faces, walkable support normals) plus rigid transforms and mirroring.
//!
//! References
//! - Code cross-refs: `polytope::Polytope::to_convex_data`, `geom3::HalfSpace`

mod io;

use nalgebra::{Point3, Similarity3};
use serde::{Deserialize, Serialize};

use crate::error::{ConvexError, Result};
use crate::geom3::cfg::{AABB_PAD, ACUTE_THRESH, NEAREST_START, VERT_VALUE_MAX};
use crate::geom3::{intersect_planes, Aabb, HalfSpace, Mirror, Vec3};

/// Flag word bits.
pub const BAD_FIT: u32 = 0x1;
pub const BLOCK_NPC: u32 = 0x2;
pub const SKIP_MOVE_TRACE: u32 = 0x4;
pub const SKIP_RAY_TRACE: u32 = 0x8;
pub const SKIP_CAM_TRACE: u32 = 0x10;

/// One face of a `ConvexData`.
///
/// Invariant: `edge_hs.len() == vids.len()`; `edge_hs[k]` bounds the edge
/// `vids[k] -> vids[k + 1]` and faces away from the face interior.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CovFace {
    pub plane: HalfSpace,
    pub vids: Vec<usize>,
    pub edge_hs: Vec<HalfSpace>,
    pub extra_hs: Vec<HalfSpace>,
}

impl CovFace {
    pub fn new(plane: HalfSpace) -> Self {
        Self {
            plane,
            ..Self::default()
        }
    }

    /// Append a boundary vertex with the half-space of the edge leaving it.
    #[inline]
    pub fn push(&mut self, vid: usize, edge: HalfSpace) {
        self.vids.push(vid);
        self.edge_hs.push(edge);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vids.is_empty()
    }

    /// Boundary edges `(vids[k], vids[k + 1])`, wrapping.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.vids.len();
        (0..n).map(move |k| (self.vids[k], self.vids[(k + 1) % n]))
    }

    pub fn has_edge(&self, v1: usize, v2: usize) -> bool {
        self.edges()
            .any(|(a, b)| (a == v1 && b == v2) || (a == v2 && b == v1))
    }

    #[inline]
    pub fn has_vertex(&self, v: usize) -> bool {
        self.vids.contains(&v)
    }

    /// Edge or extra half-space closest to `p` (by absolute distance).
    pub fn nearest_half_space(&self, p: &Vec3) -> Option<&HalfSpace> {
        let mut best = None;
        let mut min = NEAREST_START;
        for hs in self.edge_hs.iter().chain(self.extra_hs.iter()) {
            let d = hs.distance(p).abs();
            if d < min {
                min = d;
                best = Some(hs);
            }
        }
        best
    }

    /// Recompute every edge half-space from the current vertex positions.
    pub fn rebuild_edge_half_spaces(&mut self, verts: &[Vec3]) {
        let n = self.plane.n;
        let edges: Vec<HalfSpace> = self
            .edges()
            .map(|(a, b)| {
                let (v1, v2) = (verts[a], verts[b]);
                HalfSpace::from_points(&v1, &v2, &(v2 + n))
            })
            .collect();
        self.edge_hs = edges;
    }

    /// Bevel half-spaces at corners whose two edge normals meet at
    /// `dot < ACUTE_THRESH`. The bevel passes through the corner and faces
    /// the point where both edge planes, pushed out by one unit, meet on the
    /// face plane.
    pub fn compute_extra_half_spaces(&mut self, verts: &[Vec3]) {
        self.extra_hs.clear();
        let n = self.edge_hs.len();
        if n == 0 {
            return;
        }
        for i in 0..n {
            let vi = (i + 1) % n;
            if self.edge_hs[i].n.dot(&self.edge_hs[vi].n) < ACUTE_THRESH {
                if let Some(hs) = self.bevel(vi, verts) {
                    self.extra_hs.push(hs);
                }
            }
        }
    }

    fn bevel(&self, i: usize, verts: &[Vec3]) -> Option<HalfSpace> {
        let n = self.edge_hs.len();
        let prev = if i == 0 { n - 1 } else { i - 1 };
        let corner = verts[self.vids[i]];
        let mut a = self.edge_hs[prev];
        let mut b = self.edge_hs[i];
        a.translate(1.0);
        b.translate(1.0);
        let x = intersect_planes(&a, &b, &self.plane, 0.0)?;
        Some(HalfSpace::from_normal_point(&(x - corner), &corner))
    }

    fn transform(&mut self, sim: &Similarity3<f64>) {
        self.plane.transform(sim);
        for hs in self.edge_hs.iter_mut().chain(self.extra_hs.iter_mut()) {
            hs.transform(sim);
        }
    }
}

/// Exported convex hull: vertices plus faces with their boundary planes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvexData {
    pub flags: u32,
    pub vertices: Vec<Vec3>,
    pub faces: Vec<CovFace>,
}

impl ConvexData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thin prism around a triangle, `thickness` deep along its normal.
    pub fn from_triangle(tri: [Vec3; 3], thickness: f64) -> Result<Self> {
        let half = 0.5 * thickness.abs();
        if half < 0.5e-4 {
            return Err(ConvexError::degenerate("triangle prism thinner than 1e-4"));
        }
        let n = (tri[1] - tri[0]).cross(&(tri[0] - tri[2]));
        if n.norm() < 1e-5 {
            return Err(ConvexError::degenerate("collinear triangle"));
        }
        let n = n.normalize();
        let mut cd = Self::new();
        for p in &tri {
            cd.add_vertex(p + n * half);
            cd.add_vertex(p - n * half);
        }
        let (top, bottom) = (cd.vertices[0], cd.vertices[1]);
        // `n` is the normal of the reversed ring (0, 2, 1), so the top ring
        // runs 0, 4, 2 and the bottom ring 1, 3, 5.
        cd.add_cycle(HalfSpace::from_normal_point(&n, &top), &[0, 4, 2]);
        cd.add_cycle(HalfSpace::from_normal_point(&-n, &bottom), &[1, 3, 5]);
        for i in 0..3 {
            let (t0, b0) = (2 * i, 2 * i + 1);
            let (t1, b1) = ((2 * i + 2) % 6, (2 * i + 3) % 6);
            let plane = HalfSpace::from_points(&cd.vertices[t0], &cd.vertices[t1], &cd.vertices[b1]);
            cd.add_cycle(plane, &[t0, t1, b1, b0]);
        }
        cd.compute_extra_half_spaces();
        Ok(cd)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn add_vertex(&mut self, v: Vec3) -> usize {
        self.vertices.push(v);
        self.vertices.len() - 1
    }

    #[inline]
    pub fn add_face(&mut self, face: CovFace) {
        self.faces.push(face);
    }

    /// Add a face from its plane and vertex cycle, deriving edge half-spaces.
    pub fn add_cycle(&mut self, plane: HalfSpace, vids: &[usize]) {
        let mut f = CovFace::new(plane);
        f.vids = vids.to_vec();
        f.rebuild_edge_half_spaces(&self.vertices);
        self.faces.push(f);
    }

    #[inline]
    pub fn set_flag(&mut self, bit: u32, on: bool) {
        if on {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }

    #[inline]
    pub fn has_flag(&self, bit: u32) -> bool {
        self.flags & bit != 0
    }

    #[inline]
    pub fn set_bad_fit(&mut self, bad: bool) {
        self.set_flag(BAD_FIT, bad);
    }

    #[inline]
    pub fn is_bad_fit(&self) -> bool {
        self.has_flag(BAD_FIT)
    }

    /// Vertex bounding box, padded by `AABB_PAD`. `None` with fewer than two
    /// vertices.
    pub fn aabb(&self) -> Option<Aabb> {
        if self.vertices.len() < 2 {
            return None;
        }
        let mut b = Aabb::from_points(&self.vertices);
        b.expand(AABB_PAD);
        Some(b)
    }

    pub fn compute_extra_half_spaces(&mut self) {
        let verts = &self.vertices;
        for f in &mut self.faces {
            f.compute_extra_half_spaces(verts);
        }
    }

    /// Apply a uniform-scale similarity to vertices and every plane.
    pub fn transform(&mut self, sim: &Similarity3<f64>) {
        for v in &mut self.vertices {
            *v = sim.transform_point(&Point3::from(*v)).coords;
        }
        for f in &mut self.faces {
            f.transform(sim);
        }
    }

    /// Mirror the hull. Reflections flip handedness, so each vertex cycle is
    /// reversed and its edge and extra planes are rebuilt to stay outward.
    pub fn mirror(&mut self, m: Mirror) {
        for v in &mut self.vertices {
            *v = m.apply(v);
        }
        let verts = &self.vertices;
        for f in &mut self.faces {
            f.plane.mirror(m);
            f.vids.reverse();
            f.rebuild_edge_half_spaces(verts);
            f.compute_extra_half_spaces(verts);
        }
    }

    /// Coordinates finite and within `±VERT_VALUE_MAX`; face normals not
    /// collapsed.
    pub fn is_valid(&self) -> bool {
        let coords_ok = self
            .vertices
            .iter()
            .all(|v| v.iter().all(|c| c.is_finite() && c.abs() <= VERT_VALUE_MAX));
        coords_ok && self.faces.iter().all(|f| f.plane.n.norm_squared() >= 1e-4)
    }

    /// Index of the other face sharing edge `v1 - v2` with face `face`.
    pub fn neighbor_face(&self, face: usize, v1: usize, v2: usize) -> Option<usize> {
        self.faces
            .iter()
            .enumerate()
            .find(|(i, f)| *i != face && f.has_edge(v1, v2))
            .map(|(i, _)| i)
    }

    /// Upward-most normal (largest positive `y`) among faces on edge `v1 - v2`;
    /// zero if none faces up.
    pub fn support_plane_normal_edge(&self, v1: usize, v2: usize) -> Vec3 {
        self.upward_normal(|f| f.has_edge(v1, v2))
    }

    /// Upward-most normal among faces around vertex `v`; zero if none faces up.
    pub fn support_plane_normal_vertex(&self, v: usize) -> Vec3 {
        self.upward_normal(|f| f.has_vertex(v))
    }

    fn upward_normal(&self, pick: impl Fn(&CovFace) -> bool) -> Vec3 {
        let mut normal = Vec3::zeros();
        let mut max_y = 0.0;
        for f in self.faces.iter().filter(|f| pick(f)) {
            if f.plane.n.y > max_y {
                max_y = f.plane.n.y;
                normal = f.plane.n;
            }
        }
        normal
    }

    /// Index of the vertex with the largest projection on `dir`.
    pub fn support_index(&self, dir: &Vec3) -> Option<usize> {
        let mut it = self.vertices.iter().enumerate();
        let (_, first) = it.next()?;
        let mut best = (0, first.dot(dir));
        for (i, v) in it {
            let d = v.dot(dir);
            if d > best.1 {
                best = (i, d);
            }
        }
        Some(best.0)
    }

    #[inline]
    pub fn support_point(&self, dir: &Vec3) -> Option<Vec3> {
        self.support_index(dir).map(|i| self.vertices[i])
    }

    /// `p` is inside or on every face plane within `eps`.
    pub fn contains(&self, p: &Vec3, eps: f64) -> bool {
        self.faces.iter().all(|f| !f.plane.outside(p, eps))
    }
}

#[cfg(test)]
mod tests;

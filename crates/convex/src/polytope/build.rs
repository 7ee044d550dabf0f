//! Polytope construction from a finished hull: dense vertex ids, one patch
//! per hull face, adjacency from reversed directed edges. Planar hulls are
//! extruded into a thin prism first.

use std::collections::HashMap;

use super::types::{Corner, Patch, PatchId, SimplifyCfg};
use super::Polytope;
use crate::error::{ConvexError, Result};
use crate::geom3::{HalfSpace, Vec3};
use crate::hull::HullResult;

/// Vertex positions plus face cycles with their planes, before linking.
struct Faces {
    verts: Vec<Vec3>,
    cycles: Vec<(HalfSpace, Vec<usize>)>,
}

impl Polytope {
    /// Take ownership of a hull and build the simplifier over it.
    ///
    /// `error_scale` divides the recorded per-count errors (see
    /// `errors_by_count`); non-positive values are treated as 1.
    pub fn from_hull(hull: HullResult, error_scale: f64, cfg: SimplifyCfg) -> Result<Self> {
        let prism = hull.hull_is_2d;
        let faces = if prism {
            extrude(&hull, cfg.prism_half_thickness)?
        } else {
            solid_faces(&hull)?
        };
        let mut p = Self::link(faces, cfg)?;
        p.error_scale = if error_scale > 0.0 { error_scale } else { 1.0 };
        p.is_prism = prism;
        tracing::debug!(
            faces = p.active.len(),
            vertices = p.verts.len(),
            prism,
            "polytope built"
        );
        Ok(p)
    }

    fn link(faces: Faces, cfg: SimplifyCfg) -> Result<Self> {
        let Faces { verts, cycles } = faces;
        let mut degree = vec![0usize; verts.len()];
        let mut owner: HashMap<(usize, usize), PatchId> = HashMap::new();
        for (k, (_, cyc)) in cycles.iter().enumerate() {
            for (a, b) in cycle_edges(cyc) {
                if owner.insert((a, b), PatchId(k)).is_some() {
                    return Err(ConvexError::topology(format!("edge {a}->{b} used twice")));
                }
            }
            for &v in cyc {
                degree[v] += 1;
            }
        }

        let mut patches = Vec::with_capacity(cycles.len());
        for (plane, cyc) in cycles {
            let mut ring = Vec::with_capacity(cyc.len());
            for (a, b) in cycle_edges(&cyc) {
                let nb = owner
                    .get(&(b, a))
                    .copied()
                    .ok_or_else(|| ConvexError::topology(format!("open edge {a}->{b}")))?;
                ring.push(Corner { vid: a, nb });
            }
            patches.push(Patch {
                plane,
                ring,
                removal_error: -1.0,
            });
        }

        let n = patches.len();
        if n < 4 {
            return Err(ConvexError::degenerate(format!("closed hull with {n} faces")));
        }
        let mut p = Self {
            verts,
            degree,
            patches,
            active: (0..n).map(PatchId).collect(),
            history: Vec::new(),
            cursor: 0,
            origin_face_count: n,
            min_face_count_reached: n,
            errors_by_count: vec![-1.0; n + 1],
            error_scale: 1.0,
            cfg,
            exception: false,
            is_prism: false,
        };
        for k in 0..n {
            p.patches[k].removal_error = p.removal_error_of(PatchId(k));
        }
        Ok(p)
    }
}

fn cycle_edges(cyc: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    (0..cyc.len()).map(move |k| (cyc[k], cyc[(k + 1) % cyc.len()]))
}

/// Genuine triangles and coplanar groups of a 3D hull over dense ids.
fn solid_faces(hull: &HullResult) -> Result<Faces> {
    let mut map = vec![None; hull.vertices.len()];
    let mut verts = Vec::with_capacity(hull.extreme_count());
    for (i, p) in hull.vertices.iter().enumerate() {
        if hull.extreme[i] {
            map[i] = Some(verts.len());
            verts.push(*p);
        }
    }
    let dense = |ids: &[usize]| -> Result<Vec<usize>> {
        ids.iter()
            .map(|&i| {
                map[i].ok_or_else(|| ConvexError::topology(format!("face uses interior point {i}")))
            })
            .collect()
    };

    let src = &hull.vertices;
    let mut cycles = Vec::with_capacity(hull.face_count());
    for f in hull.boundary_triangles() {
        let plane = HalfSpace::from_points(&src[f.v[0]], &src[f.v[1]], &src[f.v[2]]);
        cycles.push((plane, dense(&f.v)?));
    }
    for g in hull.groups.iter().filter(|g| g.len() >= 3) {
        let plane = HalfSpace::from_points(&src[g[0]], &src[g[1]], &src[g[2]]);
        cycles.push((plane, dense(g)?));
    }
    Ok(Faces { verts, cycles })
}

/// Thin prism around the single polygon of a planar hull.
///
/// Vertex `2i` is polygon vertex `i` lifted to the top plane, `2i + 1` the
/// same vertex dropped to the bottom plane.
fn extrude(hull: &HullResult, half: f64) -> Result<Faces> {
    let Some(poly) = hull.groups.first().filter(|g| g.len() >= 3) else {
        return Err(ConvexError::degenerate("planar hull without a polygon"));
    };
    let src = &hull.vertices;
    let out = HalfSpace::from_points(&src[poly[0]], &src[poly[1]], &src[poly[2]]);
    if out.n.norm_squared() == 0.0 {
        return Err(ConvexError::degenerate("planar hull polygon has no normal"));
    }
    let (n, d) = (out.n, out.d);

    let mut verts = Vec::with_capacity(poly.len() * 2);
    for &i in poly {
        let p = src[i];
        let h = n.dot(&p);
        verts.push(p + n * (d + half - h));
        verts.push(p + n * (d - half - h));
    }

    let m = poly.len();
    let count = 2 * m;
    let mut cycles = Vec::with_capacity(m + 2);
    cycles.push((HalfSpace::new(n, d + half), (0..m).map(|i| 2 * i).collect()));
    cycles.push((
        HalfSpace::new(-n, -(d - half)),
        (0..m).rev().map(|i| 2 * i + 1).collect(),
    ));
    for i in 0..m {
        let ring = vec![2 * i, 2 * i + 1, (2 * i + 3) % count, (2 * i + 2) % count];
        let plane = HalfSpace::from_points(&verts[ring[3]], &verts[ring[0]], &verts[ring[1]]);
        cycles.push((plane, ring));
    }
    Ok(Faces { verts, cycles })
}

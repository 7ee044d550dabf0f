//! Export of the active faces to `ConvexData`.

use super::Polytope;
use crate::convex_data::{ConvexData, CovFace};
use crate::geom3::HalfSpace;

impl Polytope {
    /// Copy the current faces out. Vertices are renumbered in first-use order
    /// and every boundary edge gets its outward half-space.
    pub fn to_convex_data(&self) -> ConvexData {
        let mut cd = ConvexData::new();
        let mut map: Vec<Option<usize>> = vec![None; self.verts.len()];
        for f in self.faces() {
            let n = f.plane().n;
            let mut face = CovFace::new(*f.plane());
            let ring = &f.patch.ring;
            for (k, c) in ring.iter().enumerate() {
                let v1 = self.verts[c.vid];
                let v2 = self.verts[ring[(k + 1) % ring.len()].vid];
                let hs = HalfSpace::from_points(&v1, &v2, &(v2 + n));
                let id = match map[c.vid] {
                    Some(id) => id,
                    None => {
                        let id = cd.add_vertex(v1);
                        map[c.vid] = Some(id);
                        id
                    }
                };
                face.push(id, hs);
            }
            cd.add_face(face);
        }
        cd.compute_extra_half_spaces();
        tracing::debug!(
            vertices = cd.vertex_count(),
            faces = cd.face_count(),
            "convex data exported"
        );
        cd
    }
}

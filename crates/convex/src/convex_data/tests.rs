use super::*;
use nalgebra::Vector3;
use std::collections::HashSet;
use std::io::Cursor;

fn equilateral() -> [Vec3; 3] {
    [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.5, 0.0, 0.75f64.sqrt()),
    ]
}

fn prism() -> ConvexData {
    ConvexData::from_triangle(equilateral(), 0.2).unwrap()
}

fn is_closed(cd: &ConvexData) -> bool {
    let mut seen = HashSet::new();
    for f in &cd.faces {
        for e in f.edges() {
            if !seen.insert(e) {
                return false;
            }
        }
    }
    seen.iter().all(|(a, b)| seen.contains(&(*b, *a)))
}

fn edges_face_outward(cd: &ConvexData) -> bool {
    cd.faces.iter().all(|f| {
        let c = f.vids.iter().map(|v| cd.vertices[*v]).sum::<Vec3>() / f.len() as f64;
        f.edge_hs.iter().all(|h| h.inside(&c, 1e-9))
            && f.vids
                .iter()
                .all(|v| f.edge_hs.iter().all(|h| !h.outside(&cd.vertices[*v], 1e-9)))
    })
}

#[test]
fn triangle_prism_is_closed_and_convex() {
    let cd = prism();
    assert_eq!(cd.vertex_count(), 6);
    assert_eq!(cd.face_count(), 5);
    assert!(is_closed(&cd));
    assert!(edges_face_outward(&cd));
    for v in &cd.vertices {
        assert!(cd.contains(v, 1e-9));
    }
    let centroid = equilateral().iter().sum::<Vec3>() / 3.0;
    assert!(cd.contains(&centroid, 0.0));
    assert!(!cd.contains(&(centroid + Vec3::y() * 0.2), 1e-9));
    assert!((cd.faces[0].plane.n - Vec3::y()).norm() < 1e-12);
}

#[test]
fn thin_or_collinear_triangles_are_rejected() {
    assert!(ConvexData::from_triangle(equilateral(), 1e-5).is_err());
    let line = [Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0];
    assert!(matches!(
        ConvexData::from_triangle(line, 0.2),
        Err(ConvexError::Degenerate { .. })
    ));
}

#[test]
fn acute_corners_get_bevels() {
    let cd = prism();
    // Triangle caps have three 60 degree corners; the bevel keeps the face.
    for f in &cd.faces[..2] {
        assert_eq!(f.extra_hs.len(), 3);
        for h in &f.extra_hs {
            assert!(f.vids.iter().all(|v| !h.outside(&cd.vertices[*v], 1e-9)));
            assert!(f.vids.iter().any(|v| h.on_plane(&cd.vertices[*v], 1e-9)));
        }
    }
}

#[test]
fn nearest_half_space_picks_edge_through_point() {
    let cd = prism();
    let top = &cd.faces[0];
    let (a, b) = (cd.vertices[top.vids[0]], cd.vertices[top.vids[1]]);
    let mid = (a + b) * 0.5;
    let hs = top.nearest_half_space(&mid).unwrap();
    assert!(hs.on_plane(&mid, 1e-9));
    assert!(CovFace::default().nearest_half_space(&mid).is_none());
}

#[test]
fn flags_toggle_independently() {
    let mut cd = prism();
    cd.set_bad_fit(true);
    cd.set_flag(SKIP_RAY_TRACE, true);
    assert!(cd.is_bad_fit());
    assert_eq!(cd.flags, BAD_FIT | SKIP_RAY_TRACE);
    cd.set_bad_fit(false);
    assert!(!cd.is_bad_fit());
    assert!(cd.has_flag(SKIP_RAY_TRACE));
    assert!(!cd.has_flag(BLOCK_NPC));
}

#[test]
fn aabb_is_padded() {
    assert!(ConvexData::new().aabb().is_none());
    let b = prism().aabb().unwrap();
    assert!((b.min - Vec3::new(-1e-4, -0.1 - 1e-4, -1e-4)).norm() < 1e-12);
    assert!((b.max.x - (1.0 + 1e-4)).abs() < 1e-12);
}

#[test]
fn validity_checks_coordinates() {
    let mut cd = prism();
    assert!(cd.is_valid());
    cd.add_vertex(Vec3::new(2e5, 0.0, 0.0));
    assert!(!cd.is_valid());
    let mut cd = prism();
    cd.vertices[0].x = f64::NAN;
    assert!(!cd.is_valid());
    let mut cd = prism();
    cd.faces[0].plane.n = Vec3::zeros();
    assert!(!cd.is_valid());
}

#[test]
fn neighbor_faces_share_edges() {
    let cd = prism();
    let (a, b) = cd.faces[0].edges().next().unwrap();
    let nb = cd.neighbor_face(0, a, b).unwrap();
    assert_ne!(nb, 0);
    assert!(cd.faces[nb].has_edge(b, a));
    assert_eq!(cd.neighbor_face(nb, a, b), Some(0));
    assert_eq!(cd.neighbor_face(0, 0, 1), Some(2));
    assert_eq!(cd.neighbor_face(0, 0, 5), None);
}

#[test]
fn support_queries() {
    let cd = prism();
    // Vertex 0 sits on the upward cap, vertex 1 on the downward one.
    assert!((cd.support_plane_normal_vertex(0) - Vec3::y()).norm() < 1e-12);
    assert_eq!(cd.support_plane_normal_vertex(1), Vec3::zeros());
    assert!((cd.support_plane_normal_edge(0, 2) - Vec3::y()).norm() < 1e-12);
    assert_eq!(cd.support_plane_normal_edge(1, 3), Vec3::zeros());

    assert_eq!(cd.support_index(&Vec3::x()), Some(2));
    assert_eq!(cd.support_point(&-Vec3::y()).map(|p| p.y), Some(-0.1));
    assert!(ConvexData::new().support_point(&Vec3::x()).is_none());
}

#[test]
fn transform_moves_planes_with_vertices() {
    let mut cd = prism();
    let sim = Similarity3::new(Vector3::new(3.0, -1.0, 2.0), Vector3::new(0.3, 1.1, -0.4), 2.5);
    let centroid = equilateral().iter().sum::<Vec3>() / 3.0;
    cd.transform(&sim);
    for f in &cd.faces {
        for v in &f.vids {
            assert!(f.plane.on_plane(&cd.vertices[*v], 1e-9));
        }
    }
    assert!(edges_face_outward(&cd));
    let moved = sim.transform_point(&Point3::from(centroid)).coords;
    assert!(cd.contains(&moved, 0.0));
}

#[test]
fn mirror_keeps_outward_orientation() {
    for m in [Mirror::X, Mirror::Y, Mirror::Z, Mirror::XY, Mirror::YZ, Mirror::XZ] {
        let mut cd = prism();
        cd.mirror(m);
        assert!(is_closed(&cd), "{m:?}");
        assert!(edges_face_outward(&cd), "{m:?}");
        for v in &cd.vertices {
            assert!(cd.contains(v, 1e-9), "{m:?}");
        }
        assert_eq!(cd.faces[0].extra_hs.len(), 3);
    }
}

#[test]
fn binary_form_reads_back() {
    let mut cd = prism();
    cd.set_flag(BLOCK_NPC, true);
    let mut buf = Vec::new();
    cd.write_to(&mut buf).unwrap();
    // flags + counts + 6 vertices + 5 planes + 18 ids
    assert_eq!(buf.len(), 4 * (1 + 1 + 18 + 1 + 5 * 5 + 18));

    let back = ConvexData::read_from(&mut Cursor::new(&buf)).unwrap();
    assert_eq!(back.flags, cd.flags);
    assert_eq!(back.face_count(), 5);
    for (a, b) in cd.vertices.iter().zip(&back.vertices) {
        assert!((a - b).norm() < 1e-6);
    }
    for (a, b) in cd.faces.iter().zip(&back.faces) {
        assert_eq!(a.vids, b.vids);
        assert_eq!(b.edge_hs.len(), b.vids.len());
        assert!((a.plane.n - b.plane.n).norm() < 1e-6);
        assert!((a.plane.d - b.plane.d).abs() < 1e-6);
    }
    assert_eq!(back.faces[0].extra_hs.len(), 3);
}

#[test]
fn truncated_or_corrupt_streams_fail() {
    let mut buf = Vec::new();
    prism().write_to(&mut buf).unwrap();
    let cut = &buf[..buf.len() - 2];
    assert!(matches!(
        ConvexData::read_from(&mut Cursor::new(cut)),
        Err(ConvexError::Io(_))
    ));

    let mut bad = Vec::new();
    bad.extend_from_slice(&0u32.to_le_bytes());
    bad.extend_from_slice(&1i32.to_le_bytes());
    for _ in 0..3 {
        bad.extend_from_slice(&0f32.to_le_bytes());
    }
    bad.extend_from_slice(&1i32.to_le_bytes());
    for c in [0f32, 1.0, 0.0, 0.0] {
        bad.extend_from_slice(&c.to_le_bytes());
    }
    bad.extend_from_slice(&3i32.to_le_bytes());
    for id in [0i32, 0, 5] {
        bad.extend_from_slice(&id.to_le_bytes());
    }
    assert!(matches!(
        ConvexData::read_from(&mut Cursor::new(&bad)),
        Err(ConvexError::Format { .. })
    ));

    let mut neg = 0u32.to_le_bytes().to_vec();
    neg.extend_from_slice(&(-4i32).to_le_bytes());
    assert!(matches!(
        ConvexData::read_from(&mut Cursor::new(&neg)),
        Err(ConvexError::Format { .. })
    ));
}

#[test]
fn oversized_header_without_payload_fails() {
    let mut buf = 0u32.to_le_bytes().to_vec();
    buf.extend_from_slice(&(1i32 << 24).to_le_bytes());
    assert!(matches!(
        ConvexData::read_from(&mut Cursor::new(&buf)),
        Err(ConvexError::Io(_))
    ));

    let mut buf = 0u32.to_le_bytes().to_vec();
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(1i32 << 24).to_le_bytes());
    assert!(matches!(
        ConvexData::read_from(&mut Cursor::new(&buf)),
        Err(ConvexError::Io(_))
    ));
}

#[test]
fn serde_json_keeps_faces() {
    let cd = prism();
    let s = serde_json::to_string(&cd).unwrap();
    let back: ConvexData = serde_json::from_str(&s).unwrap();
    assert_eq!(back, cd);
    // Edge planes carry offsets like 1.0 that must not come back one ulp off.
    let d: Vec<f64> = cd.faces.iter().flat_map(|f| f.edge_hs.iter().map(|h| h.d)).collect();
    let d_back: Vec<f64> = back.faces.iter().flat_map(|f| f.edge_hs.iter().map(|h| h.d)).collect();
    assert_eq!(d, d_back);
}

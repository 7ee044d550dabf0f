use super::*;
use crate::error::ConvexError;
use crate::geom3::dedup_points;
use crate::rand3::{sphere_points, ReplayToken};
use proptest::prelude::*;
use std::collections::HashSet;

fn cube() -> Vec<Vec3> {
    let mut v = Vec::new();
    for x in [0.0, 1.0] {
        for y in [0.0, 1.0] {
            for z in [0.0, 1.0] {
                v.push(Vec3::new(x, y, z));
            }
        }
    }
    v
}

fn hex_pyramid() -> Vec<Vec3> {
    let mut v: Vec<Vec3> = (0..6)
        .map(|k| {
            let a = std::f64::consts::TAU * k as f64 / 6.0;
            Vec3::new(a.cos(), 0.0, a.sin())
        })
        .collect();
    v.push(Vec3::new(0.0, 1.0, 0.0));
    v
}

fn build(pts: Vec<Vec3>) -> HullResult {
    GiftWrap::new(pts, HullCfg::default())
        .and_then(GiftWrap::compute)
        .unwrap()
}

/// Outward planes of every hull face (triangles and polygon groups).
fn face_planes(h: &HullResult) -> Vec<HalfSpace> {
    let p = &h.vertices;
    h.boundary_triangles()
        .map(|f| HalfSpace::from_points(&p[f.v[0]], &p[f.v[1]], &p[f.v[2]]))
        .chain(
            h.groups
                .iter()
                .map(|g| HalfSpace::from_points(&p[g[0]], &p[g[1]], &p[g[2]])),
        )
        .collect()
}

fn directed_edges(h: &HullResult) -> HashSet<(usize, usize)> {
    let mut out = HashSet::new();
    let cycles = h
        .boundary_triangles()
        .map(|f| f.v.to_vec())
        .chain(h.groups.iter().cloned());
    for c in cycles {
        for k in 0..c.len() {
            assert!(out.insert((c[k], c[(k + 1) % c.len()])), "edge used twice");
        }
    }
    out
}

#[test]
fn cube_wraps_into_six_quads() {
    let h = build(cube());
    assert!(!h.hull_is_2d);
    assert_eq!(h.boundary_triangles().count(), 0);
    assert_eq!(h.groups.len(), 6);
    assert!(h.groups.iter().all(|g| g.len() == 4));
    assert_eq!(h.extreme_count(), 8);
    assert_eq!(h.face_count(), 6);
    // Fan triangles triangulate each quad.
    assert_eq!(h.faces.iter().filter(|f| f.in_polygon).count(), 12);
}

#[test]
fn tetrahedron_has_four_triangles() {
    let h = build(vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.2, 1.0, 0.3),
    ]);
    assert!(!h.hull_is_2d);
    assert!(h.groups.is_empty());
    assert_eq!(h.boundary_triangles().count(), 4);
    assert_eq!(h.extreme_count(), 4);
}

#[test]
fn coplanar_base_becomes_one_polygon() {
    let h = build(hex_pyramid());
    assert!(!h.hull_is_2d);
    assert_eq!(h.groups.len(), 1);
    assert_eq!(h.groups[0].len(), 6);
    assert_eq!(h.boundary_triangles().count(), 6);
    assert_eq!(h.face_count(), 7);
}

#[test]
fn faces_are_outward_and_closed() {
    for pts in [cube(), hex_pyramid()] {
        let h = build(pts);
        for plane in face_planes(&h) {
            for p in &h.vertices {
                assert!(!plane.outside(p, 1e-6), "point outside {plane:?}");
            }
        }
        let edges = directed_edges(&h);
        for (a, b) in &edges {
            assert!(edges.contains(&(*b, *a)), "open edge {a}->{b}");
        }
    }
}

#[test]
fn interior_points_are_not_extreme() {
    let mut pts = cube();
    pts.push(Vec3::new(0.5, 0.5, 0.5));
    pts.push(Vec3::new(0.5, 0.0, 0.5));
    let h = build(pts);
    assert_eq!(h.groups.len(), 6);
    assert!(!h.extreme[8]);
    assert!(!h.extreme[9]);
}

#[test]
fn planar_input_reports_single_group() {
    let pts = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.3, 0.0),
        Vec3::new(1.0, 0.5, 1.0),
        Vec3::new(0.0, 0.2, 1.0),
        Vec3::new(0.5, 0.25, 0.5),
    ];
    let h = build(pts);
    assert!(h.hull_is_2d);
    assert_eq!(h.groups.len(), 1);
    let mut g = h.groups[0].clone();
    g.sort_unstable();
    assert_eq!(g, vec![0, 1, 2, 3]);
}

#[test]
fn rejects_short_collinear_and_nan_input() {
    let two = vec![Vec3::zeros(), Vec3::x()];
    assert!(matches!(
        GiftWrap::new(two, HullCfg::default()),
        Err(ConvexError::TooFewPoints { found: 2, needed: 3 })
    ));
    let line: Vec<Vec3> = (0..5).map(|i| Vec3::new(i as f64, 2.0 * i as f64, 0.0)).collect();
    assert!(matches!(
        GiftWrap::new(line, HullCfg::default()),
        Err(ConvexError::Degenerate { .. })
    ));
    let nan = vec![Vec3::zeros(), Vec3::x(), Vec3::new(f64::NAN, 0.0, 1.0)];
    assert!(matches!(
        GiftWrap::new(nan, HullCfg::default()),
        Err(ConvexError::Degenerate { .. })
    ));
}

#[test]
fn state_machine_walks_phases() {
    let mut gw = GiftWrap::new(cube(), HullCfg::default()).unwrap();
    assert_eq!(gw.phase(), Phase::Idle);
    gw.step();
    assert_eq!(gw.phase(), Phase::SeedSearch);
    assert_eq!(gw.attempts(), 1);
    assert!((gw.dist_eps() - 0.01).abs() < 1e-15);
    gw.step();
    assert_eq!(gw.phase(), Phase::Expanding);
    assert_eq!(gw.open_edges(), 2);
    let mut guard = 0;
    while !gw.is_done() {
        gw.step();
        guard += 1;
        assert!(guard < 10_000);
    }
    assert_eq!(gw.phase(), Phase::Done);
    let h = gw.into_result().unwrap();
    assert_eq!(h.groups.len(), 6);
}

#[test]
fn unfinished_builder_has_no_result() {
    let gw = GiftWrap::new(cube(), HullCfg::default()).unwrap();
    assert!(matches!(gw.into_result(), Err(ConvexError::Degenerate { .. })));
}

#[test]
fn retry_plan_is_bounded_and_ordered() {
    let s = RetrySchedule::default();
    let plan = s.plan(0.01);
    assert!(plan.len() > 4 * 10 * 4 && plan.len() <= 4 * 10 * 6);
    assert!((plan[0].0 - 0.01).abs() < 1e-15);
    assert!((plan[0].1 - 0.01).abs() < 1e-15);
    assert!((plan[1].1 - 0.001).abs() < 1e-15);
    // The first base shrinks 0.01 down to 1e-7 before the next base starts.
    assert!((plan[6].1 - 0.009).abs() < 1e-15);
    let split = plan.iter().position(|(idp, _)| *idp < 0.005).unwrap();
    assert!((plan[split].0 - 0.001).abs() < 1e-15);
    assert!(plan[..split].iter().all(|(idp, _)| *idp == 0.01));
    assert!(plan.iter().all(|(_, t)| *t > 0.0));

    let none = RetrySchedule {
        identical_steps: 0,
        ..s
    };
    assert!(none.plan(0.01).is_empty());
}

#[test]
fn exhausted_schedule_fails() {
    let cfg = HullCfg {
        retry: RetrySchedule {
            identical_steps: 0,
            ..RetrySchedule::default()
        },
        ..HullCfg::default()
    };
    let res = GiftWrap::new(cube(), cfg).and_then(GiftWrap::compute);
    assert!(matches!(res, Err(ConvexError::Degenerate { .. })));
}

#[test]
fn planar_variant_flattens_elevation() {
    let pts = vec![
        Vec3::new(0.0, 5.0, 0.0),
        Vec3::new(1.0, 2.0, 0.0),
        Vec3::new(1.0, -3.0, 1.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.5, 9.0, 0.5),
    ];
    let h = build_planar(&pts, &Hull2dCfg::default()).unwrap();
    assert!(h.hull_is_2d);
    assert!(h.vertices.iter().all(|p| p.y == 0.0));
    assert_eq!(h.groups.len(), 1);
    let mut g = h.groups[0].clone();
    g.sort_unstable();
    assert_eq!(g, vec![0, 1, 2, 3]);

    let tri = vec![
        Vec3::new(0.0, 5.0, 0.0),
        Vec3::new(1.0, 2.0, 0.0),
        Vec3::new(0.5, 1.0, 0.5),
    ];
    let h = build_planar(&tri, &Hull2dCfg::default()).unwrap();
    assert_eq!(h.groups[0].len(), 3);
}

#[test]
fn planar_variant_rejects_vertical_line() {
    // Distinct in 3D, collinear once flattened.
    let pts = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 1.0),
        Vec3::new(0.0, 2.0, 2.0),
        Vec3::new(0.0, 7.0, 0.5),
    ];
    assert!(build_planar(&pts, &Hull2dCfg::default()).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn sphere_clouds_wrap_convex_and_closed(seed in any::<u64>(), n in 12usize..40) {
        let pts = dedup_points(&sphere_points(n, 1.0, ReplayToken::new(seed, 0)), 1e-3);
        let h = build(pts);
        prop_assert!(!h.hull_is_2d);
        for plane in face_planes(&h) {
            for p in &h.vertices {
                prop_assert!(!plane.outside(p, 0.05));
            }
        }
        let edges = directed_edges(&h);
        for (a, b) in &edges {
            prop_assert!(edges.contains(&(*b, *a)));
        }
        prop_assert!(h.extreme_count() >= 4);
    }
}

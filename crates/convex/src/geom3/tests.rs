use super::*;
use nalgebra::{Similarity3, Translation3, UnitQuaternion};
use proptest::prelude::*;

fn v3(a: [f64; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

#[test]
fn three_point_plane_orientation_and_offset() {
    let h = HalfSpace::from_points(
        &Vec3::new(0.0, 1.0, 0.0),
        &Vec3::new(0.0, 1.0, 1.0),
        &Vec3::new(1.0, 1.0, 0.0),
    );
    assert!((h.n - Vec3::y()).norm() < 1e-12);
    assert!((h.d - 1.0).abs() < 1e-12);
    assert!(h.inside(&Vec3::zeros(), 1e-5));
    assert!(h.outside(&Vec3::new(0.0, 2.0, 0.0), 1e-5));
    assert!(h.on_plane(&Vec3::new(5.0, 1.0 + 1e-6, -3.0), 1e-5));
}

#[test]
fn degenerate_points_give_zero_normal() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let h = HalfSpace::from_points(&a, &(a * 2.0), &(a * 3.0));
    assert_eq!(h.n, Vec3::zeros());
    assert_eq!(h.d, 0.0);
}

#[test]
fn translate_moves_band() {
    let mut h = HalfSpace::new(Vec3::z(), 0.0);
    let p = Vec3::new(0.0, 0.0, 0.5);
    assert!(h.outside(&p, 1e-5));
    h.translate(1.0);
    assert!(h.inside(&p, 1e-5));
    let f = h.flipped();
    assert!(f.outside(&p, 1e-5));
    assert!((h.project(&Vec3::new(3.0, 4.0, 9.0)) - Vec3::new(3.0, 4.0, 1.0)).norm() < 1e-12);
}

#[test]
fn segment_hit_cases() {
    let h = HalfSpace::new(Vec3::y(), 0.0);
    let eps = 1e-5;
    let below = Vec3::new(0.0, -1.0, 0.0);
    let above = Vec3::new(2.0, 3.0, 0.0);
    let on = Vec3::new(1.0, 0.0, 1.0);
    assert_eq!(h.intersect_segment(&below, &below, eps), SegmentHit::NoHit);
    assert_eq!(h.intersect_segment(&on, &above, eps), SegmentHit::V1OnPlane);
    assert_eq!(h.intersect_segment(&above, &on, eps), SegmentHit::V2OnPlane);
    assert_eq!(h.intersect_segment(&on, &on, eps), SegmentHit::BothOnPlane);
    match h.intersect_segment(&below, &above, eps) {
        SegmentHit::Hit(p) => assert!((p - Vec3::new(0.5, 0.0, 0.0)).norm() < 1e-12),
        other => panic!("expected hit, got {other:?}"),
    }
}

#[test]
fn similarity_keeps_points_on_plane() {
    let h0 = HalfSpace::from_points(
        &Vec3::new(1.0, 0.0, 0.0),
        &Vec3::new(0.0, 1.0, 0.0),
        &Vec3::new(0.0, 0.0, 1.0),
    );
    let sim = Similarity3::from_parts(
        Translation3::new(0.5, -2.0, 3.0),
        UnitQuaternion::from_euler_angles(0.3, -0.7, 1.1),
        2.5,
    );
    let mut h = h0;
    h.transform(&sim);
    for p in [Vec3::x(), Vec3::y(), Vec3::z()] {
        assert!(h.on_plane(&sim.transform_point(&p.into()).coords, 1e-9));
    }
    let inner = sim.transform_point(&Vec3::zeros().into()).coords;
    assert!(h.inside(&inner, 1e-9));
}

#[test]
fn mirror_preserves_classification() {
    let h0 = HalfSpace::from_normal_point(&Vec3::new(1.0, 2.0, -0.5), &Vec3::new(0.2, 0.1, 0.4));
    let p = Vec3::new(0.9, -0.3, 1.7);
    for m in [Mirror::X, Mirror::Y, Mirror::Z, Mirror::XY, Mirror::YZ, Mirror::XZ] {
        let mut h = h0;
        h.mirror(m);
        assert!((h.distance(&m.apply(&p)) - h0.distance(&p)).abs() < 1e-12);
        assert_eq!(m.apply(&m.apply(&p)), p);
    }
}

#[test]
fn aabb_accumulates_and_pads() {
    let mut b = Aabb::from_points(&[Vec3::new(1.0, -1.0, 0.0), Vec3::new(-2.0, 3.0, 0.5)]);
    assert_eq!(b.min, Vec3::new(-2.0, -1.0, 0.0));
    assert_eq!(b.max, Vec3::new(1.0, 3.0, 0.5));
    b.expand(0.5);
    assert!(b.contains(&Vec3::new(1.4, 3.4, 0.9)));
    assert!(Aabb::empty().is_empty());
    assert_eq!(Aabb::empty().diagonal(), 0.0);
}

proptest! {
    // Narrowing the band only shrinks the on-plane set.
    #[test]
    fn smaller_eps_never_flips_inside_to_outside(
        n in prop::array::uniform3(-1.0..1.0f64),
        p in prop::array::uniform3(-10.0..10.0f64),
        d in -5.0..5.0f64,
        eps in 1e-7..1e-1f64,
        shrink in 0.0..1.0f64,
    ) {
        let n = normalize_or_zero(v3(n));
        prop_assume!(n.norm() > 0.5);
        let h = HalfSpace::new(n, d);
        let p = v3(p);
        let small = eps * shrink;
        if h.inside(&p, eps) {
            prop_assert!(h.inside(&p, small));
        }
        if h.outside(&p, eps) {
            prop_assert!(h.outside(&p, small));
        }
        let count = [h.inside(&p, small), h.outside(&p, small), h.on_plane(&p, small)]
            .iter()
            .filter(|b| **b)
            .count();
        prop_assert_eq!(count, 1);
    }

    #[test]
    fn plane_triple_point_lies_on_all_three(
        a in prop::array::uniform3(-1.0..1.0f64),
        b in prop::array::uniform3(-1.0..1.0f64),
        c in prop::array::uniform3(-1.0..1.0f64),
        off in prop::array::uniform3(-3.0..3.0f64),
    ) {
        let (a, b, c) = (normalize_or_zero(v3(a)), normalize_or_zero(v3(b)), normalize_or_zero(v3(c)));
        prop_assume!(a.cross(&b).dot(&c).abs() > 0.05);
        let hs = [HalfSpace::new(a, off[0]), HalfSpace::new(b, off[1]), HalfSpace::new(c, off[2])];
        let p = intersect_planes(&hs[0], &hs[1], &hs[2], 0.0).unwrap();
        for h in &hs {
            prop_assert!(h.distance(&p).abs() < 1e-8);
        }
    }
}

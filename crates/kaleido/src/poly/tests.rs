use super::*;
use crate::color::Rgb;
use crate::shape::ShapeKind;
use nalgebra::Vector2;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn cfg(shape: ShapeKind) -> PolyCfg {
    PolyCfg {
        shape,
        scale: 1.5,
        canvas: Canvas::new(800, 800),
        color: Rgb::new(200, 10, 10),
        deflect_bound: 20.0,
    }
}

#[test]
fn square_fixed_replay() {
    let mut rng = StdRng::seed_from_u64(0);
    let list = [10.0, -5.0, 20.0, 0.0];
    let p = DeflectedPolygon::generate(cfg(ShapeKind::Square), 4, Some(&list), &mut rng).unwrap();
    assert_eq!(p.vertex_count(), 64);
    assert_eq!(p.deflections(), &list);
    assert_eq!(p.center(), Vector2::new(400.0, 400.0));
}

#[test]
fn single_step_displaces_perpendicular() {
    // First edge of the square runs from (250,250) down to (250,550): θ = π/2,
    // so the offset is m·(1, 0).
    let mut rng = StdRng::seed_from_u64(0);
    let mut p = DeflectedPolygon::new(cfg(ShapeKind::Square), &mut rng).unwrap();
    p.deflect(Some(10.0), &mut rng).unwrap();
    let v = p.vertices();
    assert_eq!(v[0], Vector2::new(250.0, 250.0));
    assert!((v[1].x - 260.0).abs() < 1e-9);
    assert!((v[1].y - 400.0).abs() < 1e-9);
    assert_eq!(v[2], Vector2::new(250.0, 550.0));
}

#[test]
fn explicit_zero_is_not_random() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut p = DeflectedPolygon::new(cfg(ShapeKind::Hexagon), &mut rng).unwrap();
    let before = p.vertices().to_vec();
    p.deflect(Some(0.0), &mut rng).unwrap();
    assert_eq!(p.deflections(), &[0.0]);
    // Even slots keep the old vertices; odd slots are plain midpoints.
    for k in 0..before.len() {
        assert_eq!(p.vertices()[2 * k], before[k]);
        let mid = (before[k] + before[(k + 1) % before.len()]) * 0.5;
        assert!((p.vertices()[2 * k + 1] - mid).norm() < 1e-9);
    }
}

#[test]
fn coincident_neighbors_do_not_move() {
    let mut rng = StdRng::seed_from_u64(1);
    // Scale 0 collapses the seed onto the center; every edge has zero length.
    let mut c = cfg(ShapeKind::Pentagon);
    c.scale = 0.0;
    let mut p = DeflectedPolygon::new(c, &mut rng).unwrap();
    p.deflect(Some(30.0), &mut rng).unwrap();
    for v in p.vertices() {
        assert_eq!(*v, Vector2::new(400.0, 400.0));
    }
}

#[test]
fn clamp_rule_applies_after_deflection() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut c = cfg(ShapeKind::Square);
    c.scale = 10.0; // seed lies far outside an 800x600 canvas
    c.canvas = Canvas::new(800, 600);
    let mut p = DeflectedPolygon::new(c, &mut rng).unwrap();
    p.deflect(Some(0.0), &mut rng).unwrap();
    let v = p.vertices();
    assert_eq!(v[0], Vector2::new(0.0, 0.0));
    assert_eq!(v[4], Vector2::new(799.0, 599.0));
    assert!(v.iter().all(|q| c.canvas.contains(*q)));
}

#[test]
fn random_shape_is_resolved_once() {
    let mut rng = StdRng::seed_from_u64(9);
    let p = DeflectedPolygon::generate(cfg(ShapeKind::Random), 3, None, &mut rng).unwrap();
    assert_ne!(p.shape(), ShapeKind::Random);
    assert_eq!(p.vertex_count(), p.shape().vertex_count() * 8);
}

#[test]
fn explicit_list_length_is_checked() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = DeflectedPolygon::generate(cfg(ShapeKind::Square), 3, Some(&[1.0]), &mut rng)
        .unwrap_err();
    assert!(matches!(
        err,
        crate::KaleidoError::DeflectionListMismatch {
            given: 1,
            expected: 3
        }
    ));
}

#[test]
fn zero_distance_sister_reproduces_source() {
    let mut rng = StdRng::seed_from_u64(17);
    let src = DeflectedPolygon::generate(cfg(ShapeKind::Pentagon), 5, None, &mut rng).unwrap();
    let mut sis = DeflectedPolygon::new(cfg(ShapeKind::Pentagon), &mut rng).unwrap();
    sis.distort(&src, 0.0, &mut rng).unwrap();
    assert_eq!(sis.deflections(), src.deflections());
    assert_eq!(sis.vertices(), src.vertices());
}

#[test]
fn distort_stays_in_window() {
    let mut rng = StdRng::seed_from_u64(23);
    let src = DeflectedPolygon::generate(cfg(ShapeKind::Square), 6, None, &mut rng).unwrap();
    let mut sis = DeflectedPolygon::new(cfg(ShapeKind::Square), &mut rng).unwrap();
    sis.distort(&src, 10.0, &mut rng).unwrap();
    assert_eq!(sis.vertex_count(), src.vertex_count());
    for (a, b) in sis.deflections().iter().zip(src.deflections()) {
        let d = (a - b).abs();
        assert!((5.0 - 1e-9..=10.0 + 1e-9).contains(&d), "offset {d}");
    }
    assert!(sis.distort(&src, -1.0, &mut rng).is_err());
}

#[test]
fn from_parts_checks_topology() {
    let mut rng = StdRng::seed_from_u64(4);
    let p = DeflectedPolygon::generate(cfg(ShapeKind::Hexagon), 2, None, &mut rng).unwrap();
    let q = DeflectedPolygon::from_parts(
        cfg(ShapeKind::Hexagon),
        p.vertices().to_vec(),
        p.deflections().to_vec(),
    )
    .unwrap();
    assert_eq!(p, q);

    let err = DeflectedPolygon::from_parts(
        cfg(ShapeKind::Square),
        p.vertices().to_vec(),
        p.deflections().to_vec(),
    )
    .unwrap_err();
    assert!(matches!(err, crate::KaleidoError::VertexCountMismatch { .. }));
}

#[test]
fn invalid_bound_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut c = cfg(ShapeKind::Square);
    c.deflect_bound = -1.0;
    assert!(DeflectedPolygon::new(c, &mut rng).is_err());
    c.deflect_bound = 1.0;
    c.canvas = Canvas::new(0, 10);
    assert!(DeflectedPolygon::new(c, &mut rng).is_err());
}

#[test]
fn bound_with_infinite_range_width_is_an_error() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut c = cfg(ShapeKind::Square);
    c.deflect_bound = 1e308;
    assert!(matches!(
        DeflectedPolygon::new(c, &mut rng),
        Err(crate::KaleidoError::InvalidParameter { name: "deflect_bound", .. })
    ));
    let mut p = DeflectedPolygon::generate(cfg(ShapeKind::Square), 2, None, &mut rng).unwrap();
    let source = p.clone();
    assert!(matches!(
        p.distort(&source, 1e308, &mut rng),
        Err(crate::KaleidoError::InvalidParameter { name: "distance", .. })
    ));
}

#[test]
fn deflection_depth_is_capped() {
    let mut rng = StdRng::seed_from_u64(0);
    let c = cfg(ShapeKind::Square);
    assert!(matches!(
        DeflectedPolygon::generate(c, 40, None, &mut rng),
        Err(crate::KaleidoError::InvalidParameter { name: "deflections", .. })
    ));
    let mut p = DeflectedPolygon::new(c, &mut rng).unwrap();
    p.recurse(MAX_DEFLECTIONS - 1, Some(&[0.0; MAX_DEFLECTIONS - 1]), &mut rng)
        .unwrap();
    p.deflect(Some(0.0), &mut rng).unwrap();
    assert_eq!(p.deflection_count(), MAX_DEFLECTIONS);
    assert!(p.deflect(Some(0.0), &mut rng).is_err());
    assert_eq!(p.deflection_count(), MAX_DEFLECTIONS);
}

#[test]
fn expected_count_overflow() {
    assert_eq!(expected_vertex_count(4, 4), Some(64));
    assert_eq!(expected_vertex_count(6, 200), None);
}

fn shapes() -> impl Strategy<Value = ShapeKind> {
    prop_oneof![
        Just(ShapeKind::Square),
        Just(ShapeKind::Pentagon),
        Just(ShapeKind::Hexagon),
        Just(ShapeKind::Random),
    ]
}

proptest! {
    #[test]
    fn vertex_count_law(shape in shapes(), n in 0usize..8, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let p = DeflectedPolygon::generate(cfg(shape), n, None, &mut rng).unwrap();
        prop_assert_eq!(p.vertex_count(), p.shape().vertex_count() << n);
        prop_assert_eq!(p.deflection_count(), n);
    }

    #[test]
    fn vertices_stay_on_canvas(
        shape in shapes(),
        w in 1u32..400,
        h in 1u32..400,
        scale in 0.0f64..5.0,
        bound in 0.0f64..300.0,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let c = PolyCfg { canvas: Canvas::new(w, h), scale, deflect_bound: bound, ..cfg(shape) };
        let mut p = DeflectedPolygon::new(c, &mut rng).unwrap();
        for _ in 0..5 {
            p.deflect(None, &mut rng).unwrap();
            prop_assert!(p.vertices().iter().all(|v| c.canvas.contains(*v)));
        }
    }

    #[test]
    fn explicit_replay_is_pure(
        list in proptest::collection::vec(-80.0f64..80.0, 0..6),
        s1 in any::<u64>(),
        s2 in any::<u64>(),
    ) {
        let mut r1 = StdRng::seed_from_u64(s1);
        let mut r2 = StdRng::seed_from_u64(s2);
        let a = DeflectedPolygon::generate(cfg(ShapeKind::Square), list.len(), Some(&list), &mut r1).unwrap();
        let b = DeflectedPolygon::generate(cfg(ShapeKind::Square), list.len(), Some(&list), &mut r2).unwrap();
        prop_assert_eq!(a.vertices(), b.vertices());
        prop_assert_eq!(a.deflections(), &list[..]);
    }
}

use tessel_geom::{Aabb, Ray, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

fn unit_box() -> Aabb {
    Aabb::new(Vec3::ZERO, Vec3::ONE)
}

#[test]
fn vec3_ops_and_helpers() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    assert!(vec3_approx_eq(a + b, Vec3::new(-3.0, 7.0, -3.0), 1e-6));
    assert!(vec3_approx_eq(-a, Vec3::new(-1.0, -2.0, -3.0), 1e-6));
    assert!(vec3_approx_eq(a.min(b), Vec3::new(-4.0, 2.0, -6.0), 1e-6));
    assert!(vec3_approx_eq(a.max(b), Vec3::new(1.0, 5.0, 3.0), 1e-6));
    assert_eq!(a.axis(0), 1.0);
    assert_eq!(a.axis(2), 3.0);

    // Zero vector normalization should be a no-op (not NaN, unchanged)
    let zn = Vec3::ZERO.normalized();
    assert!(zn.is_finite());
    assert!(vec3_approx_eq(zn, Vec3::ZERO, 1e-6));
}

#[test]
fn aabb_contains_is_inclusive_intersects_is_strict() {
    let a = unit_box();
    assert!(a.contains_point(Vec3::ONE));
    assert!(a.contains_point(Vec3::ZERO));
    assert!(!a.contains_point(Vec3::new(1.01, 0.5, 0.5)));

    let touching = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
    assert!(!a.intersects(&touching));
    let overlapping = Aabb::new(Vec3::new(0.9, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
    assert!(a.intersects(&overlapping));
    assert!(overlapping.intersects(&a));
}

#[test]
fn ray_enters_box_on_near_face() {
    let ray = Ray::new(Vec3::new(-2.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
    let (t0, t1) = unit_box().ray_interval(&ray).expect("hit");
    assert!(approx_eq(t0, 2.0, 1e-6));
    assert!(approx_eq(t1, 3.0, 1e-6));
    let entry = unit_box().ray_entry(&ray).unwrap();
    assert!(vec3_approx_eq(entry, Vec3::new(0.0, 0.5, 0.5), 1e-6));
}

#[test]
fn ray_from_inside_enters_at_origin() {
    let ray = Ray::new(Vec3::HALF, Vec3::new(0.0, -1.0, 0.0));
    let (t0, t1) = unit_box().ray_interval(&ray).unwrap();
    assert_eq!(t0, 0.0);
    assert!(approx_eq(t1, 0.5, 1e-6));
}

#[test]
fn ray_pointing_away_or_parallel_outside_misses() {
    let away = Ray::new(Vec3::new(-2.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(unit_box().ray_interval(&away), None);
    let parallel = Ray::new(Vec3::new(-2.0, 3.0, 0.5), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(unit_box().ray_interval(&parallel), None);
}

#[test]
fn ray_with_negative_zero_components_still_hits() {
    let ray = Ray::new(Vec3::new(0.5, 0.5, 4.0), Vec3::new(-0.0, 0.0, -1.0));
    let entry = unit_box().ray_entry(&ray).unwrap();
    assert!(vec3_approx_eq(entry, Vec3::new(0.5, 0.5, 1.0), 1e-6));
}

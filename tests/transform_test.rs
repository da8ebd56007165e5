use glider::transform::{
    Mat4, Vec3, Vec4, look_at, normal_matrix, ortho, perspective, rotate, rotate_x, rotate_y,
    scalem, translate,
};

const TOL: f32 = 1e-5;

#[test]
fn identity_is_multiplicative_neutral() {
    let m = translate(1.0, -2.0, 3.0) * rotate_y(33.0);
    assert!((m * Mat4::identity()).approx_eq(&m, TOL));
    assert!((Mat4::identity() * m).approx_eq(&m, TOL));
}

#[test]
fn translation_moves_points_but_not_directions() {
    let m = translate(1.0, 2.0, 3.0);
    let p = m * Vec4::point(Vec3::new(1.0, 1.0, 1.0));
    let d = m * Vec4::direction(Vec3::new(1.0, 1.0, 1.0));
    assert!(p.approx_eq(Vec4::new(2.0, 3.0, 4.0, 1.0), TOL));
    assert!(d.approx_eq(Vec4::new(1.0, 1.0, 1.0, 0.0), TOL));
}

#[test]
fn scale_multiplies_components() {
    let m = scalem(2.0, 3.0, 4.0);
    let p = m * Vec4::point(Vec3::new(1.0, 1.0, 1.0));
    assert!(p.approx_eq(Vec4::new(2.0, 3.0, 4.0, 1.0), TOL));
}

#[test]
fn rotation_round_trips_through_its_inverse() {
    let m = rotate(47.0, Vec3::new(0.3, -0.7, 0.2)).unwrap();
    let inv = m.inverse().unwrap();
    assert!((m * inv).approx_eq(&Mat4::identity(), TOL));
    // A rotation's inverse is its transpose.
    assert!(inv.approx_eq(&m.transpose(), TOL));
}

#[test]
fn opposite_rotations_cancel() {
    for theta in [0.0f32, 12.5, 90.0, -33.0, 540.0] {
        let m = rotate_x(theta) * rotate_x(-theta);
        assert!(m.approx_eq(&Mat4::identity(), TOL));
    }
}

#[test]
fn axis_rotation_matches_dedicated_x_rotation() {
    let general = rotate(30.0, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    assert!(general.approx_eq(&rotate_x(30.0), TOL));
}

#[test]
fn rotate_rejects_zero_axis() {
    assert!(rotate(15.0, Vec3::ZERO).is_err());
}

#[test]
fn look_at_with_coincident_eye_and_target_is_identity() {
    let eye = Vec3::new(1.0, 2.0, 3.0);
    let view = look_at(eye, eye, Vec3::new(0.0, 1.0, 0.0));
    assert!(view.approx_eq(&Mat4::identity(), TOL));
}

#[test]
fn look_at_moves_target_onto_negative_z() {
    let view = look_at(
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::ZERO,
        Vec3::new(0.0, 1.0, 0.0),
    );
    let target = view * Vec4::point(Vec3::ZERO);
    assert!(target.approx_eq(Vec4::new(0.0, 0.0, -5.0, 1.0), TOL));
    let eye = view * Vec4::point(Vec3::new(0.0, 0.0, 5.0));
    assert!(eye.approx_eq(Vec4::new(0.0, 0.0, 0.0, 1.0), TOL));
}

#[test]
fn perspective_maps_depth_to_zero_one_range() {
    let (near, far) = (0.1, 100.0);
    let proj = perspective(80.0, 16.0 / 9.0, near, far);

    let at_near = proj * Vec4::point(Vec3::new(0.0, 0.0, -near));
    assert!((at_near.z / at_near.w).abs() < TOL);

    let at_far = proj * Vec4::point(Vec3::new(0.0, 0.0, -far));
    assert!((at_far.z / at_far.w - 1.0).abs() < TOL);
}

#[test]
fn ortho_rejects_coincident_planes() {
    assert!(ortho(-1.0, -1.0, -1.0, 1.0, 0.1, 10.0).is_err());
    assert!(ortho(-1.0, 1.0, 1.0, 1.0, 0.1, 10.0).is_err());
    assert!(ortho(-1.0, 1.0, -1.0, 1.0, 5.0, 5.0).is_err());
}

#[test]
fn singular_matrix_inverse_is_an_error() {
    let mut m = Mat4::identity();
    m.rows[2] = [0.0; 4];
    let err = m.inverse().unwrap_err();
    assert!(err.to_string().contains("singular"));
}

#[test]
fn hadamard_is_elementwise_not_dot() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(4.0, 5.0, 6.0);
    assert_eq!(a.hadamard(b), Vec3::new(4.0, 10.0, 18.0));
    assert_eq!(a.dot(b), 32.0);
}

#[test]
fn normal_matrix_counteracts_nonuniform_scale() {
    let m = scalem(2.0, 1.0, 1.0);
    let n = normal_matrix(&m).unwrap();
    // A normal along +X shrinks instead of stretching.
    let transformed = n * Vec3::new(1.0, 0.0, 0.0);
    assert!((transformed.x - 0.5).abs() < TOL);
}

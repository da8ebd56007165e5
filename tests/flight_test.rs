use glider::flight::controls::InputState;
use glider::flight::{FlightState, SPHERE_RADIUS};
use glider::transform::{Vec3, Vec4, look_at, rotate_x, rotate_y};

fn run_updates(state: &mut FlightState, input: &InputState, seconds: f32) {
    let dt = 0.02;
    let steps = (seconds / dt).round() as usize;
    for _ in 0..steps {
        state.update(input, dt);
    }
}

#[test]
fn throttle_saturates_at_both_ends() {
    let mut state = FlightState::new();
    let mut input = InputState::default();

    input.throttle_up = true;
    run_updates(&mut state, &input, 10.0);
    assert!((state.speed - 0.2).abs() < 1e-6);

    input.throttle_up = false;
    input.throttle_down = true;
    run_updates(&mut state, &input, 10.0);
    assert!((state.speed - 0.001).abs() < 1e-6);
}

#[test]
fn control_surfaces_clamp_and_return_to_neutral() {
    let mut state = FlightState::new();
    let mut input = InputState::default();

    input.left = true;
    run_updates(&mut state, &input, 1.0);
    // Left bank: left aileron up, rudder swung the other way.
    assert!((state.aileron_angle - (-25.0)).abs() < 1e-4);
    assert!((state.rudder_angle - 25.0).abs() < 1e-4);

    input.left = false;
    run_updates(&mut state, &input, 1.0);
    assert_eq!(state.aileron_angle, 0.0);
    assert_eq!(state.rudder_angle, 0.0);
}

#[test]
fn attitude_angles_respect_their_limits() {
    let mut state = FlightState::new();
    let mut input = InputState::default();

    input.right = true;
    run_updates(&mut state, &input, 20.0);
    assert!((state.yaw - 45.0).abs() < 1e-4);
    assert!((state.bank - (-60.0)).abs() < 1e-4);

    input.right = false;
    input.down = true;
    run_updates(&mut state, &input, 20.0);
    assert!((state.pitch - 6.0).abs() < 1e-4);
}

#[test]
fn ground_contact_clamps_altitude_and_levels_the_nose() {
    let mut state = FlightState::new();
    let mut input = InputState::default();

    // Nose down until the plane reaches the ground.
    input.up = true;
    run_updates(&mut state, &input, 60.0);

    assert!((state.altitude - (SPHERE_RADIUS + 0.15)).abs() < 1e-4);
    // Auto-level zeroed the nose-down pitch on contact.
    assert_eq!(state.pitch, 0.0);
}

#[test]
fn nose_up_climbs_away_from_the_ground() {
    let mut state = FlightState::new();
    let mut input = InputState::default();

    input.down = true;
    let before = state.altitude;
    run_updates(&mut state, &input, 5.0);
    assert!(state.altitude > before);
}

#[test]
fn chase_camera_is_a_pure_function_of_the_state() {
    let mut state = FlightState::new();
    let mut input = InputState::default();
    input.left = true;
    input.up = true;
    run_updates(&mut state, &input, 1.5);

    let plane_rotation = rotate_x(90.0) * rotate_y(state.yaw);
    let offset = (plane_rotation * Vec4::direction(Vec3::new(0.0, 0.2, -0.3))).truncate();
    let plane_pos = Vec3::new(0.0, 0.0, -state.altitude);
    let up = (plane_rotation * Vec4::direction(Vec3::new(0.0, 1.0, 0.0))).truncate();
    let expected = look_at(plane_pos + offset, plane_pos, up);

    assert!(state.view.approx_eq(&expected, 1e-5));
}

#[test]
fn light_direction_is_unit_length_and_translation_immune() {
    let mut state = FlightState::new();
    let input = InputState::default();
    run_updates(&mut state, &input, 2.0);

    let [x, y, z, w] = state.light_dir;
    assert_eq!(w, 0.0);
    let len = (x * x + y * y + z * z).sqrt();
    assert!((len - 1.0).abs() < 1e-4);
}

// Host-side tests for the orbit camera controller.

use glam::Vec3;
use periodic_core::*;
use std::cell::Cell;
use std::f32::consts::PI;
use std::rc::Rc;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn make_controls() -> OrbitControls {
    let camera = Camera::new(camera_start_vec3(), Vec3::ZERO, 16.0 / 9.0);
    let mut controls = OrbitControls::new(camera, ControlsOptions::default());
    controls.set_viewport(800.0, 600.0);
    controls
}

struct CountingGuard {
    removed: Rc<Cell<u32>>,
}

impl ListenerGuard for CountingGuard {
    fn remove(self: Box<Self>) {
        self.removed.set(self.removed.get() + 1);
    }
}

#[test]
fn spherical_round_trip() {
    let cases = [
        (10.0, 0.0, PI / 2.0),
        (5.0, 1.2, 0.3),
        (42.0, -2.5, 2.8),
        (100.0, 3.0, 1.0),
    ];
    for (r, theta, phi) in cases {
        let s = Spherical::new(r, theta, phi);
        let back = Spherical::from_offset(s.to_offset());
        assert!(approx(back.radius, r, 1e-3), "radius {} vs {}", back.radius, r);
        assert!(approx(back.theta, theta, 1e-4), "theta {} vs {}", back.theta, theta);
        assert!(approx(back.phi, phi, 1e-4), "phi {} vs {}", back.phi, phi);
    }
}

#[test]
fn zero_offset_decomposes_to_zero() {
    let s = Spherical::from_offset(Vec3::ZERO);
    assert_eq!(s, Spherical::new(0.0, 0.0, 0.0));
}

#[test]
fn initial_camera_matches_start_position() {
    let controls = make_controls();
    let eye = controls.camera().eye;
    assert!((eye - camera_start_vec3()).length() < 1e-3);
    assert_eq!(controls.camera().target, Vec3::ZERO);
}

#[test]
fn wheel_never_leaves_distance_bounds() {
    let mut controls = make_controls();
    for _ in 0..500 {
        controls.wheel(1e9);
        let r = controls.state().radius;
        assert!((MIN_DISTANCE..=MAX_DISTANCE).contains(&r));
    }
    assert!(approx(controls.state().radius, MAX_DISTANCE, 1e-3));
    for _ in 0..500 {
        controls.wheel(-1e9);
        let r = controls.state().radius;
        assert!((MIN_DISTANCE..=MAX_DISTANCE).contains(&r));
    }
    assert!(approx(controls.state().radius, MIN_DISTANCE, 1e-3));
}

#[test]
fn wheel_scales_radius_by_ten_percent() {
    let mut controls = make_controls();
    let r0 = controls.state().radius;
    controls.wheel(120.0);
    assert!(approx(controls.state().radius, r0 * 1.1, 1e-3));
    controls.wheel(-3.0);
    assert!(approx(controls.state().radius, r0 * 1.1 * 0.9, 1e-3));
}

#[test]
fn wheel_applies_while_dragging() {
    let mut controls = make_controls();
    let r0 = controls.state().radius;
    controls.pointer_down(10.0, 10.0);
    controls.wheel(1.0);
    assert!(controls.is_dragging());
    assert!(controls.state().radius > r0);
}

#[test]
fn zoom_disabled_ignores_wheel() {
    let mut controls = make_controls();
    controls.set_enable_zoom(false);
    let r0 = controls.state().radius;
    controls.wheel(1.0);
    assert_eq!(controls.state().radius, r0);
}

#[test]
fn zero_drag_leaves_camera_unchanged() {
    let mut controls = make_controls();
    let before = controls.camera().eye;
    controls.pointer_down(200.0, 150.0);
    controls.pointer_move(200.0, 150.0);
    controls.pointer_up();
    assert_eq!(controls.camera().eye, before);
}

#[test]
fn drag_rotates_and_keeps_distance() {
    let mut controls = make_controls();
    let s0 = controls.spherical();
    controls.pointer_down(400.0, 300.0);
    controls.pointer_move(480.0, 300.0);
    let s1 = controls.spherical();
    // 80px of 800px at rotate speed 0.5 is 2π * 0.1 * 0.5
    assert!(approx(s1.theta, s0.theta - 2.0 * PI * 0.1 * 0.5, 1e-4));
    assert!(approx(s1.phi, s0.phi, 1e-6));
    let dist = (controls.camera().eye - controls.camera().target).length();
    assert!(approx(dist, s0.radius, 1e-3));
}

#[test]
fn polar_angle_stays_off_the_poles() {
    let mut controls = make_controls();
    controls.pointer_down(0.0, 0.0);
    controls.pointer_move(0.0, 100_000.0);
    let phi = controls.spherical().phi;
    assert!(phi >= POLAR_EPSILON - 1e-6);
    controls.pointer_move(0.0, -200_000.0);
    let phi = controls.spherical().phi;
    assert!(phi <= PI - POLAR_EPSILON + 1e-6);
    assert!(controls.camera().eye.is_finite());
}

#[test]
fn zero_viewport_is_guarded() {
    let camera = Camera::new(camera_start_vec3(), Vec3::ZERO, 1.0);
    let mut controls = OrbitControls::new(camera, ControlsOptions::default());
    controls.set_viewport(0.0, 0.0);
    let before = controls.camera().eye;
    controls.pointer_down(0.0, 0.0);
    controls.pointer_move(50.0, 50.0);
    assert_eq!(controls.camera().eye, before);
    assert!(controls.camera().eye.is_finite());

    // A valid resize re-enables rotation.
    controls.set_viewport(100.0, 100.0);
    controls.pointer_move(60.0, 50.0);
    assert_ne!(controls.camera().eye, before);
}

#[test]
fn pointer_down_ignored_when_rotation_disabled() {
    let mut controls = make_controls();
    controls.set_enable_rotate(false);
    controls.pointer_down(1.0, 1.0);
    assert!(!controls.is_dragging());
}

#[test]
fn second_pointer_down_keeps_original_anchor() {
    let mut controls = make_controls();
    controls.pointer_down(100.0, 100.0);
    controls.pointer_down(500.0, 500.0);
    let s0 = controls.spherical();
    controls.pointer_move(100.0, 100.0);
    // no movement relative to the original anchor
    assert_eq!(controls.spherical(), s0);
}

#[test]
fn pointer_up_ends_drag_unconditionally() {
    let mut controls = make_controls();
    controls.pointer_up();
    assert!(!controls.is_dragging());
    controls.pointer_down(1.0, 1.0);
    controls.pointer_up();
    assert!(!controls.is_dragging());
    let before = controls.camera().eye;
    controls.pointer_move(300.0, 300.0);
    assert_eq!(controls.camera().eye, before);
}

#[test]
fn auto_rotate_advances_azimuth_only_when_idle() {
    let mut controls = make_controls();
    let t0 = controls.spherical().theta;
    controls.update();
    assert_eq!(controls.spherical().theta, t0);

    controls.set_auto_rotate(true);
    controls.update();
    let t1 = controls.spherical().theta;
    assert!(approx(t1 - t0, AUTO_ROTATE_SPEED * AUTO_ROTATE_INCREMENT, 1e-6));

    controls.pointer_down(0.0, 0.0);
    controls.update();
    assert_eq!(controls.spherical().theta, t1);
    controls.pointer_up();
    controls.update();
    assert!(controls.spherical().theta > t1);
}

#[test]
fn drag_travel_accumulates() {
    let mut controls = make_controls();
    controls.pointer_down(0.0, 0.0);
    controls.pointer_move(3.0, 4.0);
    controls.pointer_move(3.0, 8.0);
    assert!(approx(controls.drag_travel(), 9.0, 1e-5));
}

#[test]
fn set_viewport_updates_aspect() {
    let mut controls = make_controls();
    controls.set_viewport(1000.0, 500.0);
    assert!(approx(controls.camera().aspect, 2.0, 1e-6));
    controls.set_viewport(0.0, 500.0);
    assert!(approx(controls.camera().aspect, 2.0, 1e-6));
}

#[test]
fn dispose_twice_removes_listeners_once() {
    let removed = Rc::new(Cell::new(0));
    let mut controls = make_controls();
    for _ in 0..4 {
        controls.attach_listener(Box::new(CountingGuard {
            removed: Rc::clone(&removed),
        }));
    }
    assert_eq!(controls.listener_count(), 4);
    controls.dispose();
    controls.dispose();
    assert_eq!(removed.get(), 4);
    assert_eq!(controls.listener_count(), 0);
    assert!(controls.is_disposed());
}

#[test]
fn disposed_controls_ignore_input() {
    let mut controls = make_controls();
    controls.set_auto_rotate(true);
    controls.dispose();
    let before = controls.camera().eye;
    controls.pointer_down(0.0, 0.0);
    controls.pointer_move(300.0, 200.0);
    controls.wheel(1.0);
    controls.update();
    assert_eq!(controls.camera().eye, before);
    assert!(!controls.is_dragging());
}

#[test]
fn listener_attached_after_dispose_is_removed_immediately() {
    let removed = Rc::new(Cell::new(0));
    let mut controls = make_controls();
    controls.dispose();
    controls.attach_listener(Box::new(CountingGuard {
        removed: Rc::clone(&removed),
    }));
    assert_eq!(removed.get(), 1);
    assert_eq!(controls.listener_count(), 0);
}

#[test]
fn dropping_controls_detaches_listeners() {
    let removed = Rc::new(Cell::new(0));
    {
        let mut controls = make_controls();
        controls.attach_listener(Box::new(CountingGuard {
            removed: Rc::clone(&removed),
        }));
    }
    assert_eq!(removed.get(), 1);
}

#[test]
fn set_target_keeps_offset() {
    let mut controls = make_controls();
    let offset = controls.camera().eye - controls.camera().target;
    controls.set_target(Vec3::new(1.0, 2.0, 3.0));
    let moved = controls.camera().eye - controls.camera().target;
    assert!((offset - moved).length() < 1e-4);
    assert_eq!(controls.state().target, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn auto_rotation_keeps_azimuth_bounded_and_steady() {
    let mut controls = make_controls();
    controls.set_auto_rotate(true);
    let expected = AUTO_ROTATE_SPEED * AUTO_ROTATE_INCREMENT;
    // one hour at 60 fps
    for _ in 0..216_000 {
        controls.update();
    }
    for _ in 0..2_000 {
        let before = controls.spherical().theta;
        controls.update();
        let after = controls.spherical().theta;
        assert!(after > -PI && after <= PI, "theta {after} out of range");
        let step = wrap_azimuth(after - before);
        assert!(approx(step, expected, 1e-6), "step {step} vs {expected}");
    }
}

#[test]
fn long_drag_wraps_azimuth() {
    let mut controls = make_controls();
    controls.pointer_down(0.0, 300.0);
    let mut x = 0.0;
    for _ in 0..50 {
        x += 400.0;
        controls.pointer_move(x, 300.0);
        let theta = controls.spherical().theta;
        assert!(theta > -PI && theta <= PI, "theta {theta} out of range");
    }
    controls.pointer_up();
}

#[test]
fn wrap_azimuth_folds_into_half_open_range() {
    assert!(approx(wrap_azimuth(0.25), 0.25, 1e-6));
    assert!(approx(wrap_azimuth(PI), PI, 1e-6));
    assert!(approx(wrap_azimuth(-PI), PI, 1e-6));
    assert!(approx(wrap_azimuth(3.0 * PI / 2.0), -PI / 2.0, 1e-5));
    assert!(approx(wrap_azimuth(-5.0 * PI / 2.0), -PI / 2.0, 1e-5));
}

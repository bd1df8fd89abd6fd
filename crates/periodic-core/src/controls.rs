//! Orbit controls: pointer drag and wheel input converted into a camera orbit
//! around a fixed target.
//!
//! The controller is a plain state object with explicit input methods. The
//! front-end forwards pointer/wheel events from its viewport and calls
//! [`OrbitControls::update`] once per rendered frame. Listener registrations
//! made by the front-end are handed to the controller as [`ListenerGuard`]s so
//! that [`OrbitControls::dispose`] can detach them exactly once.
//!
//! State machine:
//! - Idle -> Dragging on `pointer_down`, Dragging -> Idle on `pointer_up`
//! - `wheel` applies in either state
//! - auto-rotation is an orthogonal flag, suppressed while dragging

use crate::camera::{Camera, Spherical};
use crate::constants::{
    AUTO_ROTATE_INCREMENT, AUTO_ROTATE_SPEED, MAX_DISTANCE, MIN_DISTANCE, POLAR_EPSILON,
    ROTATE_SPEED, ZOOM_STEP,
};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Fold an azimuth into (-π, π] so long sessions keep full f32 precision.
pub fn wrap_azimuth(theta: f32) -> f32 {
    let wrapped = PI - (PI - theta).rem_euclid(TAU);
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// A registered event listener that can be detached.
///
/// Taking `self` by box means a guard can only ever be removed once.
pub trait ListenerGuard {
    fn remove(self: Box<Self>);
}

/// Tunable behavior for [`OrbitControls`].
#[derive(Clone, Debug)]
pub struct ControlsOptions {
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_step: f32,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
}

impl Default for ControlsOptions {
    fn default() -> Self {
        Self {
            min_distance: MIN_DISTANCE,
            max_distance: MAX_DISTANCE,
            rotate_speed: ROTATE_SPEED,
            zoom_step: ZOOM_STEP,
            enable_rotate: true,
            enable_zoom: true,
            auto_rotate: false,
            auto_rotate_speed: AUTO_ROTATE_SPEED,
        }
    }
}

/// Snapshot of the controller's camera state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub target: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub dragging: bool,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
}

pub struct OrbitControls {
    camera: Camera,
    target: Vec3,
    spherical: Spherical,
    options: ControlsOptions,
    viewport: Vec2,
    dragging: bool,
    last_pointer: Vec2,
    drag_travel: f32,
    listeners: Vec<Box<dyn ListenerGuard>>,
    disposed: bool,
}

impl OrbitControls {
    /// Take over `camera`, orbiting its current target at its current distance.
    pub fn new(camera: Camera, options: ControlsOptions) -> Self {
        let target = camera.target;
        let mut spherical = Spherical::from_offset(camera.eye - target);
        spherical.radius = spherical
            .radius
            .clamp(options.min_distance, options.max_distance);
        spherical.make_safe(POLAR_EPSILON);
        let mut controls = Self {
            camera,
            target,
            spherical,
            options,
            viewport: Vec2::ZERO,
            dragging: false,
            last_pointer: Vec2::ZERO,
            drag_travel: 0.0,
            listeners: Vec::new(),
            disposed: false,
        };
        controls.apply();
        controls
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    pub fn options(&self) -> &ControlsOptions {
        &self.options
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Pixels travelled by the pointer since the current (or last) drag began.
    pub fn drag_travel(&self) -> f32 {
        self.drag_travel
    }

    pub fn state(&self) -> CameraState {
        CameraState {
            target: self.target,
            radius: self.spherical.radius,
            theta: self.spherical.theta,
            phi: self.spherical.phi,
            min_distance: self.options.min_distance,
            max_distance: self.options.max_distance,
            dragging: self.dragging,
            auto_rotate: self.options.auto_rotate,
            auto_rotate_speed: self.options.auto_rotate_speed,
        }
    }

    /// Keep a listener registration alive until [`dispose`](Self::dispose).
    /// Guards attached after disposal are removed immediately.
    pub fn attach_listener(&mut self, guard: Box<dyn ListenerGuard>) {
        if self.disposed {
            guard.remove();
            return;
        }
        self.listeners.push(guard);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Record the viewport size in pixels. Zero sizes are accepted and simply
    /// disable rotation until a valid size arrives.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(0.0), height.max(0.0));
        if self.viewport.x > 0.0 && self.viewport.y > 0.0 {
            self.camera.aspect = self.viewport.x / self.viewport.y;
        }
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.options.auto_rotate = enabled;
    }

    pub fn set_auto_rotate_speed(&mut self, speed: f32) {
        self.options.auto_rotate_speed = speed;
    }

    pub fn set_enable_rotate(&mut self, enabled: bool) {
        self.options.enable_rotate = enabled;
        if !enabled {
            self.dragging = false;
        }
    }

    pub fn set_enable_zoom(&mut self, enabled: bool) {
        self.options.enable_zoom = enabled;
    }

    /// Move the orbit target, keeping the spherical offset.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.apply();
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.disposed || self.dragging || !self.options.enable_rotate {
            return;
        }
        self.dragging = true;
        self.last_pointer = Vec2::new(x, y);
        self.drag_travel = 0.0;
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.disposed || !self.dragging {
            return;
        }
        let pointer = Vec2::new(x, y);
        let delta = pointer - self.last_pointer;
        self.last_pointer = pointer;
        self.drag_travel += delta.length();
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return;
        }
        if delta == Vec2::ZERO {
            return;
        }
        let speed = self.options.rotate_speed;
        let theta = self.spherical.theta - TAU * delta.x / self.viewport.x * speed;
        self.spherical.theta = wrap_azimuth(theta);
        self.spherical.phi -= TAU * delta.y / self.viewport.y * speed;
        self.spherical.make_safe(POLAR_EPSILON);
        self.apply();
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    pub fn wheel(&mut self, delta_y: f32) {
        if self.disposed || !self.options.enable_zoom || delta_y == 0.0 || delta_y.is_nan() {
            return;
        }
        let factor = 1.0 + self.options.zoom_step * delta_y.signum();
        self.spherical.radius = (self.spherical.radius * factor)
            .clamp(self.options.min_distance, self.options.max_distance);
        self.apply();
    }

    /// Per-frame step. Advances the azimuth when auto-rotating and idle.
    pub fn update(&mut self) {
        if self.disposed || !self.options.auto_rotate || self.dragging {
            return;
        }
        self.spherical.theta = wrap_azimuth(
            self.spherical.theta + self.options.auto_rotate_speed * AUTO_ROTATE_INCREMENT,
        );
        self.apply();
    }

    /// Detach every registered listener and make further input inert.
    /// Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.dragging = false;
        let count = self.listeners.len();
        for guard in self.listeners.drain(..) {
            guard.remove();
        }
        log::info!("[controls] disposed, removed {} listener(s)", count);
    }

    fn apply(&mut self) {
        self.camera.target = self.target;
        self.camera.eye = self.target + self.spherical.to_offset();
    }
}

impl Drop for OrbitControls {
    fn drop(&mut self) {
        if !self.listeners.is_empty() {
            log::warn!(
                "[controls] dropped with {} attached listener(s); detaching",
                self.listeners.len()
            );
            self.dispose();
        }
    }
}

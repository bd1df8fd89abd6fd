use glam::Vec3;

// Shared camera/audio tuning constants used by both web and native frontends.

// Camera
pub const CAMERA_START: [f32; 3] = [0.0, 5.0, 40.0]; // initial eye position, looking at the origin
pub const CAMERA_FOVY_DEG: f32 = 60.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;

// Orbit controls
pub const MIN_DISTANCE: f32 = 5.0;
pub const MAX_DISTANCE: f32 = 100.0;
pub const ROTATE_SPEED: f32 = 0.5; // full-width drag turns 2π * ROTATE_SPEED
pub const ZOOM_STEP: f32 = 0.1; // ±10% radius per wheel notch
pub const POLAR_EPSILON: f32 = 1e-3; // keeps the polar angle off the poles
pub const AUTO_ROTATE_SPEED: f32 = 0.8;
pub const AUTO_ROTATE_INCREMENT: f32 = 0.01; // radians per frame at speed 1.0

// Element visuals
pub const ELEMENT_BASE_SCALE: f32 = 1.0;
pub const SELECTED_SCALE: f32 = 1.5;
pub const HOVER_SCALE: f32 = 1.15;
pub const PICK_SPHERE_RADIUS: f32 = 0.75; // ray-sphere radius for a unit element tile
pub const CLICK_SLOP_PX: f32 = 4.0; // pointer travel below this counts as a click, not a drag

// Backdrop
pub const STAR_COUNT: usize = 5000;
pub const STAR_RADIUS: f32 = 100.0;
pub const STAR_DEPTH: f32 = 50.0;
pub const STAR_SEED: u64 = 42;

// Tone player
pub const DEFAULT_VOLUME: f32 = 0.5;
pub const DEFAULT_ATTACK_SEC: f32 = 0.05;
pub const DEFAULT_RELEASE_SEC: f32 = 0.5;
pub const STOP_TAIL_SEC: f64 = 0.1; // oscillator keeps running this long after the envelope ends
pub const STOP_FADE_SEC: f64 = 0.05; // click-free fade used by an explicit stop
pub const SPECTRAL_MIN_HZ: f32 = 55.0;
pub const SPECTRAL_MAX_HZ: f32 = 7040.0;
pub const VOLUME_STEP: f32 = 0.1;

// Sequence playback
pub const SEQUENCE_LENGTH: usize = 20;
pub const SEQUENCE_INTERVAL_SEC: f32 = 1.0;
pub const SEQUENCE_HIGHLIGHT_SEC: f32 = 0.95; // highlight ends just before the next step

#[inline]
pub fn camera_start_vec3() -> Vec3 {
    Vec3::new(CAMERA_START[0], CAMERA_START[1], CAMERA_START[2])
}

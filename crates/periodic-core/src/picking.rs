//! Pointer picking: screen position -> world ray -> nearest element.

use crate::camera::Camera;
use glam::{Vec2, Vec3, Vec4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Nearest non-negative hit distance along a normalized ray.
#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t = -b - sq;
    if t >= 0.0 {
        return Some(t);
    }
    // origin inside the sphere
    let t_far = -b + sq;
    (t_far >= 0.0).then_some(t_far)
}

/// Pixel coordinates (origin top-left) to normalized device coordinates.
/// `None` for a zero-sized viewport.
#[inline]
pub fn ndc_from_pixels(sx: f32, sy: f32, width: f32, height: f32) -> Option<Vec2> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(Vec2::new((2.0 * sx / width) - 1.0, 1.0 - (2.0 * sy / height)))
}

/// World-space ray through a pixel of the viewport.
pub fn screen_to_world_ray(
    camera: &Camera,
    sx: f32,
    sy: f32,
    width: f32,
    height: f32,
) -> Option<Ray> {
    let ndc = ndc_from_pixels(sx, sy, width, height)?;
    let inv = camera.view_projection_matrix().inverse();
    let p_near = inv * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
    let p_far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
    if p_near.w == 0.0 || p_far.w == 0.0 {
        return None;
    }
    let p0: Vec3 = p_near.truncate() / p_near.w;
    let p1: Vec3 = p_far.truncate() / p_far.w;
    let dir = (p1 - p0).try_normalize()?;
    Some(Ray { origin: p0, dir })
}

/// Index and distance of the closest `(center, radius)` sphere hit by `ray`.
pub fn nearest_hit<I>(ray: &Ray, spheres: I) -> Option<(usize, f32)>
where
    I: IntoIterator<Item = (Vec3, f32)>,
{
    let mut best: Option<(usize, f32)> = None;
    for (i, (center, radius)) in spheres.into_iter().enumerate() {
        if let Some(t) = ray_sphere(ray.origin, ray.dir, center, radius) {
            if best.map_or(true, |(_, bt)| t < bt) {
                best = Some((i, t));
            }
        }
    }
    best
}

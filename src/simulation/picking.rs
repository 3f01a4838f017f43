//! Ray casting against body spheres for pointer picking

use crate::simulation::states::{Body, NVec3};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: NVec3,
    pub dir: NVec3, // unit length
}

impl Ray {
    /// Ray from `origin` along `dir`; `dir` is normalized here.
    ///
    /// Returns `None` when `dir` is (numerically) zero and has no direction.
    pub fn new(origin: NVec3, dir: NVec3) -> Option<Self> {
        let dir = dir.try_normalize(f64::EPSILON)?;
        Some(Self { origin, dir })
    }

    pub fn at(&self, t: f64) -> NVec3 {
        self.origin + self.dir * t
    }
}

/// Distance along `ray` to the first intersection with a sphere.
///
/// A ray starting inside the sphere hits its far side. Spheres entirely
/// behind the origin are missed.
pub fn ray_sphere(ray: &Ray, center: &NVec3, radius: f64) -> Option<f64> {
    let oc = ray.origin - center;
    let b = oc.dot(&ray.dir);
    let c = oc.norm_squared() - radius * radius;

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let mut t = -b - sqrt_d;
    // Nearest root behind the origin: try the far one (ray inside sphere)
    if t < 0.0 {
        t = -b + sqrt_d;
    }
    (t >= 0.0).then_some(t)
}

/// Index and distance of the nearest body sphere hit by `ray`
pub fn nearest_hit(ray: &Ray, bodies: &[Body]) -> Option<(usize, f64)> {
    bodies
        .iter()
        .enumerate()
        .filter_map(|(i, b)| ray_sphere(ray, &b.x, b.radius).map(|t| (i, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

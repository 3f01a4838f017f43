//! Core state types for the sphere simulation.
//!
//! - `Body`         one sphere: position, previous position, radius, charge
//! - `SphereSystem` the ordered body list and the frame counter
//!
//! Body 0 is the root: fixed, near-zero radius, and the anchor that
//! pointer picks pin to a position.

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec3, // position
    pub px: NVec3, // previous position (position verlet)
    pub radius: f64, // sphere radius
    pub charge: f64, // layout charge, negative repels
    pub fixed: bool, // excluded from layout displacement and collision correction
    pub pin: Option<NVec3>, // pinned target followed by fixed bodies
}

impl Body {
    /// A free body at `x` with no charge
    pub fn new(x: NVec3, radius: f64) -> Self {
        Self {
            x,
            px: x,
            radius,
            charge: 0.0,
            fixed: false,
            pin: None,
        }
    }

    /// A fixed body at `x`; the resolver and the layout never displace it
    pub fn fixed(x: NVec3, radius: f64) -> Self {
        Self {
            fixed: true,
            ..Self::new(x, radius)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SphereSystem {
    pub bodies: Vec<Body>, // bodies in insertion order, root first
    pub frame: u64, // completed steps
}

impl SphereSystem {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, frame: 0 }
    }

    /// Smallest `distance / (r1 + r2)` over all pairs of non-fixed bodies.
    ///
    /// Values below 1.0 mean at least one pair still overlaps. Returns
    /// `f64::INFINITY` when fewer than two non-fixed bodies exist.
    pub fn min_separation_ratio(&self) -> f64 {
        let mut ratio = f64::INFINITY;
        for (i, a) in self.bodies.iter().enumerate() {
            if a.fixed {
                continue;
            }
            for b in self.bodies.iter().skip(i + 1) {
                if b.fixed {
                    continue;
                }
                let sum_r = a.radius + b.radius;
                if sum_r <= 0.0 {
                    continue;
                }
                ratio = ratio.min((a.x - b.x).norm() / sum_r);
            }
        }
        ratio
    }

    /// Number of non-fixed pairs whose spheres overlap
    pub fn overlapping_pairs(&self) -> usize {
        let mut count = 0;
        for (i, a) in self.bodies.iter().enumerate() {
            if a.fixed {
                continue;
            }
            for b in self.bodies.iter().skip(i + 1) {
                if !b.fixed && (a.x - b.x).norm() < a.radius + b.radius {
                    count += 1;
                }
            }
        }
        count
    }

    /// True when every coordinate of every body is finite
    pub fn is_finite(&self) -> bool {
        self.bodies
            .iter()
            .all(|b| b.x.iter().all(|c| c.is_finite()) && b.px.iter().all(|c| c.is_finite()))
    }
}

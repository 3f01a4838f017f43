//! Force-directed layout driver
//!
//! Cools an `alpha` temperature each tick, applies the `ForceSet` scaled
//! by it, and advances bodies with position verlet and friction. Fixed
//! bodies follow their pin instead of integrating. Once alpha decays below
//! `alpha_min` the layout rests until `resume` heats it up again.

use rand::Rng;
use tracing::{debug, info};

use super::forces::{ChargeBarnesHut, ForceSet, Gravity};
use super::params::LayoutParams;
use super::states::{NVec3, SphereSystem};

pub struct ForceLayout {
    pub params: LayoutParams,
    pub forces: ForceSet,
    alpha: f64,
}

impl ForceLayout {
    /// Layout with the standard force set: gravity toward the centre of
    /// the extent, then Barnes–Hut charge
    pub fn new(params: LayoutParams) -> Self {
        let [w, h, d] = params.extent;
        let forces = ForceSet::new()
            .with(Gravity {
                strength: params.gravity,
                center: NVec3::new(w, h, d) * 0.5,
            })
            .with(ChargeBarnesHut {
                theta: params.theta,
                charge_distance: params.charge_distance,
            });
        Self::with_forces(params, forces)
    }

    /// Layout driving a custom force set
    pub fn with_forces(params: LayoutParams, forces: ForceSet) -> Self {
        Self {
            params,
            forces,
            alpha: 0.0,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.alpha > 0.0
    }

    /// Centre of the layout extent, where gravity pulls
    pub fn center(&self) -> NVec3 {
        let [w, h, d] = self.params.extent;
        NVec3::new(w, h, d) * 0.5
    }

    /// Place every body uniformly inside the extent and start cooling
    pub fn start<R: Rng>(&mut self, sys: &mut SphereSystem, rng: &mut R) {
        let [w, h, d] = self.params.extent;
        for b in sys.bodies.iter_mut() {
            b.x = NVec3::new(rng.gen::<f64>() * w, rng.gen::<f64>() * h, rng.gen::<f64>() * d);
            b.px = b.x;
        }
        info!(bodies = sys.bodies.len(), "layout started");
        self.resume();
    }

    /// Reheat to `alpha_start`
    pub fn resume(&mut self) {
        self.alpha = self.params.alpha_start;
    }

    pub fn stop(&mut self) {
        self.alpha = 0.0;
    }

    /// Advance the layout by one tick.
    ///
    /// Returns `false` without touching any body when the layout is at rest
    /// or cools to rest on this tick.
    pub fn tick(&mut self, sys: &mut SphereSystem) -> bool {
        if !self.is_running() {
            return false;
        }

        self.alpha *= self.params.alpha_decay;
        if self.alpha < self.params.alpha_min {
            self.alpha = 0.0;
            info!(frame = sys.frame, "layout at rest");
            return false;
        }

        self.forces.apply_all(self.alpha, sys);

        let friction = self.params.friction;
        for b in sys.bodies.iter_mut() {
            if b.fixed {
                // Pinned target wins, otherwise hold the previous position
                b.x = b.pin.unwrap_or(b.px);
                b.px = b.x;
            } else {
                // x_n+1 = x_n + (x_n - x_n-1) * friction
                let prev = b.px;
                b.px = b.x;
                b.x -= (prev - b.x) * friction;
            }
        }

        debug!(alpha = self.alpha, "layout tick");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::Body;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn free_system(n: usize) -> SphereSystem {
        SphereSystem::new((0..n).map(|_| Body::new(NVec3::zeros(), 1.0)).collect())
    }

    #[test]
    fn start_places_bodies_inside_extent() {
        let mut sys = free_system(100);
        let mut layout = ForceLayout::new(LayoutParams::default());
        layout.start(&mut sys, &mut StdRng::seed_from_u64(7));

        let [w, h, d] = layout.params.extent;
        for b in &sys.bodies {
            assert!((0.0..w).contains(&b.x.x));
            assert!((0.0..h).contains(&b.x.y));
            assert!((0.0..d).contains(&b.x.z));
            assert_eq!(b.x, b.px);
        }
        assert_eq!(layout.alpha(), 0.1);
    }

    #[test]
    fn alpha_cools_until_rest() {
        let mut sys = free_system(3);
        let mut layout = ForceLayout::new(LayoutParams::default());
        layout.start(&mut sys, &mut StdRng::seed_from_u64(1));

        let mut ticks = 0;
        while layout.tick(&mut sys) {
            ticks += 1;
            assert!(ticks < 1000);
        }
        // 0.1 * 0.99^n < 0.005 first holds at n = 299
        assert_eq!(ticks, 298);
        assert!(!layout.is_running());
        assert!(!layout.tick(&mut sys));
    }

    #[test]
    fn resume_reheats() {
        let mut layout = ForceLayout::new(LayoutParams::default());
        layout.stop();
        assert!(!layout.is_running());
        layout.resume();
        assert_eq!(layout.alpha(), layout.params.alpha_start);
    }

    #[test]
    fn verlet_carries_velocity_with_friction() {
        let mut sys = SphereSystem::new(vec![Body::new(NVec3::new(1.0, 0.0, 0.0), 1.0)]);
        sys.bodies[0].px = NVec3::zeros();
        let mut layout = ForceLayout::with_forces(LayoutParams::default(), ForceSet::new());
        layout.resume();
        layout.tick(&mut sys);

        assert!((sys.bodies[0].x.x - 1.9).abs() < 1e-12);
        assert_eq!(sys.bodies[0].px.x, 1.0);
    }

    #[test]
    fn fixed_body_follows_pin() {
        let mut root = Body::fixed(NVec3::zeros(), 0.1);
        root.pin = Some(NVec3::new(5.0, 6.0, 7.0));
        let mut sys = SphereSystem::new(vec![root]);
        let mut layout = ForceLayout::new(LayoutParams::default());
        layout.resume();
        layout.tick(&mut sys);

        assert_eq!(sys.bodies[0].x, NVec3::new(5.0, 6.0, 7.0));
        assert_eq!(sys.bodies[0].px, sys.bodies[0].x);
    }
}

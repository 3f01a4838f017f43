//! Build a fully-initialized simulation scenario from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - resolver parameters (`CollisionParams`)
//! - system state (`SphereSystem` with bodies placed by the layout)
//! - the force-directed layout (`ForceLayout`)
//!
//! The scenario is the whole simulation context: it is inserted into Bevy
//! as a `Resource` or driven directly by the headless loop, and nothing
//! else holds simulation state

use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::configuration::config::{ConfigError, ScenarioConfig};
use crate::simulation::engine::{step, Engine};
use crate::simulation::layout::ForceLayout;
use crate::simulation::params::CollisionParams;
use crate::simulation::picking::{nearest_hit, Ray};
use crate::simulation::states::{Body, NVec3, SphereSystem};

/// Index of the pick anchor
pub const ROOT: usize = 0;

/// Bevy resource representing a fully-initialized simulation scenario
#[derive(Resource)]
pub struct Scenario {
    pub engine: Engine,
    pub collision: CollisionParams,
    pub system: SphereSystem,
    pub layout: ForceLayout,
    pub seed: u64,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let b_cfg = &cfg.bodies;
        let mut rng = StdRng::seed_from_u64(b_cfg.seed);

        // Bodies: integer radii drawn once, body 0 becomes the fixed root
        let bodies: Vec<Body> = (0..b_cfg.count)
            .map(|i| {
                if i == ROOT {
                    let mut root = Body::fixed(NVec3::zeros(), b_cfg.root_radius);
                    root.charge = b_cfg.root_charge;
                    root
                } else {
                    let radius = rng.gen_range(b_cfg.radius_min..=b_cfg.radius_max);
                    let mut body = Body::new(NVec3::zeros(), f64::from(radius));
                    body.charge = b_cfg.charge;
                    body
                }
            })
            .collect();

        let mut system = SphereSystem::new(bodies);

        // Layout: initial placement inside the extent, starts hot
        let mut layout = ForceLayout::new(cfg.layout_params());
        layout.start(&mut system, &mut rng);

        let engine = Engine {
            octree: cfg.engine.octree,
            collide: cfg.engine.collide,
        };

        info!(
            bodies = system.bodies.len(),
            octree = engine.octree,
            collide = engine.collide,
            "scenario built"
        );

        Ok(Self {
            engine,
            collision: cfg.collision_params(),
            system,
            layout,
            seed: b_cfg.seed,
        })
    }

    /// One frame: layout tick, collision pass
    pub fn step(&mut self) {
        let Scenario {
            engine,
            collision,
            system,
            layout,
            ..
        } = self;
        step(system, layout, engine, collision);
    }

    /// Headless driver loop
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Nearest body hit by `ray`, if any
    pub fn raycast(&self, ray: &Ray) -> Option<usize> {
        nearest_hit(ray, &self.system.bodies).map(|(i, _)| i)
    }

    /// Pointer-pick feedback.
    ///
    /// A hit pins the root to the picked body's current position and
    /// reheats the layout. A miss leaves the root's last pin in place.
    pub fn pick(&mut self, hit: Option<usize>) {
        let Some(i) = hit else {
            return;
        };
        let Some(target) = self.system.bodies.get(i).map(|b| b.x) else {
            return;
        };
        if let Some(root) = self.system.bodies.get_mut(ROOT) {
            root.pin = Some(target);
        }
        self.layout.resume();
    }

    pub fn root(&self) -> &Body {
        &self.system.bodies[ROOT]
    }
}

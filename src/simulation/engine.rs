//! High-level runtime engine settings and the per-frame step
//!
//! Selects whether collisions are resolved and whether the octree or the
//! direct all-pairs scan is used. `step` is the single unit of work the
//! frame loop (viewer or headless driver) calls once per frame

use tracing::debug;

use super::collision::{resolve, resolve_direct};
use super::layout::ForceLayout;
use super::octree::Octree;
use super::params::CollisionParams;
use super::states::SphereSystem;

#[derive(Debug, Clone)]
pub struct Engine {
    pub octree: bool, // false = direct n^2 scan, true = octree-pruned
    pub collide: bool, // false = layout only
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            octree: true,
            collide: true,
        }
    }
}

/// Advance the simulation by one frame.
///
/// Layout tick, then one collision pass over a freshly built octree (or
/// the direct scan), then the frame counter.
pub fn step(sys: &mut SphereSystem, layout: &mut ForceLayout, engine: &Engine, params: &CollisionParams) {
    layout.tick(sys);

    if engine.collide {
        if engine.octree {
            let tree = Octree::build(&sys.bodies);
            resolve(&mut sys.bodies, &tree, params);
        } else {
            resolve_direct(&mut sys.bodies, params);
        }
    }

    sys.frame += 1;
    debug!(frame = sys.frame, alpha = layout.alpha(), "step");
}

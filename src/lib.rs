pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use simulation::states::{Body, SphereSystem, NVec3};
pub use simulation::params::{CollisionParams, LayoutParams};
pub use simulation::engine::{step, Engine};
pub use simulation::octree::{Octree, OctreeNode, OctreeVisitor, SpatialIndex};
pub use simulation::collision::{resolve, resolve_direct, separate, CollisionVisitor};
pub use simulation::forces::{ForceSet, LayoutForce, Gravity, ChargeBarnesHut};
pub use simulation::layout::ForceLayout;
pub use simulation::picking::{nearest_hit, ray_sphere, Ray};
pub use simulation::scenario::{Scenario, ROOT};

pub use configuration::config::{ConfigError, ScenarioConfig, EngineConfig, BodiesConfig, CollisionConfig, LayoutConfig};

pub use visualization::sphere_vis3d::run_3d;

pub use benchmark::benchmark::{bench_collide, bench_collide_curve};

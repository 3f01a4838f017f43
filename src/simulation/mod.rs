pub mod states;
pub mod params;
pub mod engine;
pub mod octree;
pub mod collision;
pub mod forces;
pub mod layout;
pub mod picking;
pub mod scenario;

//! Numerical parameters for the simulation
//!
//! `CollisionParams` tunes the resolver:
//! - padding added to a body's radius for the octree query box,
//! - damping applied to each pair's overlap correction
//!
//! `LayoutParams` tunes the force-directed layout:
//! - gravity toward the layout centre and friction on the verlet step,
//! - Barnes–Hut opening angle and charge cut-off distance,
//! - layout extent and the alpha cooling schedule

#[derive(Debug, Clone)]
pub struct CollisionParams {
    pub padding: f64, // added to the radius for the query box
    pub damping: f64, // fraction of the overlap each body absorbs
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self {
            padding: 16.0,
            damping: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutParams {
    pub gravity: f64, // pull toward the layout centre, scaled by alpha
    pub friction: f64, // velocity retained per tick
    pub theta: f64, // Barnes–Hut opening criterion
    pub charge_distance: f64, // charges beyond this distance are ignored
    pub extent: [f64; 3], // layout size, the centre is extent / 2
    pub alpha_start: f64, // temperature set by start/resume
    pub alpha_decay: f64, // multiplicative cooling per tick
    pub alpha_min: f64, // below this the layout rests
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            gravity: 0.05,
            friction: 0.9,
            theta: 0.8,
            charge_distance: f64::INFINITY,
            extent: [640.0, 360.0, 1.0],
            alpha_start: 0.1,
            alpha_decay: 0.99,
            alpha_min: 0.005,
        }
    }
}

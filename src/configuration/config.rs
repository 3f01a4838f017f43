//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]    – octree vs. direct collision scan, collisions on/off
//! - [`BodiesConfig`]    – how many bodies, their radii and charges, the seed
//! - [`CollisionConfig`] – resolver padding and damping
//! - [`LayoutConfig`]    – force-directed layout parameters
//! - [`ScenarioConfig`]  – top-level wrapper used to load a scenario from YAML
//!
//! Every section and field is optional and falls back to the defaults
//! below.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   octree: true            # false -> direct n^2 collision scan
//!   collide: true
//!
//! bodies:
//!   count: 150              # body 0 is the root
//!   radius_min: 50          # radii are integers drawn from min..=max
//!   radius_max: 100
//!   root_radius: 0.1
//!   root_charge: -5000.0
//!   charge: 0.0             # charge of every other body
//!   seed: 42
//!
//! collision:
//!   padding: 16.0           # added to the radius for the octree query
//!   damping: 0.5            # share of the overlap each body absorbs
//!
//! layout:
//!   gravity: 0.05
//!   friction: 0.9
//!   theta: 0.8
//!   charge_distance: ~      # unlimited
//!   extent: [640.0, 360.0, 1.0]
//! ```
//!
//! The scenario builder maps this configuration into the runtime
//! parameter structs.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::simulation::params::{CollisionParams, LayoutParams};

/// Errors raised while loading or validating a scenario
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// Collision engine options
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub octree: bool, // `true` - prune pairs with the octree, `false` - test every pair
    pub collide: bool, // `false` disables collision resolution entirely
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            octree: true,
            collide: true,
        }
    }
}

/// Body set generation
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BodiesConfig {
    pub count: usize,      // total bodies including the root
    pub radius_min: u32,   // smallest radius (inclusive)
    pub radius_max: u32,   // largest radius (inclusive)
    pub root_radius: f64,  // near-zero radius of the pick anchor
    pub root_charge: f64,  // layout charge of the root, negative repels
    pub charge: f64,       // layout charge of every other body
    pub seed: u64,         // deterministic seed for radii and placement
}

impl Default for BodiesConfig {
    fn default() -> Self {
        Self {
            count: 150,
            radius_min: 50,
            radius_max: 100,
            root_radius: 0.1,
            root_charge: -5000.0,
            charge: 0.0,
            seed: 42,
        }
    }
}

/// Resolver tuning
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CollisionConfig {
    pub padding: f64,
    pub damping: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        let p = CollisionParams::default();
        Self {
            padding: p.padding,
            damping: p.damping,
        }
    }
}

/// Force-directed layout tuning
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LayoutConfig {
    pub gravity: f64,
    pub friction: f64,
    pub theta: f64,
    pub charge_distance: Option<f64>, // `None` - unlimited
    pub extent: [f64; 3],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let p = LayoutParams::default();
        Self {
            gravity: p.gravity,
            friction: p.friction,
            theta: p.theta,
            charge_distance: None,
            extent: p.extent,
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub bodies: BodiesConfig,
    pub collision: CollisionConfig,
    pub layout: LayoutConfig,
}

impl ScenarioConfig {
    /// Read and validate a scenario file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        let cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: ScenarioConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.bodies;
        if b.count == 0 {
            return Err(ConfigError::Invalid("bodies.count must be at least 1".into()));
        }
        if b.radius_min == 0 || b.radius_min > b.radius_max {
            return Err(ConfigError::Invalid(format!(
                "bodies radius range {}..={} is empty or non-positive",
                b.radius_min, b.radius_max
            )));
        }
        if !(b.root_radius >= 0.0) {
            return Err(ConfigError::Invalid("bodies.root_radius must be >= 0".into()));
        }

        let c = &self.collision;
        if !(c.padding >= 0.0) {
            return Err(ConfigError::Invalid("collision.padding must be >= 0".into()));
        }
        if !(c.damping > 0.0 && c.damping <= 1.0) {
            return Err(ConfigError::Invalid("collision.damping must be in (0, 1]".into()));
        }

        let l = &self.layout;
        if !(0.0..=1.0).contains(&l.friction) {
            return Err(ConfigError::Invalid("layout.friction must be in [0, 1]".into()));
        }
        if !(l.theta > 0.0) {
            return Err(ConfigError::Invalid("layout.theta must be > 0".into()));
        }
        if l.charge_distance.is_some_and(|d| !(d > 0.0)) {
            return Err(ConfigError::Invalid("layout.charge_distance must be > 0".into()));
        }
        if l.extent.iter().any(|e| !(*e > 0.0)) {
            return Err(ConfigError::Invalid("layout.extent must be positive on every axis".into()));
        }
        Ok(())
    }

    pub fn collision_params(&self) -> CollisionParams {
        CollisionParams {
            padding: self.collision.padding,
            damping: self.collision.damping,
        }
    }

    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            gravity: self.layout.gravity,
            friction: self.layout.friction,
            theta: self.layout.theta,
            charge_distance: self.layout.charge_distance.unwrap_or(f64::INFINITY),
            extent: self.layout.extent,
            ..LayoutParams::default()
        }
    }
}

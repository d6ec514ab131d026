//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – broad-phase selection and resolution tuning
//! - [`ParametersConfig`] – physical constants and generation parameters
//! - [`BoundsConfig`]     – the shared arena rectangle
//! - [`GroupConfig`]      – one particle group (layout, shared attributes,
//!   optional setup-time randomization)
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   quadtree: true          # false -> all-pairs broad phase
//!   max_passes: 32          # resolution pass cap per tick
//!   max_objects: 5          # quadtree node capacity before split
//!   max_levels: 5           # quadtree depth limit
//!
//! parameters:
//!   gravity: 9.81           # added to vy each tick
//!   damping: 0.01           # per-tick velocity loss fraction
//!   min_velocity: 2.5       # snap-to-zero threshold
//!   separation_bias: 1.0    # extra push past touching on resolution
//!   spacing: 1.2            # honeycomb spacing factor
//!   seed: 42                # randomizer seed
//!
//! bounds: { x: 0, y: 0, w: 800, h: 800 }
//!
//! groups:
//!   - origin: { x: 50, y: 50, w: 400, h: 400 }
//!     radius: 30
//!     mass: 10
//!     elasticity: 0.8
//!     color: [255, 0, 0]
//!     randomize:
//!       mass: 3
//!       vx: 8
//!       elasticity: 0.1
//! ```
//!
//! The engine then maps this configuration into its runtime scenario
//! representation, which uses separate structs.

use serde::Deserialize;

/// Broad-phase and resolution-loop settings.
/// Omitted tunables fall back to the engine defaults.
#[derive(Deserialize, Debug)]
pub struct EngineConfig {
    pub quadtree: bool, // `false` - all-pairs, `true` - quadtree broad phase
    pub max_passes: Option<usize>, // resolution pass cap per tick
    pub max_objects: Option<usize>, // quadtree node capacity before split
    pub max_levels: Option<u32>, // quadtree subdivision depth limit
}

/// Global physical and generation parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub gravity: f64, // per-tick gravity
    pub damping: f64, // per-tick velocity loss fraction
    pub min_velocity: f64, // snap-to-zero threshold
    pub separation_bias: f64, // collision separation bias
    pub spacing: f64, // honeycomb spacing factor
    pub seed: u64, // deterministic seed to make runs reproducible
}

/// Rectangle as it appears in YAML (top-left corner plus extents)
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct BoundsConfig {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Setup-time randomization ranges, each applied as value +/- range/2.
/// Every field is optional; omitted quantities stay uniform.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct RandomizeConfig {
    pub mass: Option<f64>,
    pub radius: Option<f64>,
    pub elasticity: Option<f64>,
    pub vx: Option<f64>,
    pub vy: Option<f64>,
}

/// Configuration for a single particle group
#[derive(Deserialize, Debug)]
pub struct GroupConfig {
    pub origin: BoundsConfig, // generation rectangle, may differ from the arena
    pub radius: f64, // shared particle radius
    pub mass: f64, // shared particle mass
    pub elasticity: f64, // shared restitution in [0, 1]
    pub color: [u8; 3], // display-only RGB
    pub randomize: Option<RandomizeConfig>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // broad-phase and resolution settings
    pub parameters: ParametersConfig, // global physical parameters
    pub bounds: BoundsConfig, // arena shared by every group
    pub groups: Vec<GroupConfig>, // particle groups placed in the arena
}

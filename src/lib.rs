pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use simulation::states::{NVec2, Particle, Rect, Rgb};
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::integrator::{clamp_to_bounds, integrate, integrate_all};
pub use simulation::collision::{
    overlapping_pairs, resolve_overlaps, resolve_pair, AllPairs, BroadPhase, QuadtreeBroadPhase,
    ResolveReport,
};
pub use simulation::quadtree::Quadtree;
pub use simulation::group::ParticleGroup;
pub use simulation::scenario::Scenario;

pub use configuration::config::{
    BoundsConfig, EngineConfig, GroupConfig, ParametersConfig, RandomizeConfig, ScenarioConfig,
};

pub use benchmark::benchmark::{bench_resolution, bench_resolution_curve};

pub use error::{Result, SimError};

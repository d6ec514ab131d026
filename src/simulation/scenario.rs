//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! (`Scenario`) containing:
//! - engine settings (`Engine`)
//! - physical parameters (`Parameters`)
//! - the particle groups, generated and optionally randomized
//!
//! Groups share the arena rectangle by value and are otherwise
//! independent; the caller drives them through `Scenario::advance`.

use crate::configuration::config::{BoundsConfig, ScenarioConfig};
use crate::error::Result;
use crate::simulation::engine::Engine;
use crate::simulation::group::ParticleGroup;
use crate::simulation::params::Parameters;
use crate::simulation::states::Rect;

/// A fully-initialized runtime scenario.
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub groups: Vec<ParticleGroup>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let defaults = Engine::default();

        // Engine (runtime) from EngineConfig, defaults for omitted tunables
        let engine = Engine {
            quadtree: cfg.engine.quadtree,
            max_passes: cfg.engine.max_passes.unwrap_or(defaults.max_passes),
            max_objects: cfg.engine.max_objects.unwrap_or(defaults.max_objects),
            max_levels: cfg.engine.max_levels.unwrap_or(defaults.max_levels),
        };

        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            gravity: p_cfg.gravity,
            damping: p_cfg.damping,
            min_velocity: p_cfg.min_velocity,
            separation_bias: p_cfg.separation_bias,
            spacing: p_cfg.spacing,
            seed: p_cfg.seed,
        };

        engine.validate()?;
        parameters.validate()?;

        let bounds = rect_from(cfg.bounds);

        // Groups: generate each, then apply its setup-time randomizers
        let mut groups = Vec::with_capacity(cfg.groups.len());
        for g_cfg in cfg.groups {
            let mut group = ParticleGroup::new(
                rect_from(g_cfg.origin),
                g_cfg.radius,
                g_cfg.mass,
                g_cfg.elasticity,
                g_cfg.color,
                bounds,
                engine.clone(),
                parameters.clone(),
            )?;

            if let Some(ranges) = g_cfg.randomize {
                if let Some(range) = ranges.mass {
                    group.randomize_mass(range)?;
                }
                if let Some(range) = ranges.radius {
                    group.randomize_radius(range)?;
                }
                if let Some(range) = ranges.elasticity {
                    group.randomize_elasticity(range)?;
                }
                if let Some(range) = ranges.vx {
                    group.randomize_vx(range)?;
                }
                if let Some(range) = ranges.vy {
                    group.randomize_vy(range)?;
                }
            }

            groups.push(group);
        }

        Ok(Self {
            engine,
            parameters,
            groups,
        })
    }

    /// Advance every group one tick.
    pub fn advance(&mut self) {
        for group in &mut self.groups {
            group.advance();
        }
    }
}

fn rect_from(b: BoundsConfig) -> Rect {
    Rect::new(b.x, b.y, b.w, b.h)
}

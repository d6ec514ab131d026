//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - per-tick gravity and uniform linear damping,
//! - the minimum-velocity snap threshold that lets particles settle,
//! - the separation bias added to collision penetration,
//! - honeycomb generation spacing and the randomizer seed

use crate::error::{Result, SimError};

#[derive(Debug, Clone)]
pub struct Parameters {
    pub gravity: f64, // added to vy each tick
    pub damping: f64, // per-tick velocity loss fraction in [0, 1)
    pub min_velocity: f64, // components below this snap to exactly zero
    pub separation_bias: f64, // extra push past touching on resolution
    pub spacing: f64, // honeycomb spacing factor, 1.0 = touching
    pub seed: u64, // deterministic seed for the randomizers
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            damping: 0.01,
            min_velocity: 2.5,
            separation_bias: 1.0,
            spacing: 1.2,
            seed: 42,
        }
    }
}

impl Parameters {
    /// Reject values that would propagate NaN or stall the simulation.
    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() {
            return Err(SimError::Parameters(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        if !self.damping.is_finite() || !(0.0..1.0).contains(&self.damping) {
            return Err(SimError::Parameters(format!(
                "damping must be in [0, 1), got {}",
                self.damping
            )));
        }
        if !self.min_velocity.is_finite() || self.min_velocity < 0.0 {
            return Err(SimError::Parameters(format!(
                "min_velocity must be non-negative, got {}",
                self.min_velocity
            )));
        }
        if !self.separation_bias.is_finite() || self.separation_bias < 0.0 {
            return Err(SimError::Parameters(format!(
                "separation_bias must be non-negative, got {}",
                self.separation_bias
            )));
        }
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(SimError::Parameters(format!(
                "spacing must be positive, got {}",
                self.spacing
            )));
        }
        Ok(())
    }
}

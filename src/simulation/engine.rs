//! High-level runtime engine settings
//!
//! Selects the broad phase (quadtree or all-pairs), caps the per-tick
//! collision resolution loop, and tunes the quadtree subdivision limits

use crate::error::{Result, SimError};
use crate::simulation::quadtree::{MAX_LEVELS, MAX_OBJECTS};

#[derive(Debug, Clone)]
pub struct Engine {
    pub quadtree: bool, // false = all-pairs broad phase, true = quadtree
    pub max_passes: usize, // resolution pass cap per tick
    pub max_objects: usize, // node capacity before a quadtree split
    pub max_levels: u32, // quadtree subdivision depth limit
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            quadtree: true,
            max_passes: 32,
            max_objects: MAX_OBJECTS,
            max_levels: MAX_LEVELS,
        }
    }
}

impl Engine {
    pub fn validate(&self) -> Result<()> {
        if self.max_passes == 0 {
            return Err(SimError::Parameters(
                "max_passes must be at least 1".into(),
            ));
        }
        if self.max_objects == 0 {
            return Err(SimError::Parameters(
                "max_objects must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

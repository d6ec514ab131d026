//! Error types for the particle engine
//!
//! All failures are raised at construction or setup time; `advance()` never
//! fails. Degenerate collision geometry is handled deterministically inside
//! the resolver instead of surfacing here.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    /// Malformed generation rectangle or arena bounds
    #[error("invalid bounds: {0}")]
    Bounds(String),

    /// Non-positive radius/mass or elasticity outside [0, 1]
    #[error("invalid particle parameter: {0}")]
    Particle(String),

    /// Generation produced no particles or a particle cannot fit the arena
    #[error("invalid layout: {0}")]
    Layout(String),

    /// Randomizer range that could produce invalid particle state
    #[error("invalid randomization range: {0}")]
    Randomize(String),

    /// Invalid engine or physics parameter
    #[error("invalid parameters: {0}")]
    Parameters(String),
}

//! Fixed-step motion integration for the particle system
//!
//! Advances particles one tick in-place: boundary clamp on the
//! pre-integration state, gravity, uniform linear damping, the
//! minimum-velocity snap, then the position update. All functions are
//! driven by `Parameters` and the shared arena `Rect`.

use super::params::Parameters;
use super::states::{Particle, Rect};

/// Advance every particle one tick.
pub fn integrate_all(particles: &mut [Particle], params: &Parameters, bounds: &Rect) {
    for p in particles.iter_mut() {
        integrate(p, params, bounds);
    }
}

/// Advance a single particle one tick.
///
/// The boundary clamp runs on the pre-integration state, so a particle that
/// starts a tick outside the arena (or was left at a wall by a collision)
/// is reflected before forces apply and can never tunnel more than one step
/// past a wall. Gravity then damping act on velocity, any component whose
/// magnitude falls below `min_velocity` snaps to exactly zero (otherwise a
/// resting particle would jitter forever), and the position moves by the
/// resulting velocity.
pub fn integrate(p: &mut Particle, params: &Parameters, bounds: &Rect) {
    clamp_to_bounds(p, bounds);

    // gravity acts on y only
    p.v.y += params.gravity;

    // uniform linear damping on both axes
    p.v *= 1.0 - params.damping;

    snap_velocity(p, params.min_velocity);

    // x_n+1 = x_n + v_n+1
    p.x += p.v;
}

/// Reflect and pin a particle at the arena walls.
///
/// Each axis is handled independently: if the leading edge of the bounding
/// square crossed the near or far wall, the velocity component reflects
/// scaled by the particle's elasticity and the position is set exactly on
/// the wall (no overshoot is retained).
pub fn clamp_to_bounds(p: &mut Particle, bounds: &Rect) {
    let d = p.diameter();

    if p.x.x < bounds.x {
        p.v.x = -p.v.x * p.elasticity;
        p.x.x = bounds.x;
    } else if p.x.x + d > bounds.right() {
        p.v.x = -p.v.x * p.elasticity;
        p.x.x = bounds.right() - d;
    }

    if p.x.y < bounds.y {
        p.v.y = -p.v.y * p.elasticity;
        p.x.y = bounds.y;
    } else if p.x.y + d > bounds.bottom() {
        p.v.y = -p.v.y * p.elasticity;
        p.x.y = bounds.bottom() - d;
    }
}

/// Zero any velocity component below the snap threshold.
fn snap_velocity(p: &mut Particle, min_velocity: f64) {
    if p.v.x.abs() < min_velocity {
        p.v.x = 0.0;
    }
    if p.v.y.abs() < min_velocity {
        p.v.y = 0.0;
    }
}

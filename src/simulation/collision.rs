//! Collision detection and resolution for the particle engine
//!
//! Defines the broad-phase trait with direct (all-pairs) and
//! quadtree-backed implementations, the pairwise impulse response, and the
//! capped fixed-point loop that resolves overlaps until a full pass over
//! the system produces none.

use tracing::warn;

use crate::simulation::engine::Engine;
use crate::simulation::integrator::clamp_to_bounds;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::Quadtree;
use crate::simulation::states::{NVec2, Particle, Rect};

/// Candidate supplier for the narrow phase.
///
/// Implementations narrow the set of particles a query could overlap;
/// candidates are a superset and the exact [`Particle::overlaps`] test is
/// mandatory afterward. `refresh` is called at the start of every
/// resolution pass with the current positions.
pub trait BroadPhase {
    fn refresh(&mut self, particles: &[Particle], bounds: &Rect);

    /// Append candidate indices for `query` into `out`. May include the
    /// query itself; callers skip it.
    fn candidates(&self, query: usize, particles: &[Particle], out: &mut Vec<usize>);
}

/// Direct broad phase: every other particle is a candidate (n^2 pairs).
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn refresh(&mut self, _particles: &[Particle], _bounds: &Rect) {}

    fn candidates(&self, query: usize, particles: &[Particle], out: &mut Vec<usize>) {
        out.extend((0..particles.len()).filter(|&j| j != query));
    }
}

/// Quadtree broad phase.
///
/// Rebuilds the tree from scratch on every refresh; particles move every
/// pass, so there is nothing worth keeping between builds.
pub struct QuadtreeBroadPhase {
    max_objects: usize,
    max_levels: u32,
    tree: Option<Quadtree>,
}

impl QuadtreeBroadPhase {
    pub fn new(max_objects: usize, max_levels: u32) -> Self {
        Self {
            max_objects,
            max_levels,
            tree: None,
        }
    }
}

impl BroadPhase for QuadtreeBroadPhase {
    fn refresh(&mut self, particles: &[Particle], bounds: &Rect) {
        let mut tree = Quadtree::with_limits(*bounds, self.max_objects, self.max_levels);
        for i in 0..particles.len() {
            tree.insert(i, particles);
        }
        self.tree = Some(tree);
    }

    fn candidates(&self, query: usize, particles: &[Particle], out: &mut Vec<usize>) {
        if let Some(tree) = &self.tree {
            tree.retrieve(&particles[query], out);
        }
    }
}

/// Per-tick outcome of the resolution loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveReport {
    pub passes: usize, // passes executed this tick
    pub resolutions: usize, // pairs resolved across all passes
    pub deferred: usize, // overlapping pairs left when the cap was hit
}

/// Resolve a single overlapping pair with an elastic impulse along the
/// collision normal.
///
/// Order-independent: swapping `a` and `b` flips the normal and both signed
/// updates with it. The steps are:
///
/// 1. Unit normal from `a`'s center to `b`'s center; exactly coincident
///    centers fall back to the fixed normal (1, 0) so the pair still
///    separates deterministically.
/// 2. `impulse = 2 (v_a.n - v_b.n) / (m_a + m_b)`.
/// 3. Penetration depth plus `separation_bias`, so the pair ends the tick
///    strictly apart and floating round-off cannot re-trigger it.
/// 4. Positional correction along the normal, each particle displaced by
///    the *other's* mass share: the lighter particle moves further and the
///    pair's center of mass stays put.
/// 5. Velocity update scaled by `(1 + avg_elasticity) / 2`: an average of 1
///    swaps equal-mass head-on velocities exactly, an average of 0 leaves
///    both bodies at the common normal velocity.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle, params: &Parameters) {
    let delta = b.center() - a.center();
    let dist = delta.norm();
    let normal = if dist > 0.0 {
        delta / dist
    } else {
        NVec2::new(1.0, 0.0)
    };

    let total_mass = a.m + b.m;
    let v_a = a.v.dot(&normal);
    let v_b = b.v.dot(&normal);
    let impulse = 2.0 * (v_a - v_b) / total_mass;

    let penetration = (a.radius() + b.radius()) - dist + params.separation_bias;
    a.x -= penetration * (b.m / total_mass) * normal;
    b.x += penetration * (a.m / total_mass) * normal;

    let restitution = (1.0 + 0.5 * (a.elasticity + b.elasticity)) / 2.0;
    a.v -= impulse * b.m * restitution * normal;
    b.v += impulse * a.m * restitution * normal;
}

/// Run collision resolution to a fixed point, bounded by `engine.max_passes`.
///
/// Each pass refreshes the broad phase from current positions, scans every
/// particle, and resolves every truly-overlapping candidate pair; resolved
/// particles are re-clamped to the arena since a correction can push one
/// back into a wall. The loop ends when a pass resolves nothing. A
/// zero-resolution pass ran against a freshly built index, which is what
/// makes it a proof that no overlap remains.
///
/// Hitting the pass cap is not an error: remaining overlaps are counted
/// into [`ResolveReport::deferred`], logged, and carried to the next tick.
pub fn resolve_overlaps(
    particles: &mut [Particle],
    broad: &mut dyn BroadPhase,
    engine: &Engine,
    params: &Parameters,
    bounds: &Rect,
) -> ResolveReport {
    let mut report = ResolveReport::default();
    let mut candidates: Vec<usize> = Vec::new();

    loop {
        broad.refresh(particles, bounds);

        let mut resolved = 0usize;
        for i in 0..particles.len() {
            candidates.clear();
            broad.candidates(i, particles, &mut candidates);

            for &j in &candidates {
                if j == i {
                    continue;
                }
                if particles[i].overlaps(&particles[j]) {
                    // Copy both out so the pair can be mutated together,
                    // then write back
                    let mut a = particles[i];
                    let mut b = particles[j];
                    resolve_pair(&mut a, &mut b, params);
                    clamp_to_bounds(&mut a, bounds);
                    clamp_to_bounds(&mut b, bounds);
                    particles[i] = a;
                    particles[j] = b;
                    resolved += 1;
                }
            }
        }

        report.passes += 1;
        report.resolutions += resolved;

        if resolved == 0 {
            break;
        }
        if report.passes >= engine.max_passes {
            report.deferred = overlapping_pairs(particles).len();
            if report.deferred > 0 {
                warn!(
                    passes = report.passes,
                    deferred = report.deferred,
                    "collision resolution pass cap hit, deferring overlaps to next tick"
                );
            }
            break;
        }
    }

    report
}

/// Exact overlap scan over all unordered pairs.
///
/// The ground truth the broad phase is measured against; also used to count
/// deferred overlaps when the pass cap is hit.
pub fn overlapping_pairs(particles: &[Particle]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            if particles[i].overlaps(&particles[j]) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

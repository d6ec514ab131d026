//! Particle group: ownership and per-tick orchestration
//!
//! A `ParticleGroup` owns a fixed population of particles generated in a
//! honeycomb layout over its generation rectangle, all confined to a shared
//! arena rectangle. Each tick it integrates every particle, re-clamps them
//! to the arena, and drives the broad+narrow-phase resolution loop.
//!
//! Groups are physically independent: two groups never collide with each
//! other and share no mutable state, so separate groups may be advanced on
//! separate threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SimError};
use crate::simulation::collision::{
    resolve_overlaps, AllPairs, BroadPhase, QuadtreeBroadPhase, ResolveReport,
};
use crate::simulation::engine::Engine;
use crate::simulation::integrator;
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec2, Particle, Rect, Rgb};

pub struct ParticleGroup {
    origin: Rect, // generation rectangle, may differ from the arena
    radius: f64, // shared generation radius
    mass: f64, // shared generation mass
    elasticity: f64, // shared generation restitution
    color: Rgb,
    bounds: Rect, // arena every particle bounces in
    engine: Engine,
    params: Parameters,
    particles: Vec<Particle>,
    broad: Box<dyn BroadPhase + Send + Sync>,
    rng: StdRng,
    last_report: ResolveReport,
}

impl ParticleGroup {
    /// Build a group and generate its fixed particle population.
    ///
    /// The generation rectangle `origin` lays out the honeycomb; `bounds`
    /// is the arena the particles bounce in and may be a larger rectangle.
    /// Fails fast on inputs that would propagate NaN or break invariants.
    pub fn new(
        origin: Rect,
        radius: f64,
        mass: f64,
        elasticity: f64,
        color: Rgb,
        bounds: Rect,
        engine: Engine,
        params: Parameters,
    ) -> Result<Self> {
        if !origin.is_valid() {
            return Err(SimError::Bounds(format!(
                "generation rectangle must have positive extents, got {origin:?}"
            )));
        }
        if !bounds.is_valid() {
            return Err(SimError::Bounds(format!(
                "arena bounds must have positive extents, got {bounds:?}"
            )));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::Particle(format!(
                "radius must be positive, got {radius}"
            )));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(SimError::Particle(format!(
                "mass must be positive, got {mass}"
            )));
        }
        if !elasticity.is_finite() || !(0.0..=1.0).contains(&elasticity) {
            return Err(SimError::Particle(format!(
                "elasticity must be in [0, 1], got {elasticity}"
            )));
        }
        let diameter = 2.0 * radius;
        if diameter > bounds.w || diameter > bounds.h {
            return Err(SimError::Layout(format!(
                "particle diameter {diameter} exceeds arena extents {}x{}",
                bounds.w, bounds.h
            )));
        }
        params.validate()?;
        engine.validate()?;

        let particles = generate_honeycomb(&origin, radius, mass, elasticity, color, params.spacing);
        if particles.is_empty() {
            return Err(SimError::Layout(format!(
                "generation rectangle {}x{} holds no particle of diameter {diameter}",
                origin.w, origin.h
            )));
        }

        let broad: Box<dyn BroadPhase + Send + Sync> = if engine.quadtree {
            Box::new(QuadtreeBroadPhase::new(engine.max_objects, engine.max_levels))
        } else {
            Box::new(AllPairs)
        };

        let rng = StdRng::seed_from_u64(params.seed);

        Ok(Self {
            origin,
            radius,
            mass,
            elasticity,
            color,
            bounds,
            engine,
            params,
            particles,
            broad,
            rng,
            last_report: ResolveReport::default(),
        })
    }

    /// Advance the group one tick.
    ///
    /// Integrates every particle, clamps the whole population so the arena
    /// invariant holds at the tick boundary, then resolves overlaps to a
    /// fixed point (capped by the engine's pass limit).
    pub fn advance(&mut self) {
        integrator::integrate_all(&mut self.particles, &self.params, &self.bounds);

        for p in self.particles.iter_mut() {
            integrator::clamp_to_bounds(p, &self.bounds);
        }

        self.last_report = resolve_overlaps(
            &mut self.particles,
            self.broad.as_mut(),
            &self.engine,
            &self.params,
            &self.bounds,
        );
    }

    // read accessors ========================================================

    /// Read-only snapshot of the particles, in generation order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn origin(&self) -> Rect {
        self.origin
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Outcome of the most recent tick's resolution loop.
    pub fn last_report(&self) -> ResolveReport {
        self.last_report
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn total_mass(&self) -> f64 {
        self.particles.iter().map(|p| p.m).sum()
    }

    pub fn average_mass(&self) -> f64 {
        self.total_mass() / self.particles.len() as f64
    }

    /// Minimal rectangle enclosing every particle's bounding square.
    /// Recomputed on demand; display only.
    pub fn bounding_box(&self) -> Rect {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for p in &self.particles {
            let d = p.diameter();
            min_x = min_x.min(p.x.x);
            min_y = min_y.min(p.x.y);
            max_x = max_x.max(p.x.x + d);
            max_y = max_y.max(p.x.y + d);
        }

        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    // setup-time randomizers ================================================
    //
    // Each op shifts a quantity by value + (rand * range - range/2), i.e.
    // value +/- range/2, applied once before the simulation starts. Ranges
    // that could produce invalid state are rejected up front.

    pub fn randomize_mass(&mut self, range: f64) -> Result<()> {
        check_range(range)?;
        if range >= 2.0 * self.mass {
            return Err(SimError::Randomize(format!(
                "mass range {range} could drive mass {} to zero or below",
                self.mass
            )));
        }
        for p in self.particles.iter_mut() {
            p.m += self.rng.gen::<f64>() * range - range / 2.0;
        }
        Ok(())
    }

    pub fn randomize_radius(&mut self, range: f64) -> Result<()> {
        check_range(range)?;
        if range >= 2.0 * self.radius {
            return Err(SimError::Randomize(format!(
                "radius range {range} could drive radius {} to zero or below",
                self.radius
            )));
        }
        for p in self.particles.iter_mut() {
            let r = p.radius() + self.rng.gen::<f64>() * range - range / 2.0;
            p.set_radius(r); // diameter follows
        }
        Ok(())
    }

    pub fn randomize_elasticity(&mut self, range: f64) -> Result<()> {
        check_range(range)?;
        let half = range / 2.0;
        if self.elasticity - half < 0.0 || self.elasticity + half > 1.0 {
            return Err(SimError::Randomize(format!(
                "elasticity range {range} leaves [0, 1] around {}",
                self.elasticity
            )));
        }
        for p in self.particles.iter_mut() {
            p.elasticity += self.rng.gen::<f64>() * range - range / 2.0;
        }
        Ok(())
    }

    pub fn randomize_vx(&mut self, range: f64) -> Result<()> {
        check_range(range)?;
        for p in self.particles.iter_mut() {
            p.v.x += self.rng.gen::<f64>() * range - range / 2.0;
        }
        Ok(())
    }

    pub fn randomize_vy(&mut self, range: f64) -> Result<()> {
        check_range(range)?;
        for p in self.particles.iter_mut() {
            p.v.y += self.rng.gen::<f64>() * range - range / 2.0;
        }
        Ok(())
    }
}

/// Lay particles in a honeycomb pattern across the generation rectangle.
///
/// Rows are spaced `diameter * sqrt(3)/2 * spacing` apart and odd rows are
/// offset by half a diameter, so each particle nestles between the two
/// above it. Spacing above 1.0 guarantees no initial contact. The layout
/// fixes the population; it is not reconfigurable after construction.
fn generate_honeycomb(
    origin: &Rect,
    radius: f64,
    mass: f64,
    elasticity: f64,
    color: Rgb,
    spacing: f64,
) -> Vec<Particle> {
    let diameter = 2.0 * radius;
    let step_x = diameter * spacing;
    let step_y = diameter * (3.0f64.sqrt() / 2.0) * spacing;

    let mut particles = Vec::new();
    let mut row = 0usize;
    let mut y = origin.y;

    while y + diameter <= origin.bottom() {
        let offset = if row % 2 == 1 { diameter / 2.0 } else { 0.0 };
        let mut x = origin.x + offset;

        while x + diameter <= origin.right() {
            particles.push(Particle::new(NVec2::new(x, y), radius, mass, elasticity, color));
            x += step_x;
        }

        y += step_y;
        row += 1;
    }

    particles
}

fn check_range(range: f64) -> Result<()> {
    if !range.is_finite() || range < 0.0 {
        return Err(SimError::Randomize(format!(
            "range must be non-negative, got {range}"
        )));
    }
    Ok(())
}

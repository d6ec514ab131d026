//! Core state types for the particle simulation.
//!
//! Defines the particle and rectangle structs:
//! - `Particle` using `NVec2` (position is the top-left corner of the
//!   particle's bounding square, center is `x + (r, r)`)
//! - `Rect` for generation rectangles, arena bounds, and quadtree quadrants
//!
//! The diameter is cached next to the radius and recomputed whenever the
//! radius changes.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// Display-only RGB color carried by each particle.
pub type Rgb = [u8; 3];

/// Axis-aligned rectangle given as top-left corner plus extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64, // left edge
    pub y: f64, // top edge
    pub w: f64, // width
    pub h: f64, // height
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge coordinate
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Finite with strictly positive extents
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.w.is_finite()
            && self.h.is_finite()
            && self.w > 0.0
            && self.h > 0.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub x: NVec2, // position, top-left corner of the bounding square
    pub v: NVec2, // velocity
    pub m: f64, // mass
    pub elasticity: f64, // restitution in [0, 1]
    pub color: Rgb, // display only, never consulted by physics
    r: f64, // radius
    d: f64, // diameter, kept equal to 2 * r
}

impl Particle {
    pub fn new(x: NVec2, r: f64, m: f64, elasticity: f64, color: Rgb) -> Self {
        Self {
            x,
            v: NVec2::zeros(),
            m,
            elasticity,
            color,
            r,
            d: 2.0 * r,
        }
    }

    pub fn radius(&self) -> f64 {
        self.r
    }

    pub fn diameter(&self) -> f64 {
        self.d
    }

    /// Change the radius; the cached diameter follows.
    pub fn set_radius(&mut self, r: f64) {
        self.r = r;
        self.d = 2.0 * r;
    }

    /// Center of the particle's disc
    pub fn center(&self) -> NVec2 {
        NVec2::new(self.x.x + self.r, self.x.y + self.r)
    }

    /// True iff the discs overlap: center distance strictly below the sum
    /// of radii. Pure predicate, no mutation.
    pub fn overlaps(&self, other: &Particle) -> bool {
        let delta = other.center() - self.center();
        delta.norm() < self.r + other.r
    }
}

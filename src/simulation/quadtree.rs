//! # Quadtree spatial index (2D)
//!
//! This module implements the broad-phase **quadtree** used to cut the
//! naive `O(N²)` all-pairs overlap test down to near-linear: only particles
//! whose containing regions overlap are compared in the narrow phase.
//!
//! ## Core Concepts
//!
//! - The simulation rectangle is recursively subdivided into 4 quadrants.
//! - Each quadrant becomes a node of the tree.
//! - A node stores the particles that fit nowhere deeper: either the node is
//!   a leaf, or the particle's bounding square straddles the node's
//!   midlines and cannot be pushed into a single child.
//! - A node splits into 4 equal children once its local list exceeds
//!   `max_objects` and its level is below `max_levels`; on split, local
//!   objects that fit entirely inside one child are redistributed, and
//!   straddlers stay local. No particle is ever stored twice.
//!
//! The tree is rebuilt from scratch for every use (particles move every
//! tick, so there is no incremental update), and `retrieve` returns a
//! candidate superset: the exact overlap predicate must still be applied.

use crate::simulation::states::{Particle, Rect};

/// Node capacity before a split is attempted.
pub const MAX_OBJECTS: usize = 5;
/// Maximum subdivision depth; the root is level 0.
pub const MAX_LEVELS: u32 = 5;

/// A single quadtree node.
///
/// Nodes live in [`Quadtree::nodes`] and reference their children by index
/// into that same vector. `objects` holds indices into the caller's
/// particle slice, so the tree itself stores no particle data.
pub struct QuadNode {
    pub bounds: Rect,
    pub level: u32,
    pub objects: Vec<usize>, // indices into the caller's particle slice
    pub children: Option<[usize; 4]>, // NE, NW, SW, SE
}

/// An arena-backed quadtree over a slice of particles.
///
/// This structure owns:
/// - a vector of all nodes (`nodes`)
/// - an index into that list representing the root (`root`)
pub struct Quadtree {
    nodes: Vec<QuadNode>,
    root: usize,
    max_objects: usize,
    max_levels: u32,
}

impl Quadtree {
    /// Create an empty tree over `bounds` with the default limits.
    pub fn new(bounds: Rect) -> Self {
        Self::with_limits(bounds, MAX_OBJECTS, MAX_LEVELS)
    }

    /// Create an empty tree with custom capacity and depth limits.
    ///
    /// Larger limits trade memory for fewer broad-phase false positives.
    pub fn with_limits(bounds: Rect, max_objects: usize, max_levels: u32) -> Self {
        let nodes = vec![QuadNode {
            bounds,
            level: 0,
            objects: Vec::new(),
            children: None,
        }];

        Self {
            nodes,
            root: 0,
            max_objects,
            max_levels,
        }
    }

    /// Build a tree over every particle in `particles`.
    pub fn build(particles: &[Particle], bounds: Rect) -> Self {
        let mut tree = Self::new(bounds);
        for i in 0..particles.len() {
            tree.insert(i, particles);
        }
        tree
    }

    /// Insert the particle at `particle_idx`, walking down from the root.
    ///
    /// The particle sinks into the single child quadrant that fully contains
    /// its bounding square; if no child contains it, it stays at the current
    /// node. A node whose local list grows past `max_objects` (below
    /// `max_levels`) splits and redistributes whatever now fits a child.
    pub fn insert(&mut self, particle_idx: usize, particles: &[Particle]) {
        self.insert_at(self.root, particle_idx, particles);
    }

    fn insert_at(&mut self, node_idx: usize, particle_idx: usize, particles: &[Particle]) {
        // Copy bounds out by value so no &self borrow is held while recursing
        let bounds = self.nodes[node_idx].bounds;

        if let Some(children) = self.nodes[node_idx].children {
            if let Some(slot) = quadrant_for(&bounds, &particles[particle_idx]) {
                return self.insert_at(children[slot], particle_idx, particles);
            }
        }

        self.nodes[node_idx].objects.push(particle_idx);

        let level = self.nodes[node_idx].level;
        if self.nodes[node_idx].objects.len() > self.max_objects && level < self.max_levels {
            if self.nodes[node_idx].children.is_none() {
                self.split(node_idx);
            }
            let children = self.nodes[node_idx].children.unwrap(); // set just above

            // Redistribute local objects that fit entirely in one child;
            // straddlers keep their spot in this node
            let mut i = 0;
            while i < self.nodes[node_idx].objects.len() {
                let obj = self.nodes[node_idx].objects[i];
                match quadrant_for(&bounds, &particles[obj]) {
                    Some(slot) => {
                        self.nodes[node_idx].objects.remove(i);
                        self.insert_at(children[slot], obj, particles);
                    }
                    None => i += 1,
                }
            }
        }
    }

    /// Collect broad-phase candidates for a query particle.
    ///
    /// Walks from the root down the single child chain whose quadrant fully
    /// contains the query's bounding square, appending every visited node's
    /// local list to `out`. The result is a superset of the true neighbor
    /// set (and may include the query itself); callers must still apply the
    /// exact overlap test.
    pub fn retrieve(&self, p: &Particle, out: &mut Vec<usize>) {
        self.retrieve_at(self.root, p, out);
    }

    fn retrieve_at(&self, node_idx: usize, p: &Particle, out: &mut Vec<usize>) {
        let node = &self.nodes[node_idx];

        if let Some(children) = node.children {
            if let Some(slot) = quadrant_for(&node.bounds, p) {
                self.retrieve_at(children[slot], p, out);
            }
        }

        out.extend_from_slice(&node.objects);
    }

    /// Empty the tree, keeping only a bare root over the same bounds.
    ///
    /// Only useful when a tree is reused across builds; the default policy
    /// constructs a fresh tree instead.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[self.root].objects.clear();
        self.nodes[self.root].children = None;
    }

    /// Number of nodes currently allocated (root included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Particles stored directly at the root (straddlers plus pre-split
    /// residents).
    pub fn root_objects(&self) -> &[usize] {
        &self.nodes[self.root].objects
    }

    /// Subdivide a node into 4 equal child quadrants.
    ///
    /// Children are appended to the arena in NE, NW, SW, SE order and the
    /// parent keeps their indices. The parent's local list is untouched
    /// here; redistribution happens in `insert_at`.
    fn split(&mut self, node_idx: usize) {
        let b = self.nodes[node_idx].bounds;
        let level = self.nodes[node_idx].level;
        let hw = b.w / 2.0;
        let hh = b.h / 2.0;

        let quads = [
            Rect::new(b.x + hw, b.y, hw, hh), // NE
            Rect::new(b.x, b.y, hw, hh), // NW
            Rect::new(b.x, b.y + hh, hw, hh), // SW
            Rect::new(b.x + hw, b.y + hh, hw, hh), // SE
        ];

        let mut children = [0usize; 4];
        for (slot, quad) in quads.iter().enumerate() {
            children[slot] = self.nodes.len();
            self.nodes.push(QuadNode {
                bounds: *quad,
                level: level + 1,
                objects: Vec::new(),
                children: None,
            });
        }
        self.nodes[node_idx].children = Some(children);
    }
}

// helpers ===========================================================================

/// Child quadrant slot (NE=0, NW=1, SW=2, SE=3) whose rectangle fully
/// contains the particle's bounding square, or `None` for a straddler.
///
/// The tests compare the square against the node midlines with strict
/// inequalities, so a square touching a midline stays at the current node.
fn quadrant_for(bounds: &Rect, p: &Particle) -> Option<usize> {
    let vmid = bounds.x + bounds.w / 2.0;
    let hmid = bounds.y + bounds.h / 2.0;
    let d = p.diameter();

    let top = p.x.y < hmid && p.x.y + d < hmid;
    let bottom = p.x.y > hmid;
    let left = p.x.x < vmid && p.x.x + d < vmid;
    let right = p.x.x > vmid;

    if left {
        if top {
            return Some(1);
        }
        if bottom {
            return Some(2);
        }
    } else if right {
        if top {
            return Some(0);
        }
        if bottom {
            return Some(3);
        }
    }

    None
}

use std::time::Instant;

use crate::simulation::collision::{resolve_overlaps, AllPairs, QuadtreeBroadPhase};
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec2, Particle, Rect};

/// Helper to build a deterministic arena of `n` scattered particles
/// (sin/cos placement, no rand needed)
fn make_particles(n: usize, bounds: &Rect) -> Vec<Particle> {
    let mut particles = Vec::with_capacity(n);

    for i in 0..n {
        let i_f = i as f64;
        let px = bounds.x + (0.5 + 0.45 * (i_f * 0.37).sin()) * (bounds.w - 10.0);
        let py = bounds.y + (0.5 + 0.45 * (i_f * 0.13).cos()) * (bounds.h - 10.0);

        let mut p = Particle::new(NVec2::new(px, py), 5.0, 1.0, 0.8, [255, 255, 255]);
        p.v = NVec2::new((i_f * 0.07).sin() * 4.0, (i_f * 0.11).cos() * 4.0);
        particles.push(p);
    }

    particles
}

fn make_engine(quadtree: bool) -> Engine {
    Engine {
        quadtree,
        ..Engine::default()
    }
}

/// Compare one tick of collision resolution, all-pairs vs quadtree.
pub fn bench_resolution() {
    // Different population sizes to test
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let bounds = Rect::new(0.0, 0.0, 2000.0, 2000.0);
    let params = Parameters::default();

    for n in ns {
        let template = make_particles(n, &bounds);

        // All-pairs broad phase
        let engine_direct = make_engine(false);
        let mut direct = AllPairs;

        // Warm up
        let mut particles = template.clone();
        resolve_overlaps(&mut particles, &mut direct, &engine_direct, &params, &bounds);

        let mut particles = template.clone();
        let t0 = Instant::now();
        resolve_overlaps(&mut particles, &mut direct, &engine_direct, &params, &bounds);
        let dt_direct = t0.elapsed().as_secs_f64();

        // Quadtree broad phase
        let engine_tree = make_engine(true);
        let mut tree = QuadtreeBroadPhase::new(engine_tree.max_objects, engine_tree.max_levels);

        let mut particles = template.clone();
        resolve_overlaps(&mut particles, &mut tree, &engine_tree, &params, &bounds);

        let mut particles = template.clone();
        let t1 = Instant::now();
        resolve_overlaps(&mut particles, &mut tree, &engine_tree, &params, &bounds);
        let dt_tree = t1.elapsed().as_secs_f64();

        println!(
            "N = {n:5}, direct = {:8.6} s, quadtree = {:8.6} s",
            dt_direct, dt_tree
        );
    }
}

/// Benchmark resolution across a range of n
/// Paste output directly into a spreadsheet to graph
pub fn bench_resolution_curve() {
    println!("N,direct_ms,quadtree_ms");

    let bounds = Rect::new(0.0, 0.0, 2000.0, 2000.0);
    let params = Parameters::default();

    // Steps of 200 to give a smoother graph
    for n in (200..=6400).step_by(200) {
        // Small n: average over a few runs to smooth noise
        let reps = if n <= 800 { 5 } else { 1 };

        let template = make_particles(n, &bounds);

        // All-pairs broad phase
        let engine_direct = make_engine(false);
        let mut direct = AllPairs;
        let mut particles = template.clone();

        let t0 = Instant::now();
        for _ in 0..reps {
            resolve_overlaps(&mut particles, &mut direct, &engine_direct, &params, &bounds);
        }
        let ms_direct = t0.elapsed().as_secs_f64() * 1000.0 / reps as f64;

        // Quadtree broad phase
        let engine_tree = make_engine(true);
        let mut tree = QuadtreeBroadPhase::new(engine_tree.max_objects, engine_tree.max_levels);
        let mut particles = template.clone();

        let t1 = Instant::now();
        for _ in 0..reps {
            resolve_overlaps(&mut particles, &mut tree, &engine_tree, &params, &bounds);
        }
        let ms_tree = t1.elapsed().as_secs_f64() * 1000.0 / reps as f64;

        println!("{},{:.6},{:.6}", n, ms_direct, ms_tree);
    }
}

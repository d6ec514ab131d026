use std::collections::BTreeSet;

use ppsim::simulation::collision::{overlapping_pairs, resolve_pair};
use ppsim::simulation::engine::Engine;
use ppsim::simulation::group::ParticleGroup;
use ppsim::simulation::integrator::{clamp_to_bounds, integrate};
use ppsim::simulation::params::Parameters;
use ppsim::simulation::quadtree::Quadtree;
use ppsim::simulation::scenario::Scenario;
use ppsim::simulation::states::{NVec2, Particle, Rect};
use ppsim::ScenarioConfig;

/// Build a single particle at (x, y) with zero velocity
pub fn make_particle(x: f64, y: f64, r: f64, m: f64, e: f64) -> Particle {
    Particle::new(NVec2::new(x, y), r, m, e, [255, 255, 255])
}

/// Default physics parameters for tests
pub fn test_params() -> Parameters {
    Parameters::default()
}

/// The 800x800 arena used by most tests
pub fn arena() -> Rect {
    Rect::new(0.0, 0.0, 800.0, 800.0)
}

/// Build a group over `origin` with shared radius/mass/elasticity
pub fn make_group(origin: Rect, r: f64, m: f64, e: f64) -> ParticleGroup {
    ParticleGroup::new(
        origin,
        r,
        m,
        e,
        [255, 0, 0],
        arena(),
        Engine::default(),
        test_params(),
    )
    .expect("group construction failed")
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn integrator_applies_gravity_then_damping() {
    let p0 = make_particle(100.0, 100.0, 10.0, 10.0, 0.8);
    let mut p = p0;
    let params = test_params();

    integrate(&mut p, &params, &arena());

    let expected_vy = 9.81 * 0.99;
    assert!(
        (p.v.y - expected_vy).abs() < 1e-12,
        "vy after one tick: expected {expected_vy}, got {}",
        p.v.y
    );
    assert_eq!(p.v.x, 0.0);
    assert!((p.x.y - (100.0 + expected_vy)).abs() < 1e-12);
    assert_eq!(p.x.x, 100.0, "no horizontal force, x must not move");
}

#[test]
fn integrator_snaps_sub_threshold_components_to_zero() {
    let mut p = make_particle(100.0, 100.0, 10.0, 10.0, 0.8);
    p.v = NVec2::new(1.0, -20.0);
    let params = test_params();

    integrate(&mut p, &params, &arena());

    // 1.0 * 0.99 is below the 2.5 threshold; the y component is not
    assert_eq!(p.v.x, 0.0, "small vx must snap to exactly zero");
    let expected_vy = (-20.0 + 9.81) * 0.99;
    assert!((p.v.y - expected_vy).abs() < 1e-12);
}

#[test]
fn clamp_reflects_at_far_wall() {
    let mut p = make_particle(795.0, 100.0, 10.0, 10.0, 0.8);
    p.v = NVec2::new(12.0, 0.0);

    clamp_to_bounds(&mut p, &arena());

    assert!((p.v.x + 12.0 * 0.8).abs() < 1e-12, "vx must reflect scaled by elasticity");
    assert_eq!(p.x.x, 780.0, "position must pin exactly to the wall");
}

#[test]
fn clamp_repairs_out_of_bounds_placement() {
    let mut p = make_particle(-30.0, -10.0, 10.0, 10.0, 0.8);
    p.v = NVec2::new(-5.0, -2.0);

    clamp_to_bounds(&mut p, &arena());

    assert_eq!(p.x.x, 0.0);
    assert_eq!(p.x.y, 0.0);
    assert!((p.v.x - 4.0).abs() < 1e-12);
    assert!((p.v.y - 1.6).abs() < 1e-12);
}

// ==================================================================================
// Collision resolution tests
// ==================================================================================

#[test]
fn equal_mass_elastic_pair_swaps_velocities() {
    let mut a = make_particle(0.0, 0.0, 10.0, 5.0, 1.0);
    let mut b = make_particle(15.0, 0.0, 10.0, 5.0, 1.0);
    a.v = NVec2::new(5.0, 0.0);
    b.v = NVec2::new(-5.0, 0.0);

    resolve_pair(&mut a, &mut b, &test_params());

    assert!((a.v.x + 5.0).abs() < 1e-9, "a must leave with b's velocity, got {}", a.v.x);
    assert!((b.v.x - 5.0).abs() < 1e-9, "b must leave with a's velocity, got {}", b.v.x);
    assert_eq!(a.v.y, 0.0);
    assert_eq!(b.v.y, 0.0);
    assert!(!a.overlaps(&b), "separation bias must leave the pair apart");
}

#[test]
fn fully_inelastic_pair_shares_normal_velocity() {
    let mut a = make_particle(0.0, 0.0, 10.0, 3.0, 0.0);
    let mut b = make_particle(15.0, 0.0, 10.0, 5.0, 0.0);
    a.v = NVec2::new(4.0, 0.0);
    b.v = NVec2::new(-2.0, 0.0);

    resolve_pair(&mut a, &mut b, &test_params());

    assert!(
        (a.v.x - b.v.x).abs() < 1e-9,
        "zero elasticity must leave a common normal velocity: {} vs {}",
        a.v.x,
        b.v.x
    );
}

#[test]
fn resolution_conserves_momentum_and_center_of_mass() {
    let mut a = make_particle(100.0, 100.0, 10.0, 3.0, 0.7);
    let mut b = make_particle(112.0, 105.0, 10.0, 7.0, 0.4);
    a.v = NVec2::new(2.0, -1.0);
    b.v = NVec2::new(-3.0, 0.5);
    assert!(a.overlaps(&b), "test pair must start overlapping");

    let momentum_before = a.m * a.v + b.m * b.v;
    let com_before = (a.m * a.center() + b.m * b.center()) / (a.m + b.m);

    resolve_pair(&mut a, &mut b, &test_params());

    let momentum_after = a.m * a.v + b.m * b.v;
    let com_after = (a.m * a.center() + b.m * b.center()) / (a.m + b.m);

    assert!(
        (momentum_after - momentum_before).norm() < 1e-9,
        "momentum drift: {:?}",
        momentum_after - momentum_before
    );
    assert!(
        (com_after - com_before).norm() < 1e-9,
        "positional correction moved the center of mass"
    );
}

#[test]
fn coincident_pair_separates_deterministically() {
    let mut a = make_particle(50.0, 50.0, 10.0, 5.0, 0.8);
    let mut b = make_particle(50.0, 50.0, 10.0, 5.0, 0.8);

    resolve_pair(&mut a, &mut b, &test_params());

    assert!(a.x.x.is_finite() && b.x.x.is_finite(), "degenerate pair produced non-finite state");
    assert!(!a.overlaps(&b));
    // fallback normal is +x, so the pair splits horizontally
    assert!(a.x.x < b.x.x);
    assert_eq!(a.x.y, 50.0);
    assert_eq!(b.x.y, 50.0);
}

// ==================================================================================
// Quadtree tests
// ==================================================================================

#[test]
fn quadtree_splits_once_capacity_is_exceeded() {
    let bounds = arena();
    // Six particles spread over all four quadrants: the sixth insert
    // overflows the root, and no child overflows in turn
    let positions = [
        (600.0, 50.0),
        (700.0, 100.0),
        (50.0, 50.0),
        (150.0, 100.0),
        (50.0, 600.0),
        (600.0, 600.0),
    ];
    let particles: Vec<Particle> = positions
        .iter()
        .map(|&(x, y)| make_particle(x, y, 5.0, 1.0, 0.8))
        .collect();

    let tree = Quadtree::build(&particles, bounds);

    assert_eq!(tree.node_count(), 5, "root plus four children expected");
    assert!(
        tree.root_objects().is_empty(),
        "every particle fits a child, so the root list must empty"
    );
}

#[test]
fn quadtree_straddler_stays_at_parent() {
    let bounds = arena();
    let mut particles = vec![make_particle(395.0, 395.0, 5.0, 1.0, 0.8)]; // spans both midlines
    for i in 0..5 {
        particles.push(make_particle(50.0 + 12.0 * i as f64, 50.0, 5.0, 1.0, 0.8));
    }

    let tree = Quadtree::build(&particles, bounds);

    assert!(tree.node_count() > 1, "capacity overflow must split the root");
    assert_eq!(
        tree.root_objects(),
        &[0],
        "the straddling particle must stay at the root, never duplicated"
    );
}

#[test]
fn quadtree_retrieve_collects_locals_along_the_path() {
    let bounds = arena();
    let mut particles = vec![make_particle(395.0, 395.0, 5.0, 1.0, 0.8)];
    for i in 0..5 {
        particles.push(make_particle(50.0 + 12.0 * i as f64, 50.0, 5.0, 1.0, 0.8));
    }
    let tree = Quadtree::build(&particles, bounds);

    let mut candidates = Vec::new();
    tree.retrieve(&particles[1], &mut candidates);

    // Candidates must cover the query's own node and every ancestor local
    for expected in 0..6 {
        assert!(
            candidates.contains(&expected),
            "candidate set {candidates:?} is missing particle {expected}"
        );
    }
}

#[test]
fn quadtree_clear_leaves_a_bare_root() {
    let bounds = arena();
    let particles: Vec<Particle> = (0..20)
        .map(|i| make_particle(30.0 * (i % 10) as f64 + 10.0, 60.0 * (i / 10) as f64 + 10.0, 5.0, 1.0, 0.8))
        .collect();
    let mut tree = Quadtree::build(&particles, bounds);
    assert!(tree.node_count() > 1);

    tree.clear();

    assert_eq!(tree.node_count(), 1);
    assert!(tree.root_objects().is_empty());
}

#[test]
fn quadtree_candidates_find_every_true_overlap() {
    // Deterministic scatter, dense enough to overlap in places
    let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
    let particles: Vec<Particle> = (0..150)
        .map(|i| {
            let i_f = i as f64;
            let x = (0.5 + 0.45 * (i_f * 0.37).sin()) * (bounds.w - 12.0);
            let y = (0.5 + 0.45 * (i_f * 0.13).cos()) * (bounds.h - 12.0);
            make_particle(x, y, 6.0, 1.0, 0.8)
        })
        .collect();

    let naive: BTreeSet<(usize, usize)> = overlapping_pairs(&particles).into_iter().collect();
    assert!(!naive.is_empty(), "scatter should produce at least one overlap");

    let tree = Quadtree::build(&particles, bounds);
    let mut via_tree = BTreeSet::new();
    let mut buf = Vec::new();
    for i in 0..particles.len() {
        buf.clear();
        tree.retrieve(&particles[i], &mut buf);
        for &j in &buf {
            if j != i && particles[i].overlaps(&particles[j]) {
                via_tree.insert((i.min(j), i.max(j)));
            }
        }
    }

    assert_eq!(naive, via_tree, "broad phase must never lose a true overlap");
}

// ==================================================================================
// Group generation and validation tests
// ==================================================================================

#[test]
fn honeycomb_layout_staggers_rows_without_contact() {
    let group = make_group(Rect::new(0.0, 0.0, 200.0, 200.0), 10.0, 5.0, 0.8);
    let particles = group.particles();

    // 9 rows of 8 at radius 10, spacing 1.2
    assert_eq!(group.count(), 72);
    assert_eq!(particles[0].x, NVec2::new(0.0, 0.0));

    // odd rows are offset by half a diameter
    let step_y = 20.0 * (3.0f64.sqrt() / 2.0) * 1.2;
    let second_row_first = particles
        .iter()
        .find(|p| (p.x.y - step_y).abs() < 1e-9)
        .expect("second row missing");
    assert!((second_row_first.x.x - 10.0).abs() < 1e-9);

    assert!(
        overlapping_pairs(particles).is_empty(),
        "spacing 1.2 must generate a contact-free layout"
    );
}

#[test]
fn aggregate_queries_scan_the_population() {
    let group = make_group(Rect::new(0.0, 0.0, 200.0, 200.0), 10.0, 5.0, 0.8);

    assert!((group.total_mass() - 5.0 * group.count() as f64).abs() < 1e-9);
    assert!((group.average_mass() - 5.0).abs() < 1e-9);

    let bbox = group.bounding_box();
    assert_eq!(bbox.x, 0.0);
    assert_eq!(bbox.y, 0.0);
    // odd rows reach x = 178, so the box spans 198 of the 200 available
    assert!((bbox.w - 198.0).abs() < 1e-9);
    let expected_h = 8.0 * (20.0 * (3.0f64.sqrt() / 2.0) * 1.2) + 20.0;
    assert!((bbox.h - expected_h).abs() < 1e-9);
}

#[test]
fn construction_rejects_invalid_input() {
    let origin = Rect::new(50.0, 50.0, 200.0, 200.0);
    let build = |origin: Rect, r: f64, m: f64, e: f64, bounds: Rect| {
        ParticleGroup::new(
            origin,
            r,
            m,
            e,
            [0, 0, 0],
            bounds,
            Engine::default(),
            test_params(),
        )
    };

    assert!(build(origin, 0.0, 10.0, 0.8, arena()).is_err(), "zero radius");
    assert!(build(origin, -5.0, 10.0, 0.8, arena()).is_err(), "negative radius");
    assert!(build(origin, 10.0, 0.0, 0.8, arena()).is_err(), "zero mass");
    assert!(build(origin, 10.0, -1.0, 0.8, arena()).is_err(), "negative mass");
    assert!(build(origin, 10.0, 10.0, 1.5, arena()).is_err(), "elasticity above 1");
    assert!(build(origin, 10.0, 10.0, -0.1, arena()).is_err(), "negative elasticity");
    assert!(
        build(origin, 10.0, 10.0, 0.8, Rect::new(0.0, 0.0, 0.0, 800.0)).is_err(),
        "zero-width arena"
    );
    assert!(
        build(Rect::new(0.0, 0.0, 10.0, 10.0), 10.0, 10.0, 0.8, arena()).is_err(),
        "generation rectangle too small for one particle"
    );
    assert!(
        build(origin, 500.0, 10.0, 0.8, arena()).is_err(),
        "particle larger than the arena"
    );
}

#[test]
fn randomizers_stay_in_range_and_keep_invariants() {
    let mut group = make_group(Rect::new(50.0, 50.0, 200.0, 200.0), 10.0, 10.0, 0.8);

    group.randomize_mass(4.0).unwrap();
    group.randomize_radius(4.0).unwrap();
    group.randomize_elasticity(0.2).unwrap();
    group.randomize_vx(2.0).unwrap();
    group.randomize_vy(2.0).unwrap();

    for p in group.particles() {
        assert!(p.m >= 8.0 && p.m <= 12.0, "mass {} outside +/- range/2", p.m);
        assert!(p.radius() >= 8.0 && p.radius() <= 12.0);
        assert!(
            (p.diameter() - 2.0 * p.radius()).abs() < 1e-12,
            "diameter must follow the randomized radius"
        );
        assert!(p.elasticity >= 0.7 && p.elasticity <= 0.9);
        assert!(p.v.x.abs() <= 1.0);
        assert!(p.v.y.abs() <= 1.0);
    }
}

#[test]
fn randomizers_reject_ranges_that_could_invalidate_state() {
    let mut group = make_group(Rect::new(50.0, 50.0, 200.0, 200.0), 10.0, 10.0, 0.8);

    assert!(group.randomize_mass(25.0).is_err(), "range reaching zero mass");
    assert!(group.randomize_radius(20.0).is_err(), "range reaching zero radius");
    assert!(group.randomize_elasticity(0.5).is_err(), "range leaving [0, 1]");
    assert!(group.randomize_vx(-1.0).is_err(), "negative range");
}

// ==================================================================================
// Advance-loop property tests
// ==================================================================================

#[test]
fn particles_stay_inside_bounds_every_tick() {
    // Generation rectangle pokes out of the arena on two sides
    let mut group = ParticleGroup::new(
        Rect::new(-100.0, -100.0, 200.0, 200.0),
        10.0,
        10.0,
        0.8,
        [0, 255, 0],
        arena(),
        Engine::default(),
        test_params(),
    )
    .expect("group construction failed");

    let bounds = group.bounds();
    for tick in 0..50 {
        group.advance();
        for (i, p) in group.particles().iter().enumerate() {
            let d = p.diameter();
            assert!(
                p.x.x >= bounds.x && p.x.x + d <= bounds.right(),
                "tick {tick}: particle {i} escaped horizontally at {}",
                p.x.x
            );
            assert!(
                p.x.y >= bounds.y && p.x.y + d <= bounds.bottom(),
                "tick {tick}: particle {i} escaped vertically at {}",
                p.x.y
            );
        }
    }
}

#[test]
fn resolution_loop_reaches_a_no_overlap_fixed_point() {
    let mut group = make_group(Rect::new(50.0, 50.0, 300.0, 100.0), 12.0, 8.0, 0.8);
    group.randomize_radius(2.0).unwrap();
    group.randomize_mass(3.0).unwrap();

    for tick in 0..30 {
        group.advance();
        let report = group.last_report();
        assert_eq!(
            report.deferred, 0,
            "tick {tick}: pass cap hit with {} overlaps deferred",
            report.deferred
        );
        assert!(
            overlapping_pairs(group.particles()).is_empty(),
            "tick {tick}: overlap survived the resolution loop"
        );
    }
}

#[test]
fn quadtree_and_all_pairs_groups_agree_on_containment() {
    // Same scenario under both broad phases; physics must stay lawful in each
    for quadtree in [false, true] {
        let engine = Engine {
            quadtree,
            ..Engine::default()
        };
        let mut group = ParticleGroup::new(
            Rect::new(50.0, 50.0, 300.0, 100.0),
            12.0,
            8.0,
            0.8,
            [0, 0, 255],
            arena(),
            engine,
            test_params(),
        )
        .expect("group construction failed");

        for _ in 0..20 {
            group.advance();
        }
        assert!(overlapping_pairs(group.particles()).is_empty());
        let bounds = group.bounds();
        for p in group.particles() {
            assert!(p.x.x >= bounds.x && p.x.x + p.diameter() <= bounds.right());
            assert!(p.x.y >= bounds.y && p.x.y + p.diameter() <= bounds.bottom());
        }
    }
}

#[test]
fn dropped_particle_settles_on_the_floor() {
    // Single particle, radius 10, mass 10, elasticity 0.8, dropped at (50, 50)
    let mut group = make_group(Rect::new(50.0, 50.0, 30.0, 30.0), 10.0, 10.0, 0.8);
    assert_eq!(group.count(), 1, "layout must yield exactly one particle");

    for _ in 0..300 {
        group.advance();
    }

    // Settled: x untouched, y pinned to floor minus diameter, velocity
    // snapped to exactly zero on the resting ticks
    let mut saw_zero_vy = false;
    for _ in 0..20 {
        group.advance();
        let p = group.particles()[0];
        assert_eq!(p.x.x, 50.0, "no horizontal force, x must stay exact");
        assert!(
            (p.x.y - 780.0).abs() < 1e-9,
            "resting position must be floor minus diameter, got {}",
            p.x.y
        );
        if p.v.y == 0.0 {
            saw_zero_vy = true;
        }
    }
    assert!(saw_zero_vy, "minimum-velocity snap never produced an exact rest");
}

// ==================================================================================
// Scenario configuration tests
// ==================================================================================

#[test]
fn scenario_builds_from_yaml_and_advances() {
    let yaml = r#"
engine:
  quadtree: true
  max_passes: 32

parameters:
  gravity: 9.81
  damping: 0.01
  min_velocity: 2.5
  separation_bias: 1.0
  spacing: 1.2
  seed: 42

bounds: { x: 0, y: 0, w: 800, h: 800 }

groups:
  - origin: { x: 50, y: 50, w: 200, h: 200 }
    radius: 15
    mass: 10
    elasticity: 0.8
    color: [255, 0, 0]
    randomize:
      mass: 3
      vx: 8
  - origin: { x: 400, y: 100, w: 200, h: 150 }
    radius: 20
    mass: 20
    elasticity: 0.6
    color: [0, 0, 255]
"#;

    let cfg: ScenarioConfig = serde_yaml::from_str(yaml).expect("yaml must parse");
    let mut scenario = Scenario::build_scenario(cfg).expect("scenario must build");

    assert_eq!(scenario.groups.len(), 2);
    assert!(scenario.groups.iter().all(|g| g.count() > 0));

    for _ in 0..10 {
        scenario.advance();
    }

    for group in &scenario.groups {
        let bounds = group.bounds();
        for p in group.particles() {
            assert!(p.x.x >= bounds.x && p.x.x + p.diameter() <= bounds.right());
            assert!(p.x.y >= bounds.y && p.x.y + p.diameter() <= bounds.bottom());
        }
    }
}

#[test]
fn scenario_rejects_invalid_configuration() {
    let yaml = r#"
engine:
  quadtree: true

parameters:
  gravity: 9.81
  damping: 1.5
  min_velocity: 2.5
  separation_bias: 1.0
  spacing: 1.2
  seed: 1

bounds: { x: 0, y: 0, w: 800, h: 800 }

groups:
  - origin: { x: 50, y: 50, w: 200, h: 200 }
    radius: 15
    mass: 10
    elasticity: 0.8
    color: [255, 0, 0]
"#;

    let cfg: ScenarioConfig = serde_yaml::from_str(yaml).expect("yaml must parse");
    assert!(
        Scenario::build_scenario(cfg).is_err(),
        "damping outside [0, 1) must be rejected"
    );
}

use life_core::{Generation, LifeConfig, LifeWorld, Rgba, Seed, Topology, WorldError};

fn world(width: usize, height: usize, workers: usize) -> LifeWorld {
    LifeWorld::new(LifeConfig {
        grid_width: width,
        grid_height: height,
        worker_count: workers,
        rng_seed: Some(0x5EED),
        ..LifeConfig::default()
    })
}

fn seed_from_rows(width: usize, height: usize, rows: &[(i64, i64)], name: &str) -> Seed {
    let mut seed = Seed::blank(width, height, name);
    for &(x, y) in rows {
        seed.stamp(x, y, Rgba::opaque(200, 200, 200));
    }
    seed
}

fn alive_coords(world: &LifeWorld) -> Vec<(usize, usize)> {
    let grid = world.grid();
    let mut coords = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.is_alive(x, y) {
                coords.push((x, y));
            }
        }
    }
    coords
}

#[test]
fn blinker_oscillates_with_period_two() {
    let mut world = world(5, 5, 2);
    let horizontal = [(1, 2), (2, 2), (3, 2)];
    world
        .apply_seed(seed_from_rows(5, 5, &horizontal, "blinker"))
        .expect("seed");

    let initial = alive_coords(&world);
    world.step();
    assert_eq!(alive_coords(&world), vec![(2, 1), (2, 2), (2, 3)]);
    world.step();
    assert_eq!(alive_coords(&world), initial);

    // Stays periodic indefinitely.
    for _ in 0..20 {
        world.step();
    }
    assert_eq!(alive_coords(&world), initial);
    assert_eq!(world.generation(), Generation(22));
}

#[test]
fn block_is_a_still_life() {
    let mut world = world(6, 6, 3);
    let block = [(2, 2), (3, 2), (2, 3), (3, 3)];
    world
        .apply_seed(seed_from_rows(6, 6, &block, "block"))
        .expect("seed");
    let initial = alive_coords(&world);
    let initial_colors: Vec<Rgba> = initial
        .iter()
        .map(|&(x, y)| world.grid().color_at(x, y))
        .collect();

    for _ in 0..16 {
        world.step();
    }

    assert_eq!(alive_coords(&world), initial);
    // Survivors keep their colors unchanged.
    let colors: Vec<Rgba> = initial
        .iter()
        .map(|&(x, y)| world.grid().color_at(x, y))
        .collect();
    assert_eq!(colors, initial_colors);
}

#[test]
fn glider_translates_by_one_one_after_four_steps() {
    let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
    let mut world = world(12, 12, 4);
    world
        .apply_seed(seed_from_rows(12, 12, &glider, "glider"))
        .expect("seed");
    let initial = alive_coords(&world);

    for _ in 0..4 {
        world.step();
    }

    let translated: Vec<(usize, usize)> = initial.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
    assert_eq!(alive_coords(&world), translated);
}

#[test]
fn glider_wraps_around_the_torus() {
    let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
    let mut world = world(8, 8, 3);
    world
        .apply_seed(seed_from_rows(8, 8, &glider, "glider"))
        .expect("seed");
    let initial = alive_coords(&world);

    // On an 8x8 torus a glider revisits its start after 8 * 4 steps.
    for _ in 0..32 {
        world.step();
    }
    assert_eq!(alive_coords(&world), initial);
}

#[test]
fn stepping_is_deterministic_modulo_color() {
    let cells = [(3, 1), (4, 2), (2, 3), (3, 3), (4, 3), (7, 6), (6, 6)];
    let mut a = world(10, 10, 1);
    let mut b = world(10, 10, 1);
    a.apply_seed(seed_from_rows(10, 10, &cells, "soup")).expect("seed");
    b.apply_seed(seed_from_rows(10, 10, &cells, "soup")).expect("seed");

    for _ in 0..24 {
        a.step();
        b.step();
    }
    assert_eq!(a.grid().cells(), b.grid().cells());
}

#[test]
fn worker_count_does_not_change_results() {
    let cells = [
        (1, 0),
        (2, 1),
        (0, 2),
        (1, 2),
        (2, 2),
        (8, 5),
        (9, 5),
        (8, 6),
        (9, 6),
        (4, 9),
        (5, 9),
        (6, 9),
    ];
    // Heights both divisible (12 % 4 == 0) and not (13 % 4 != 0) by the
    // worker count, plus more workers than rows.
    for height in [12usize, 13] {
        let reference = {
            let mut w = world(14, height, 1);
            w.apply_seed(seed_from_rows(14, height, &cells, "mixed"))
                .expect("seed");
            for _ in 0..16 {
                w.step();
            }
            w.grid().cells().to_vec()
        };
        for workers in [2usize, 4, 8, 64] {
            let mut w = world(14, height, workers);
            w.apply_seed(seed_from_rows(14, height, &cells, "mixed"))
                .expect("seed");
            for _ in 0..16 {
                w.step();
            }
            assert_eq!(
                w.grid().cells(),
                reference.as_slice(),
                "divergence at height {height} with {workers} workers"
            );
        }
    }
}

#[test]
fn all_dead_grid_steps_to_all_dead() {
    let mut world = world(9, 7, 8);
    world.step();
    world.step();
    assert_eq!(world.population(), 0);
    assert_eq!(world.generation(), Generation(2));
}

#[test]
fn resize_preserves_overlap_and_truncates() {
    let cells = [(0, 0), (2, 1), (4, 3)];
    let mut world = world(5, 4, 2);
    world
        .apply_seed(seed_from_rows(5, 4, &cells, "corners"))
        .expect("seed");

    world.resize(8, 6);
    assert_eq!(alive_coords(&world), vec![(0, 0), (2, 1), (4, 3)]);

    world.resize(3, 2);
    assert_eq!(alive_coords(&world), vec![(0, 0), (2, 1)]);
}

#[test]
fn resize_clamps_degenerate_sizes() {
    let mut world = world(5, 5, 2);
    world.resize(0, 0);
    assert_eq!(world.grid().width(), 1);
    assert_eq!(world.grid().height(), 1);
    // Still steppable afterwards.
    world.step();
    assert_eq!(world.population(), 0);
}

#[test]
fn mismatched_seed_is_rejected_and_state_kept() {
    let cells = [(1, 1), (2, 1), (3, 1)];
    let mut world = world(6, 6, 2);
    world
        .apply_seed(seed_from_rows(6, 6, &cells, "blinker"))
        .expect("seed");
    world.step();
    let before = alive_coords(&world);
    let generation = world.generation();

    let err = world
        .apply_seed(Seed::blank(4, 4, "wrong"))
        .expect_err("must reject wrong-sized seed");
    assert!(matches!(err, WorldError::SeedDimensionMismatch { .. }));
    assert_eq!(alive_coords(&world), before);
    assert_eq!(world.generation(), generation);
    assert_eq!(world.pattern_name(), "blinker");
}

#[test]
fn clamped_topology_keeps_interior_patterns_identical() {
    // A pattern away from every border behaves the same under both
    // topologies.
    let glider = [(4, 3), (5, 4), (3, 5), (4, 5), (5, 5)];
    let mut torus = LifeWorld::new(LifeConfig {
        grid_width: 16,
        grid_height: 16,
        topology: Topology::Torus,
        rng_seed: Some(1),
        ..LifeConfig::default()
    });
    let mut clamped = LifeWorld::new(LifeConfig {
        grid_width: 16,
        grid_height: 16,
        topology: Topology::Clamped,
        rng_seed: Some(1),
        ..LifeConfig::default()
    });
    torus
        .apply_seed(seed_from_rows(16, 16, &glider, "glider"))
        .expect("seed");
    clamped
        .apply_seed(seed_from_rows(16, 16, &glider, "glider"))
        .expect("seed");

    for _ in 0..4 {
        torus.step();
        clamped.step();
    }
    assert_eq!(torus.grid().cells(), clamped.grid().cells());
}

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use life_core::{LifeConfig, LifeWorld, Rgba, Seed};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use std::time::Duration;

fn random_seed(width: usize, height: usize, density: f64, rng: &mut SmallRng) -> Seed {
    let mut seed = Seed::blank(width, height, "bench");
    for y in 0..height {
        for x in 0..width {
            if rng.random_bool(density) {
                seed.stamp(x as i64, y as i64, Rgba::random(rng));
            }
        }
    }
    seed
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_step");
    let samples: usize = std::env::var("LIFE_BENCH_SAMPLES")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(30);
    let measure: u64 = std::env::var("LIFE_BENCH_MEASURE_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    group.sample_size(samples);
    group.measurement_time(Duration::from_secs(measure));

    let steps: u32 = std::env::var("LIFE_BENCH_STEPS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(32);
    let sizes: Vec<(usize, usize)> = vec![(256, 256), (1024, 1024)];

    for &(width, height) in &sizes {
        for workers in [1usize, 8] {
            group.bench_function(
                format!("{width}x{height}_workers{workers}_steps{steps}"),
                |b| {
                    b.iter_batched(
                        || {
                            let config = LifeConfig {
                                grid_width: width,
                                grid_height: height,
                                worker_count: workers,
                                rng_seed: Some(0xBEEF),
                                ..LifeConfig::default()
                            };
                            let mut world = LifeWorld::new(config);
                            let mut rng = SmallRng::seed_from_u64(0xBEEF);
                            let seed = random_seed(width, height, 0.2, &mut rng);
                            world.apply_seed(seed).expect("bench seed");
                            world
                        },
                        |mut world| {
                            for _ in 0..steps {
                                world.step();
                            }
                            world
                        },
                        BatchSize::LargeInput,
                    );
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);

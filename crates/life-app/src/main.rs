use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use life_app::{Renderer, RendererContext, terminal::TerminalRenderer};
use life_core::{LifeConfig, LifeWorld, Topology};
use life_patterns::PatternCatalog;
use rand::{SeedableRng, rngs::SmallRng};
use tracing::info;

/// Conway's Game of Life in the terminal.
#[derive(Debug, Parser)]
#[command(name = "life", version, about)]
struct Cli {
    /// Grid width in cells.
    #[arg(long, default_value_t = 128)]
    width: usize,

    /// Grid height in cells.
    #[arg(long, default_value_t = 72)]
    height: usize,

    /// Display size of one cell in terminal characters.
    #[arg(long, default_value_t = 2)]
    cell_size: u32,

    /// Simulation speed in generations per second.
    #[arg(long, default_value_t = 5.0)]
    tick_rate: f32,

    /// Number of parallel row bands per step.
    #[arg(long, default_value_t = 8)]
    workers: usize,

    /// Border behavior for neighbor counting.
    #[arg(long, value_enum, default_value_t = TopologyArg::Torus)]
    topology: TopologyArg,

    /// Starting pattern, by catalog name.
    #[arg(long, default_value = "random")]
    pattern: String,

    /// Extra directory of pattern files (.txt, .cells, .rle, .mc).
    #[arg(long, env = "LIFE_PATTERNS_DIR")]
    patterns_dir: Option<PathBuf>,

    /// RNG seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Fill probability for the random pattern.
    #[arg(long, default_value_t = 0.2)]
    density: f64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TopologyArg {
    Torus,
    Clamped,
}

impl From<TopologyArg> for Topology {
    fn from(arg: TopologyArg) -> Self {
        match arg {
            TopologyArg::Torus => Topology::Torus,
            TopologyArg::Clamped => Topology::Clamped,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = bootstrap(&cli)?;
    info!("Starting Game of Life shell");
    TerminalRenderer::default().run(ctx)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn bootstrap(cli: &Cli) -> Result<RendererContext> {
    let catalog = match &cli.patterns_dir {
        Some(dir) => PatternCatalog::with_directory(dir)
            .with_context(|| format!("failed to scan pattern directory {}", dir.display()))?,
        None => PatternCatalog::builtin(),
    };

    let Some(pattern_index) = catalog.index_of(&cli.pattern) else {
        let known: Vec<String> = catalog
            .entries()
            .iter()
            .map(|entry| entry.name().into_owned())
            .collect();
        bail!(
            "unknown pattern '{}'; available: {}",
            cli.pattern,
            known.join(", ")
        );
    };

    let config = LifeConfig {
        grid_width: cli.width,
        grid_height: cli.height,
        cell_size: cli.cell_size,
        ticks_per_second: cli.tick_rate,
        worker_count: cli.workers,
        topology: cli.topology.into(),
        random_fill_density: cli.density,
        rng_seed: cli.seed,
    };
    let mut world = LifeWorld::new(config);
    let mut rng = SmallRng::seed_from_u64(world.world_seed());

    let seed = catalog
        .generate(
            pattern_index,
            world.grid().width(),
            world.grid().height(),
            cli.density,
            &mut rng,
        )
        .with_context(|| format!("failed to generate starting pattern '{}'", cli.pattern))?;
    world
        .apply_seed(seed)
        .context("starting pattern did not match the grid")?;

    info!(
        width = world.grid().width(),
        height = world.grid().height(),
        pattern = %world.pattern_name(),
        population = world.population(),
        seed = world.world_seed(),
        "World seeded",
    );

    Ok(RendererContext {
        world: Arc::new(Mutex::new(world)),
        catalog: Arc::new(catalog),
        pattern_index,
    })
}

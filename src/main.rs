//! `hpp` - run an HPP lattice gas from a scene file and write PGM snapshots.
//!
//! **Usage:**
//! ```text
//! hpp [--size N] [--steps S] [--workers W] [--gather-every K]
//!     [--output-dir DIR] [--dump-all] [--seed SEED] <SCENE>
//! ```
//!
//! The worker count defaults to `HPP_WORKERS`, then to the available
//! parallelism. Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hpp_lattice::config::{default_workers, DEFAULT_SEED, DEFAULT_SIZE, DEFAULT_STEPS};
use hpp_lattice::scene::read_scene;
use hpp_lattice::snapshot::write_snapshot;
use hpp_lattice::{Orchestrator, SimConfig};

/// Simulate an HPP lattice gas.
#[derive(Parser)]
#[command(name = "hpp", version, about = "Simulate an HPP lattice gas on a torus")]
struct Args {
    /// Side length of the lattice (must be even).
    #[arg(short = 'n', long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Number of steps to run.
    #[arg(short, long, default_value_t = DEFAULT_STEPS)]
    steps: u64,

    /// Number of ranks (at most size/2).
    #[arg(short, long, env = "HPP_WORKERS")]
    workers: Option<usize>,

    /// Reassemble the lattice every K steps.
    #[arg(long, default_value_t = 1)]
    gather_every: u64,

    /// Directory for snapshots.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Also write the initial lattice and every reassembled one.
    #[arg(long)]
    dump_all: bool,

    /// Seed for random fills.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Scene file.
    scene: PathBuf,
}

impl Args {
    fn into_config(self) -> SimConfig {
        let workers = self.workers.unwrap_or_else(|| {
            let workers = default_workers(self.size);
            let available = std::thread::available_parallelism().map_or(1, |n| n.get());
            if workers < available {
                warn!(workers, available, "worker count capped at size/2");
            }
            workers
        });

        SimConfig {
            size: self.size,
            steps: self.steps,
            workers,
            gather_every: self.gather_every,
            scene: self.scene,
            output_dir: self.output_dir,
            dump_all: self.dump_all,
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Args::parse().into_config();
    config.validate().context("invalid configuration")?;

    let lattice = read_scene(&config.scene, config.size, config.seed)
        .with_context(|| format!("failed to load scene {}", config.scene.display()))?;
    let orchestrator = Orchestrator::from_config(&config)?;

    if config.dump_all {
        write_snapshot(&config.output_dir, &lattice).context("failed to write initial snapshot")?;
    }

    let dir = config.output_dir.as_path();
    let dump_all = config.dump_all;
    let last = config.steps;
    let lattice = orchestrator
        .run(lattice, |frame| {
            // The final frame is written below either way.
            if dump_all && frame.generation != last {
                write_snapshot(dir, frame)?;
            }
            Ok(())
        })
        .context("simulation failed")?;

    let path = write_snapshot(dir, &lattice).context("failed to write final snapshot")?;
    info!(path = %path.display(), "final snapshot written");
    Ok(())
}

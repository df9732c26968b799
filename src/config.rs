//! Run configuration and its startup validation.

use std::path::PathBuf;

use crate::error::{HppError, Result};

pub const DEFAULT_SIZE: usize = 512;
pub const DEFAULT_STEPS: u64 = 32;
pub const DEFAULT_SEED: u64 = 1234;

/// Everything a run needs, resolved from the command line and environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Side length N of the lattice.
    pub size: usize,
    pub steps: u64,
    pub workers: usize,
    /// Reassemble the lattice every this many steps (and after the last).
    pub gather_every: u64,
    pub scene: PathBuf,
    pub output_dir: PathBuf,
    /// Write a snapshot of the initial and every reassembled lattice.
    pub dump_all: bool,
    /// Seed for the scene's random fills.
    pub seed: u64,
}

impl SimConfig {
    pub fn new(scene: impl Into<PathBuf>, workers: usize) -> SimConfig {
        SimConfig {
            size: DEFAULT_SIZE,
            steps: DEFAULT_STEPS,
            workers,
            gather_every: 1,
            scene: scene.into(),
            output_dir: PathBuf::from("."),
            dump_all: false,
            seed: DEFAULT_SEED,
        }
    }

    /// Reject configurations the engine cannot run. Called once, before
    /// the scene is read or any worker starts.
    pub fn validate(&self) -> Result<()> {
        validate_layout(self.size, self.workers)?;
        if self.gather_every == 0 {
            return Err(HppError::InvalidInterval);
        }
        Ok(())
    }
}

/// The lattice must split into row-pairs and every worker must own one.
pub fn validate_layout(size: usize, workers: usize) -> Result<()> {
    if size == 0 || size % 2 != 0 {
        return Err(HppError::OddSize(size));
    }
    if workers == 0 {
        return Err(HppError::NoWorkers);
    }
    if workers > size / 2 {
        return Err(HppError::TooManyWorkers {
            workers,
            row_pairs: size / 2,
        });
    }
    Ok(())
}

/// Worker count when the environment does not name one: the available
/// parallelism, capped so every worker owns at least one row-pair.
pub fn default_workers(size: usize) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    available.min(size / 2).max(1)
}

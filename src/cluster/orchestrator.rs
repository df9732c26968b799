//! The lock-step control loop every rank runs.
//!
//! Ranks are the threads of a dedicated rayon pool sized to the worker
//! count; `ThreadPool::broadcast` runs the same rank body once on each of
//! them. Per step every rank goes through
//!
//! ```text
//! scatter -> EVEN -> backward exchange -> ODD -> gather
//! ```
//!
//! with no early exit. On steps where the coordinator does not need the
//! lattice, gather and the next scatter are replaced by a forward exchange
//! that realigns the bands in place.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, info};

use super::comm::{world, Endpoint};
use super::coordinator::{receive_band, submit_band, Coordinator};
use super::worker::LocalBand;
use crate::automaton::partition::Partition;
use crate::config::{validate_layout, SimConfig};
use crate::error::{HppError, Result};
use crate::state::Lattice;

pub struct Orchestrator {
    size: usize,
    steps: u64,
    gather_every: u64,
    partition: Partition,
    thread_pool: rayon::ThreadPool,
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Orchestrator {
    /// Set up a run of `steps` steps on a `size`×`size` lattice split over
    /// `workers` ranks.
    pub fn new(size: usize, workers: usize, steps: u64, gather_every: u64) -> Result<Self> {
        validate_layout(size, workers)?;
        if gather_every == 0 {
            return Err(HppError::InvalidInterval);
        }

        let partition = Partition::for_lattice(size, workers)?;
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|rank| format!("hpp-rank-{rank}"))
            .build()?;

        Ok(Orchestrator {
            size,
            steps,
            gather_every,
            partition,
            thread_pool,
        })
    }

    pub fn from_config(config: &SimConfig) -> Result<Self> {
        Orchestrator::new(config.size, config.workers, config.steps, config.gather_every)
    }

    /// True when the lattice is reassembled after `done` steps.
    #[inline]
    fn gathers_after(&self, done: u64) -> bool {
        done % self.gather_every == 0 || done == self.steps
    }

    /// Run every step and return the final lattice.
    ///
    /// `observer` sees the lattice on rank 0 after each gather. An error
    /// from it, or from any rank, stops the whole group.
    pub fn run<F>(&self, lattice: Lattice, observer: F) -> Result<Lattice>
    where
        F: FnMut(&Lattice) -> Result<()> + Send,
    {
        if lattice.size != self.size || lattice.cells.len() != self.size * self.size {
            return Err(HppError::SizeMismatch {
                expected: self.size,
                got: lattice.size,
                cells: lattice.cells.len(),
            });
        }

        let workers = self.partition.workers();
        info!(
            size = self.size,
            steps = self.steps,
            workers,
            row_pairs = self.partition.total_row_pairs(),
            gather_every = self.gather_every,
            "starting simulation"
        );
        for (rank, range) in self.partition.ranges().iter().enumerate() {
            info!(rank, count = range.count, offset = range.offset, "band assigned");
        }

        let start = Instant::now();
        let endpoints: Vec<Mutex<Option<Endpoint>>> = world(workers)
            .into_iter()
            .map(|endpoint| Mutex::new(Some(endpoint)))
            .collect();
        let coordinator = Mutex::new(Coordinator::new(lattice, self.partition.clone()));
        let observer = Mutex::new(observer);

        let results = self.thread_pool.broadcast(|ctx| {
            let rank = ctx.index();
            match lock(&endpoints[rank]).take() {
                Some(endpoint) => self.run_rank(endpoint, &coordinator, &observer),
                None => Ok(()),
            }
        });

        // A failing rank makes its peers fail with disconnects; report the cause.
        let mut failure: Option<HppError> = None;
        for err in results.into_iter().filter_map(|r| r.err()) {
            let replace = match &failure {
                None => true,
                Some(current) => current.is_disconnect() && !err.is_disconnect(),
            };
            if replace {
                failure = Some(err);
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let lattice = coordinator
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_lattice();
        info!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            generation = lattice.generation,
            "simulation finished"
        );
        Ok(lattice)
    }

    fn run_rank<F>(
        &self,
        endpoint: Endpoint,
        coordinator: &Mutex<Coordinator>,
        observer: &Mutex<F>,
    ) -> Result<()>
    where
        F: FnMut(&Lattice) -> Result<()> + Send,
    {
        let rank = endpoint.rank();
        let mut band = LocalBand::new(self.partition.band(rank), self.size);

        // Only rank 0 touches the lattice and the observer.
        let mut coordinator = (rank == 0).then(|| lock(coordinator));
        let mut observer = (rank == 0).then(|| lock(observer));
        let base = coordinator.as_ref().map_or(0, |c| c.lattice().generation);

        let mut resident = false;
        for done in 1..=self.steps {
            if !resident {
                match coordinator.as_deref() {
                    Some(coordinator) => coordinator.scatter(&endpoint, &mut band)?,
                    None => receive_band(&endpoint, &mut band)?,
                }
            }

            band.collide_even();
            band.exchange_ghost(&endpoint)?;
            band.collide_odd();

            if self.gathers_after(done) {
                match (coordinator.as_deref_mut(), observer.as_deref_mut()) {
                    (Some(coordinator), Some(observer)) => {
                        coordinator.gather(&endpoint, &band, base + done)?;
                        observer(coordinator.lattice())?;
                    }
                    _ => submit_band(&endpoint, &band)?,
                }
                resident = false;
            } else {
                band.realign(&endpoint)?;
                resident = true;
            }
        }

        Ok(())
    }
}

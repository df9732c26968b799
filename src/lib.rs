//! HPP lattice gas on a torus, stepped by a group of cooperating ranks.
//!
//! The lattice is split into bands of row-pairs, one per rank. Every step
//! each rank applies the EVEN and ODD Margolus collision passes to its band,
//! trading boundary rows with its ring neighbours in between, and rank 0
//! reassembles the lattice afterwards. The result is cell-for-cell the same
//! as [`automaton::step_lattice`] applied serially.

pub mod automaton;
pub mod cluster;
pub mod config;
pub mod error;
pub mod scene;
pub mod snapshot;
pub mod state;

pub use cluster::Orchestrator;
pub use config::SimConfig;
pub use error::{HppError, Result};
pub use state::{Cell, Lattice};

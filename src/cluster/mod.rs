//! The distributed engine: ranks, ring exchange, scatter/gather.
//!
//! Each rank owns a contiguous band of row-pairs and talks to the others
//! only through messages. Rank 0 doubles as the coordinator that holds the
//! canonical lattice between steps.

pub mod comm;
pub mod coordinator;
pub mod exchange;
pub mod orchestrator;
pub mod worker;

pub use comm::{world, Endpoint, Tag};
pub use coordinator::Coordinator;
pub use exchange::{exchange_rows, role, Direction, Role};
pub use orchestrator::Orchestrator;
pub use worker::LocalBand;

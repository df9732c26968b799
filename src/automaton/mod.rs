//! Core lattice logic: indexing, partitioning and block collisions.
//!
//! Everything in here is pure and single-threaded. The distributed engine
//! in `cluster/` drives these functions on each worker's band.

pub mod grid;
pub mod partition;
pub mod region;
pub mod stepping;

pub use grid::{census, create_lattice, wrap};
pub use partition::{BandRange, Partition};
pub use region::{extract_rows, import_rows};
pub use stepping::{collide, step_lattice, Phase};

//! Error types for hpp-lattice.

use std::path::PathBuf;

use thiserror::Error;

use crate::cluster::comm::Tag;

#[derive(Debug, Error)]
pub enum HppError {
    #[error("the domain size N must be even and positive, got {0}")]
    OddSize(usize),

    #[error("number of workers {workers} must be <= domain size/2 ({row_pairs})")]
    TooManyWorkers { workers: usize, row_pairs: usize },

    #[error("at least one worker is required")]
    NoWorkers,

    #[error("gather interval must be at least 1")]
    InvalidInterval,

    #[error("lattice of side {got} with {cells} cells does not fit a {expected}x{expected} run")]
    SizeMismatch {
        expected: usize,
        got: usize,
        cells: usize,
    },

    #[error("can not open \"{path}\" for reading: {source}")]
    SceneOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized command `{token}` at line {line}")]
    UnknownDirective { token: String, line: usize },

    #[error("malformed `{directive}` command at line {line}: {reason}")]
    MalformedDirective {
        directive: char,
        line: usize,
        reason: String,
    },

    #[error("invalid cell type {code} at line {line} (expected 0, 1 or 2)")]
    InvalidCellCode { code: i64, line: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("rank {rank} lost contact with rank {peer}")]
    Disconnected { rank: usize, peer: usize },

    #[error("rank {rank} expected {expected:?} from rank {peer}, got {got:?} ({len} cells)")]
    Protocol {
        rank: usize,
        peer: usize,
        expected: Tag,
        got: Tag,
        len: usize,
    },
}

impl HppError {
    /// True for the secondary failures a rank reports when a peer has gone away.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, HppError::Disconnected { .. })
    }
}

pub type Result<T> = std::result::Result<T, HppError>;

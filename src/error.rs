//! Error types.
//!
//! [`Error`] is fatal: any variant aborts the whole run and no output is
//! produced. [`RowError`] describes a single malformed line and never leaves
//! the worker that saw it.

use std::io;
use std::path::PathBuf;

use crate::segment::FileRange;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open {}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to stat {}", path.display())]
    Stat { path: PathBuf, source: io::Error },

    #[error("failed to memory-map {}", path.display())]
    Map { path: PathBuf, source: io::Error },

    #[error("failed to probe for a line boundary at offset {offset}")]
    Probe { offset: u64, source: io::Error },

    #[error("failed to read range {range} at offset {offset}")]
    Read {
        range: FileRange,
        offset: u64,
        source: io::Error,
    },

    #[error("input ended at offset {offset} before the end of range {range}")]
    UnexpectedEof { range: FileRange, offset: u64 },

    #[error("expected {expected} worker results, only {received} arrived")]
    WorkerLost { expected: usize, received: usize },

    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a single line was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("empty row")]
    Empty,

    #[error("no ';' separator")]
    MissingDelimiter,

    #[error("more than two ';'-separated fields")]
    ExtraDelimiter,

    #[error("invalid value {0:?}, expected a number with one decimal digit")]
    InvalidValue(String),
}

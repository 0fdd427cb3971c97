//! Per-key min/mean/max over large `key;value` files, scanned in parallel.
//!
//! The input is cut into line-aligned ranges ([`segment()`]), each range is
//! streamed by its own [`ChunkWorker`] into a private map, and the maps are
//! folded together by a [`StatsAggregator`]. Values are kept in integer
//! tenths throughout, so sums stay exact.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod parse;
pub mod segment;
pub mod source;
pub mod stats;
pub mod worker;

pub use aggregate::{combine, Aggregate, StatsAggregator};
pub use config::{Backend, Config};
pub use error::{Error, Result, RowError};
pub use orchestrator::{run, run_source};
pub use output::{write_results, Order};
pub use segment::{segment, FileRange};
pub use source::{ByteSource, FileSource, SliceSource};
pub use stats::{Stats, StatsMap, Tenths};
pub use worker::{ChunkWorker, PartialResult};

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::source::{ByteSource, FileSource, SliceSource};

pub const DEFAULT_INPUT: &str = "./measurements.txt";
pub const DEFAULT_WORKERS: usize = 12;
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024 * 1024;
pub const DEFAULT_PROBE_WINDOW: usize = 500;

/// How workers get at the input bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// Each worker opens its own handle and reads through a buffer.
    #[default]
    Read,
    /// The file is memory-mapped once and shared by all workers.
    Mmap,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub workers: usize,
    pub buffer_size: usize,
    pub probe_window: usize,
    pub backend: Backend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            workers: DEFAULT_WORKERS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            probe_window: DEFAULT_PROBE_WINDOW,
            backend: Backend::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("worker count must be at least 1".into()));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig("buffer size must be at least 1 byte".into()));
        }
        if self.probe_window == 0 {
            return Err(Error::InvalidConfig("probe window must be at least 1 byte".into()));
        }
        Ok(())
    }

    pub fn open_source(&self) -> Result<Arc<dyn ByteSource>> {
        let source: Arc<dyn ByteSource> = match self.backend {
            Backend::Read => Arc::new(FileSource::open(&self.input)?),
            Backend::Mmap => Arc::new(SliceSource::map(&self.input)?),
        };
        Ok(source)
    }
}

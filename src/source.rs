//! Random-access byte sources the segmenter and workers read from.
//!
//! Every call to [`ByteSource::open_at`] hands out an independent cursor, so
//! workers scanning disjoint ranges never coordinate with each other.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{Error, Result};

pub trait ByteSource: Send + Sync {
    /// Total size in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opens a fresh reader positioned at `offset`.
    fn open_at(&self, offset: u64) -> io::Result<Box<dyn Read + Send + '_>>;
}

/// A file on disk; each cursor is its own `File` handle seeked to the start.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    len: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| Error::Stat {
                path: path.clone(),
                source,
            })?
            .len();
        Ok(Self { path, len })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn open_at(&self, offset: u64) -> io::Result<Box<dyn Read + Send + '_>> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        Ok(Box::new(file))
    }
}

/// Bytes already in memory: a memory-mapped file or an owned buffer.
#[derive(Debug)]
pub struct SliceSource<T> {
    bytes: T,
}

impl<T: AsRef<[u8]>> SliceSource<T> {
    pub fn new(bytes: T) -> Self {
        Self { bytes }
    }
}

impl SliceSource<Mmap> {
    pub fn map(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        // SAFETY: the input is treated as read-only for the whole run; a
        // concurrent writer truncating it is outside what this tool supports.
        let map = unsafe { Mmap::map(&file) }.map_err(|source| Error::Map {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(map))
    }
}

impl<T> ByteSource for SliceSource<T>
where
    T: AsRef<[u8]> + Send + Sync,
{
    fn len(&self) -> u64 {
        self.bytes.as_ref().len() as u64
    }

    fn open_at(&self, offset: u64) -> io::Result<Box<dyn Read + Send + '_>> {
        let bytes = self.bytes.as_ref();
        let start = usize::try_from(offset).map_or(bytes.len(), |o| o.min(bytes.len()));
        Ok(Box::new(&bytes[start..]))
    }
}

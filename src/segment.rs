//! Splitting the input into line-aligned byte ranges, one per worker.

use std::fmt;
use std::io::Read;

use memchr::memchr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::ByteSource;

/// Half-open byte interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRange {
    pub start: u64,
    pub end: u64,
}

impl FileRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for FileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Computes `workers` contiguous ranges covering the whole source.
///
/// Interior boundaries sit just past the first newline at or after the naive
/// cut `i * len / workers`. Ranges may be empty when lines are long compared
/// to the cut spacing.
pub fn segment(source: &dyn ByteSource, workers: usize, probe_window: usize) -> Result<Vec<FileRange>> {
    if workers == 0 {
        return Err(Error::InvalidConfig("worker count must be at least 1".into()));
    }
    let len = source.len();

    let mut boundaries = Vec::with_capacity(workers + 1);
    boundaries.push(0u64);
    for i in 1..workers {
        let naive = (u128::from(len) * i as u128 / workers as u128) as u64;
        let prev = boundaries[i - 1];
        let cut = if naive < prev {
            // A long line already carried the previous boundary past this cut.
            prev
        } else {
            align_to_line(source, naive, probe_window)?
        };
        boundaries.push(cut);
    }
    boundaries.push(len);

    let ranges: Vec<FileRange> = boundaries
        .windows(2)
        .map(|w| FileRange { start: w[0], end: w[1] })
        .collect();
    debug!(?ranges, "computed file ranges");
    Ok(ranges)
}

/// Returns the offset just past the first newline at or after `cut`.
///
/// Probing starts with `probe_window` bytes and doubles the window until a
/// newline turns up; running into end of input yields `source.len()`.
pub fn align_to_line(source: &dyn ByteSource, cut: u64, probe_window: usize) -> Result<u64> {
    let len = source.len();
    if cut == 0 || cut >= len {
        return Ok(cut.min(len));
    }

    let probe_err = |err| Error::Probe {
        offset: cut,
        source: err,
    };
    let mut reader = source.open_at(cut).map_err(probe_err)?;
    let mut window = probe_window.max(1);
    let mut scanned = 0u64;
    let mut buf = Vec::with_capacity(window);
    loop {
        buf.clear();
        let got = reader
            .by_ref()
            .take(window as u64)
            .read_to_end(&mut buf)
            .map_err(probe_err)?;
        if let Some(i) = memchr(b'\n', &buf) {
            return Ok(cut + scanned + i as u64 + 1);
        }
        if got < window {
            return Ok(len);
        }
        scanned += got as u64;
        window = window.saturating_mul(2);
        debug!(cut, scanned, window, "no newline in probe window, widening");
    }
}

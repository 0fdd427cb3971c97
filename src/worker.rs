//! Streaming aggregation of one file range.

use std::io::{ErrorKind, Read};

use memchr::memchr_iter;
use tracing::warn;

use crate::error::{Error, Result};
use crate::parse::parse_line;
use crate::segment::FileRange;
use crate::source::ByteSource;
use crate::stats::{self, StatsMap};

/// What one worker hands back after scanning its range.
#[derive(Debug, Default)]
pub struct PartialResult {
    pub stats: StatsMap,
    pub rows: u64,
    pub malformed: u64,
}

impl PartialResult {
    fn feed(&mut self, line: &[u8], offset: u64) {
        match parse_line(line) {
            Ok((key, value)) => {
                stats::record(&mut self.stats, key, value);
                self.rows += 1;
            }
            Err(err) => {
                self.malformed += 1;
                warn!(
                    offset,
                    line = %String::from_utf8_lossy(line),
                    "skipping malformed row: {err}"
                );
            }
        }
    }
}

pub struct ChunkWorker<'a> {
    source: &'a dyn ByteSource,
    buffer_size: usize,
}

impl<'a> ChunkWorker<'a> {
    pub fn new(source: &'a dyn ByteSource, buffer_size: usize) -> Self {
        Self {
            source,
            buffer_size: buffer_size.max(1),
        }
    }

    /// Reads exactly the bytes of `range` and folds every line into a fresh map.
    ///
    /// Lines split across buffer refills are stitched through a carry buffer;
    /// a non-empty carry left at the end of the range is parsed as a final
    /// line. Malformed lines are logged and skipped.
    pub fn process(&self, range: FileRange) -> Result<PartialResult> {
        let mut result = PartialResult::default();
        if range.is_empty() {
            return Ok(result);
        }

        let mut reader = self
            .source
            .open_at(range.start)
            .map_err(|source| Error::Read {
                range,
                offset: range.start,
                source,
            })?;
        let mut buf = vec![0u8; self.buffer_size];
        let mut carry: Vec<u8> = Vec::new();
        let mut pos = range.start;
        let mut line_offset = range.start;

        while pos < range.end {
            let want = (range.end - pos).min(buf.len() as u64) as usize;
            let n = match reader.read(&mut buf[..want]) {
                Ok(0) => return Err(Error::UnexpectedEof { range, offset: pos }),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(Error::Read {
                        range,
                        offset: pos,
                        source,
                    })
                }
            };
            let chunk = &buf[..n];

            let mut line_start = 0;
            for nl in memchr_iter(b'\n', chunk) {
                if carry.is_empty() {
                    result.feed(&chunk[line_start..nl], line_offset);
                } else {
                    carry.extend_from_slice(&chunk[line_start..nl]);
                    result.feed(&carry, line_offset);
                    carry.clear();
                }
                line_start = nl + 1;
                line_offset = pos + line_start as u64;
            }
            carry.extend_from_slice(&chunk[line_start..]);
            pos += n as u64;
        }

        if !carry.is_empty() {
            result.feed(&carry, line_offset);
        }
        Ok(result)
    }
}

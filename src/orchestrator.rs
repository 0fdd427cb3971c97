//! Runs one worker per file range on a dedicated pool and folds the results.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::aggregate::{Aggregate, StatsAggregator};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::segment::segment;
use crate::source::ByteSource;
use crate::worker::ChunkWorker;

/// Opens the configured input and aggregates it.
pub fn run(config: &Config) -> Result<Aggregate> {
    config.validate()?;
    let source = config.open_source()?;
    run_source(source, config)
}

/// Aggregates an already opened source using `config.workers` workers.
///
/// Returns only after every worker has reported. The first fatal error from
/// any worker ends the run; results already merged are discarded.
pub fn run_source(source: Arc<dyn ByteSource>, config: &Config) -> Result<Aggregate> {
    config.validate()?;
    let started = Instant::now();
    info!(bytes = source.len(), workers = config.workers, "scanning input");

    let ranges = segment(&*source, config.workers, config.probe_window)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("chunk-worker-{i}"))
        .build()?;

    // One slot per worker, so no worker ever blocks on hand-off.
    let (tx, rx) = crossbeam_channel::bounded(ranges.len());
    for (id, range) in ranges.iter().copied().enumerate() {
        let tx = tx.clone();
        let source = Arc::clone(&source);
        let buffer_size = config.buffer_size;
        pool.spawn(move || {
            let result = ChunkWorker::new(&*source, buffer_size).process(range);
            if let Ok(partial) = &result {
                debug!(
                    worker = id,
                    %range,
                    bytes = range.len(),
                    rows = partial.rows,
                    keys = partial.stats.len(),
                    "worker finished"
                );
            }
            // The receiver is gone only if the run already failed.
            let _ = tx.send(result);
        });
    }
    drop(tx);

    let mut aggregator = StatsAggregator::new();
    while aggregator.merged() < ranges.len() {
        match rx.recv() {
            Ok(Ok(partial)) => aggregator.add(partial),
            Ok(Err(err)) => {
                error!("worker failed: {err}");
                return Err(err);
            }
            Err(_) => {
                return Err(Error::WorkerLost {
                    expected: ranges.len(),
                    received: aggregator.merged(),
                })
            }
        }
    }

    let aggregate = aggregator.finish();
    info!(
        rows = aggregate.rows,
        malformed = aggregate.malformed,
        keys = aggregate.stats.len(),
        elapsed = ?started.elapsed(),
        "aggregation complete"
    );
    Ok(aggregate)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Read};

    use super::*;
    use crate::segment::FileRange;
    use crate::source::SliceSource;
    use crate::stats::StatsMap;

    /// A source whose opens or reads fail, standing in for a failing disk.
    struct BrokenSource {
        len: u64,
        fail_open: bool,
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device unplugged"))
        }
    }

    impl ByteSource for BrokenSource {
        fn len(&self) -> u64 {
            self.len
        }

        fn open_at(&self, _offset: u64) -> io::Result<Box<dyn Read + Send + '_>> {
            if self.fail_open {
                Err(io::Error::other("permission revoked"))
            } else {
                Ok(Box::new(BrokenReader))
            }
        }
    }

    fn config(workers: usize) -> Config {
        Config {
            workers,
            buffer_size: 16,
            probe_window: 8,
            ..Config::default()
        }
    }

    fn run_bytes(bytes: &[u8], workers: usize) -> Aggregate {
        run_source(Arc::new(SliceSource::new(bytes.to_vec())), &config(workers)).unwrap()
    }

    fn rendered(stats: &StatsMap) -> Vec<(String, String)> {
        let mut rows: Vec<_> = stats
            .iter()
            .map(|(k, v)| (String::from_utf8_lossy(k).into_owned(), v.to_string()))
            .collect();
        rows.sort();
        rows
    }

    #[test]
    fn single_key_end_to_end() {
        let out = run_bytes(b"Paris;12.3\nParis;8.9\n", 1);
        assert_eq!(
            rendered(&out.stats),
            vec![(String::from("Paris"), String::from("8.9/10.6/12.3"))]
        );
    }

    #[test]
    fn worker_count_does_not_change_the_result() {
        let input: String = (0..2_000)
            .map(|i| format!("key{};{}.{}\n", i % 37, (i * 7919) % 997 - 498, i % 10))
            .collect();
        let one = run_bytes(input.as_bytes(), 1);
        for workers in [2, 3, 12, 64] {
            let many = run_bytes(input.as_bytes(), workers);
            assert_eq!(many.stats, one.stats, "workers = {workers}");
            assert_eq!(many.rows, 2_000);
        }
    }

    #[test]
    fn more_workers_than_lines() {
        let out = run_bytes(b"a;1.0\nb;2.0", 12);
        assert_eq!(out.rows, 2);
        assert_eq!(out.stats.len(), 2);
    }

    #[test]
    fn empty_input_gives_empty_result() {
        let out = run_bytes(b"", 4);
        assert!(out.stats.is_empty());
        assert_eq!(out.rows, 0);
    }

    #[test]
    fn failed_boundary_probe_is_fatal() {
        let source = Arc::new(BrokenSource {
            len: 1_000,
            fail_open: true,
        });
        let err = run_source(source, &config(4)).unwrap_err();
        assert!(matches!(err, Error::Probe { offset: 250, .. }), "{err:?}");
    }

    #[test]
    fn failed_worker_read_is_fatal() {
        // A single worker never probes, so the failure surfaces in the read loop.
        for fail_open in [true, false] {
            let source = Arc::new(BrokenSource {
                len: 1_000,
                fail_open,
            });
            let err = run_source(source, &config(1)).unwrap_err();
            let whole = FileRange {
                start: 0,
                end: 1_000,
            };
            assert!(
                matches!(err, Error::Read { offset: 0, range, .. } if range == whole),
                "{err:?}"
            );
        }
    }

    #[test]
    fn fatal_errors_abort_the_run() {
        let cfg = Config {
            input: "/no/such/measurements.txt".into(),
            ..config(2)
        };
        assert!(matches!(run(&cfg), Err(Error::Open { .. })));
    }
}

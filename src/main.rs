use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, trace};

use brc_stats::config::{
    Backend, Config, DEFAULT_BUFFER_SIZE, DEFAULT_INPUT, DEFAULT_PROBE_WINDOW, DEFAULT_WORKERS,
};
use brc_stats::output::{write_results, Order};

/// Compute min/mean/max per key of a `key;value` file using parallel workers.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Input file, one `key;value` record per line
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Number of parallel workers (one file range each)
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Read buffer size per worker, in bytes
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Initial number of bytes probed for a newline at each range boundary
    #[arg(long, default_value_t = DEFAULT_PROBE_WINDOW)]
    probe_window: usize,

    /// Memory-map the input instead of reading it through buffers
    #[arg(long)]
    mmap: bool,

    /// Print results sorted by key
    #[arg(long)]
    sorted: bool,

    /// Increase diagnostic verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            input: self.input.clone(),
            workers: self.workers,
            buffer_size: self.buffer_size,
            probe_window: self.probe_window,
            backend: if self.mmap { Backend::Mmap } else { Backend::Read },
        }
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(io::stderr)
        .with_target(verbose >= 2)
        .with_thread_names(verbose >= 2)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    trace!(?cli, "parsed arguments");

    let config = cli.config();
    debug!(?config, "resolved configuration");
    let aggregate = brc_stats::run(&config)
        .with_context(|| format!("failed to aggregate {}", config.input.display()))?;

    let order = if cli.sorted { Order::Sorted } else { Order::Map };
    let mut out = BufWriter::new(io::stdout().lock());
    write_results(&mut out, &aggregate.stats, order).context("failed to write results")?;
    Ok(())
}

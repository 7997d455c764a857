//! Memory-access trace simulator CLI.
//!
//! This binary is the external driver around `tracesim-core`. It performs:
//! 1. **Run:** Load a JSON configuration, attach one command stream per core (files, named
//!    pipes, or `-` for stdin), and tick until every core exits or the cycle cap is hit.
//! 2. **Check:** Validate a configuration and print the effective memory levels.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tracesim_core::config::Config;
use tracesim_core::sim::RunOutcome;
use tracesim_core::stream::{CommandSource, ReaderSource};
use tracesim_core::{AddressSpace, SimError, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "tracesim",
    author,
    version,
    about = "Per-thread memory-access trace simulator",
    long_about = "Replays binary memory-access command streams against a simulated multi-level \
                  address space and a latency-modelled memory subsystem.\n\nExamples:\n  \
                  tracesim run --stream core0.bin\n  \
                  tracesim run -c config.json --stream /tmp/fifo0 --stream /tmp/fifo1\n  \
                  tracesim check -c config.json"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay one command stream per core.
    Run {
        /// JSON configuration file; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Command stream for the next core, in core-id order. `-` reads stdin.
        #[arg(short, long = "stream", required = true)]
        streams: Vec<PathBuf>,

        /// Stop after this many cycles even if cores are still running.
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Print per-core statistics as well as the total.
        #[arg(long)]
        per_core: bool,
    },

    /// Validate a configuration file.
    Check {
        /// JSON configuration file.
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            streams,
            max_cycles,
            per_core,
        } => cmd_run(config.as_deref(), &streams, max_cycles, per_core),
        Commands::Check { config } => cmd_check(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "simulation aborted");
            eprintln!("\n[!] FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config, SimError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path)?;
    let config = Config::from_json(&text)?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Opens one command stream. Unix descriptors are polled with `poll(2)`.
fn open_stream(path: &Path) -> io::Result<Box<dyn CommandSource>> {
    if path == Path::new("-") {
        return Ok(Box::new(ReaderSource::new(io::stdin().lock())));
    }
    let file = File::open(path)?;
    #[cfg(unix)]
    {
        Ok(Box::new(tracesim_core::stream::FdSource::new(file)))
    }
    #[cfg(not(unix))]
    {
        Ok(Box::new(ReaderSource::new(io::BufReader::new(file))))
    }
}

/// Runs the tick loop and prints statistics.
///
/// The stream count overrides `cores` in the configuration file.
fn cmd_run(
    config: Option<&Path>,
    streams: &[PathBuf],
    max_cycles: Option<u64>,
    per_core: bool,
) -> Result<ExitCode, SimError> {
    let mut config = load_config(config)?;
    config.cores = u32::try_from(streams.len()).map_err(|_| SimError::InvalidConfig {
        field: "cores",
        reason: format!("{} streams exceed the core limit", streams.len()),
    })?;

    let sources = streams
        .iter()
        .map(|path| open_stream(path))
        .collect::<io::Result<Vec<_>>>()?;

    let mut sim = Simulator::new(&config, sources)?;
    let run = sim.run(max_cycles);
    let flushed = sim.finish();
    let summary = run?;
    flushed?;

    println!("\n[*] Simulated {} cycles", summary.cycles);
    if per_core {
        for core in sim.cores() {
            core.stats().print(&format!("core {}", core.id()));
        }
    }
    sim.stats().print("total");

    match summary.outcome {
        RunOutcome::Finished => Ok(ExitCode::SUCCESS),
        RunOutcome::CycleLimit => {
            warn!(cycles = summary.cycles, "cycle limit reached before every core exited");
            Ok(ExitCode::from(2))
        }
    }
}

fn cmd_check(path: &Path) -> Result<ExitCode, SimError> {
    let config = load_config(Some(path))?;
    let space = AddressSpace::new(&config.memory)?;

    println!("Configuration OK: {}", path.display());
    println!(
        "  cores {}  line {}  queue {}  issue {}  pending {}",
        config.cores,
        config.core.cache_line_size,
        config.core.max_queue_length,
        config.core.max_issue_per_cycle,
        config.core.max_pending_transactions
    );
    for index in 0..space.count_memory_levels() {
        if let Some(level) = space.level(index) {
            let marker = if index == space.default_level() { " (default)" } else { "" };
            println!(
                "  level {index}: {} pages of {} bytes{marker}",
                level.page_count(),
                level.page_size()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

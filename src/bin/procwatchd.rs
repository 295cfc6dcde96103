//! procwatchd - in-container process sampling agent.
//!
//! Samples process metrics from /proc at a fixed interval and writes each
//! pass to stdout as one JSON line. Diagnostics go to stderr.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use procwatch::collector::{Collector, RealFs};
use procwatch::config::{Args, Config};
use procwatch::emitter::Emitter;
use procwatch::sampler::Sampler;
use procwatch::shutdown::ShutdownCoordinator;

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = Config::from(&args);

    info!("procwatchd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, filter={}, proc={}, cpu_window={:?}",
        config.interval.as_secs(),
        config.filter_label(),
        config.proc_path,
        config.cpu_window
    );

    let mut collector = Collector::new(RealFs::new(), &config.proc_path)
        .with_filter(config.filter.clone())
        .with_cpu_window(config.cpu_window);

    match collector.probe() {
        Ok(system) => info!(
            "System: mem_total={} kB, boot_time={}",
            system.mem_total_kb, system.boot_time
        ),
        Err(e) => {
            eprintln!(
                "procwatchd: cannot read process table at {}: {}",
                config.proc_path, e
            );
            return ExitCode::FAILURE;
        }
    }

    let shutdown = ShutdownCoordinator::new();
    if let Err(e) = shutdown.install() {
        warn!("Failed to set signal handler: {}", e);
    }

    let mut sampler = Sampler::new(
        collector,
        Emitter::new(io::stdout()),
        shutdown.flag(),
        config.interval,
        config.filter.as_deref(),
    );

    match sampler.run() {
        Ok(summary) => {
            info!(
                "Shutdown complete: {} batches, {} failed passes",
                summary.batches, summary.failed_passes
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Cannot write to stdout: {}", e);
            ExitCode::FAILURE
        }
    }
}

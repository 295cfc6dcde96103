//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through its `MONITOR_*`
//! environment variable; the flag wins when both are set.

use std::time::Duration;

use clap::Parser;

/// In-container process sampling agent.
#[derive(Parser, Debug)]
#[command(
    name = "procwatchd",
    about = "Samples process metrics and writes them to stdout as JSON lines",
    version
)]
pub struct Args {
    /// Sampling interval in seconds.
    #[arg(
        short,
        long,
        env = "MONITOR_INTERVAL",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Only sample processes whose name contains this text (case-insensitive).
    #[arg(short, long, env = "MONITOR_FILTER")]
    pub filter: Option<String>,

    /// Path to /proc filesystem.
    #[arg(long, env = "MONITOR_PROC_PATH", default_value = "/proc")]
    pub proc_path: String,

    /// CPU measurement window in milliseconds, shared by all processes in a pass.
    #[arg(long, env = "MONITOR_CPU_WINDOW_MS", default_value = "100")]
    pub cpu_window_ms: u64,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Resolved sampler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub interval: Duration,
    /// `None` samples every process.
    pub filter: Option<String>,
    pub proc_path: String,
    pub cpu_window: Duration,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            interval: Duration::from_secs(args.interval),
            filter: args.filter.clone().filter(|f| !f.trim().is_empty()),
            proc_path: args.proc_path.clone(),
            cpu_window: Duration::from_millis(args.cpu_window_ms),
        }
    }
}

impl Config {
    /// Label used in the start message.
    pub fn filter_label(&self) -> &str {
        self.filter.as_deref().unwrap_or("all")
    }
}

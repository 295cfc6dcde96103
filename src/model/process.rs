//! Per-process and per-thread samples.
//!
//! JSON keys follow the agent's established output format (`exe`, `cmdline`,
//! `num_threads`, ...), so downstream log queries keep working.

use serde::{Deserialize, Serialize};

/// Placeholder for attributes the kernel does not expose for a process,
/// such as the executable of a kernel thread.
pub const NOT_AVAILABLE: &str = "N/A";

/// One OS thread of a sampled process.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ThreadSample {
    #[serde(rename = "tid")]
    pub thread_id: u32,

    /// Copied from the owning process. Per-thread CPU accounting is not
    /// reported; every thread carries the process-level value.
    pub cpu_percent: f64,
}

/// Full metrics of a process that was sampled successfully.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ProcessMetrics {
    pub pid: u32,
    pub name: String,

    /// Target of `/proc/[pid]/exe`, or `"N/A"`.
    #[serde(rename = "exe")]
    pub executable_path: String,

    /// Long state name, e.g. `running` or `sleeping`.
    pub status: String,

    /// CPU usage over the pass's measurement window. May exceed 100 on
    /// multi-core hosts.
    pub cpu_percent: f64,

    pub memory_rss_mb: f64,
    pub memory_vms_mb: f64,

    /// RSS as a share of total system memory.
    pub memory_percent: f64,

    #[serde(rename = "num_threads")]
    pub thread_count: u32,

    /// Seconds since the Unix epoch.
    #[serde(rename = "create_time")]
    pub creation_time: f64,

    pub threads: Vec<ThreadSample>,

    /// Arguments joined with spaces, or `"N/A"`.
    #[serde(rename = "cmdline")]
    pub command_line: String,
}

/// A pid that was observed but could not be sampled.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct FailedSample {
    pub pid: u32,
    pub error: String,
}

/// One entry of a batch's `processes` array.
///
/// A failed entry carries only `pid` and `error`; none of the metric fields
/// exist for it.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum ProcessSample {
    Sampled(ProcessMetrics),
    Failed(FailedSample),
}

impl ProcessSample {
    pub fn failed(pid: u32, error: impl ToString) -> Self {
        ProcessSample::Failed(FailedSample {
            pid,
            error: error.to_string(),
        })
    }

    pub fn pid(&self) -> u32 {
        match self {
            ProcessSample::Sampled(m) => m.pid,
            ProcessSample::Failed(f) => f.pid,
        }
    }

    /// The sampled metrics, or `None` for a failed entry.
    pub fn metrics(&self) -> Option<&ProcessMetrics> {
        match self {
            ProcessSample::Sampled(m) => Some(m),
            ProcessSample::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ProcessSample::Sampled(_) => None,
            ProcessSample::Failed(f) => Some(&f.error),
        }
    }
}

//! System-wide facts from `/proc/`: total memory and boot time.

use crate::collector::procfs::parser::{parse_boot_time, parse_mem_total};
use crate::collector::procfs::process::CollectError;
use crate::collector::traits::FileSystem;
use std::path::Path;

/// Host facts the process collector needs for derived metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemInfo {
    /// `MemTotal` from `/proc/meminfo`, in kB.
    pub mem_total_kb: u64,
    /// Boot time in seconds since epoch (`btime` from `/proc/stat`).
    pub boot_time: u64,
}

/// Collects system-wide metrics from `/proc/`.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Reads total memory (kB) from `/proc/meminfo`.
    pub fn collect_mem_total(&self) -> Result<u64, CollectError> {
        let path = format!("{}/meminfo", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        Ok(parse_mem_total(&content)?)
    }

    /// Reads boot time from `/proc/stat`.
    pub fn collect_boot_time(&self) -> Result<u64, CollectError> {
        let path = format!("{}/stat", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        Ok(parse_boot_time(&content)?)
    }

    /// Checks that process metrics can be collected at all.
    ///
    /// The process table must be listable and memory/boot information
    /// readable. A failure here means the agent cannot do its job.
    pub fn probe(&self) -> Result<SystemInfo, CollectError> {
        self.fs.read_dir(Path::new(&self.proc_path))?;

        let mem_total_kb = self.collect_mem_total()?;
        if mem_total_kb == 0 {
            return Err(CollectError::Parse("MemTotal is zero".to_string()));
        }

        Ok(SystemInfo {
            mem_total_kb,
            boot_time: self.collect_boot_time()?,
        })
    }
}

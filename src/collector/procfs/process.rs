//! Process enumeration and per-process sampling from `/proc/[pid]/`.
//!
//! Sampling happens in two steps. [`ProcessCollector::enumerate`] lists the
//! process table, applies the name filter and records a CPU-time baseline for
//! every match. After the caller's measurement window, [`ProcessCollector::collect`]
//! reads each process in full. The process table keeps changing between and
//! during both steps; a pid that vanishes is skipped during enumeration and
//! reported as a failed sample during collection.

use crate::collector::procfs::parser::{
    ParseError, ProcStat, parse_cmdline, parse_proc_stat, parse_proc_status, status_name,
};
use crate::collector::traits::FileSystem;
use crate::model::{NOT_AVAILABLE, ProcessMetrics, ProcessSample, ThreadSample};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Clock ticks per second (USER_HZ). Standard value for Linux.
pub const CLK_TCK: u64 = 100;

/// Longest `comm` the kernel stores; longer names are cut to this length.
const COMM_MAX_LEN: usize = 15;

/// `ESRCH`: reads under `/proc/[pid]` of a process being reaped fail with it.
const ESRCH: i32 = 3;

/// Error for a whole sampling pass (the process table itself is unreadable).
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading system files.
    Io(io::Error),
    /// Parse error in system files.
    Parse(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<io::Error> for CollectError {
    fn from(e: io::Error) -> Self {
        CollectError::Io(e)
    }
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::Parse(e.message)
    }
}

/// Why a single process could not be sampled.
///
/// Rendered into the `error` field of a failed sample.
#[derive(Debug)]
pub enum SampleError {
    /// The process exited (or its pid was reused).
    NoSuchProcess(u32),
    /// The agent lacks the privileges to read the process.
    AccessDenied(u32),
    /// The process has terminated but was not reaped yet.
    Zombie(u32),
    /// A `/proc` file had unexpected content.
    Malformed { pid: u32, message: String },
    /// Any other I/O failure.
    Io { pid: u32, source: io::Error },
}

impl SampleError {
    /// Classifies an I/O error from a read under `/proc/[pid]/`.
    pub fn from_io(pid: u32, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SampleError::NoSuchProcess(pid),
            io::ErrorKind::PermissionDenied => SampleError::AccessDenied(pid),
            _ if err.raw_os_error() == Some(ESRCH) => SampleError::NoSuchProcess(pid),
            _ => SampleError::Io { pid, source: err },
        }
    }

    pub fn pid(&self) -> u32 {
        match self {
            SampleError::NoSuchProcess(pid)
            | SampleError::AccessDenied(pid)
            | SampleError::Zombie(pid)
            | SampleError::Malformed { pid, .. }
            | SampleError::Io { pid, .. } => *pid,
        }
    }
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::NoSuchProcess(pid) => {
                write!(f, "process no longer exists (pid={})", pid)
            }
            SampleError::AccessDenied(pid) => write!(f, "access denied (pid={})", pid),
            SampleError::Zombie(pid) => write!(f, "process is a zombie (pid={})", pid),
            SampleError::Malformed { pid, message } => {
                write!(f, "malformed /proc data (pid={}): {}", pid, message)
            }
            SampleError::Io { pid, source } => write!(f, "I/O error (pid={}): {}", pid, source),
        }
    }
}

impl std::error::Error for SampleError {}

/// A process selected for sampling, with its CPU-time baseline.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pub pid: u32,
    pub name: String,
    /// utime + stime at enumeration.
    cpu_ticks: u64,
    /// Identifies the process across pid reuse.
    starttime: u64,
    observed_at: Instant,
}

/// Outcome of scanning the process table.
#[derive(Debug, Default)]
pub struct Enumeration {
    /// Processes to sample, with their CPU baselines.
    pub handles: Vec<ProcessHandle>,
    /// Processes that are present but could not be probed.
    pub failed: Vec<SampleError>,
}

/// Case-insensitive substring match; an empty filter matches everything.
pub fn matches_filter(name: &str, filter: &str) -> bool {
    filter.is_empty() || name.to_lowercase().contains(&filter.to_lowercase())
}

/// CPU utilisation in percent of one core over `elapsed`.
///
/// Returns 0 for an empty window.
pub fn cpu_percent(delta_ticks: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    delta_ticks as f64 / CLK_TCK as f64 / secs * 100.0
}

/// Undoes the kernel's 15-byte `comm` truncation using `argv[0]`.
fn resolve_name(comm: &str, args: &[String]) -> String {
    if comm.len() >= COMM_MAX_LEN
        && let Some(argv0) = args.first()
    {
        let base = argv0.rsplit('/').next().unwrap_or(argv0);
        if base.starts_with(comm) {
            return base.to_string();
        }
    }
    comm.to_string()
}

fn kb_to_mb(kb: u64) -> f64 {
    kb as f64 / 1024.0
}

/// Lists processes and samples them from `/proc/[pid]/` files.
pub struct ProcessCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
    /// System boot time (seconds since epoch), used to calculate process start time.
    boot_time: u64,
    /// Total system memory in kB, used for `memory_percent`.
    mem_total_kb: u64,
}

impl<F: FileSystem> ProcessCollector<F> {
    /// Creates a new process collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            boot_time: 0,
            mem_total_kb: 0,
        }
    }

    /// Sets the system boot time for calculating process creation times.
    ///
    /// Until it is set, `creation_time` is reported as 0.
    pub fn set_boot_time(&mut self, boot_time: u64) {
        self.boot_time = boot_time;
    }

    /// Sets total system memory (kB). Until it is set, `memory_percent` is 0.
    pub fn set_mem_total(&mut self, mem_total_kb: u64) {
        self.mem_total_kb = mem_total_kb;
    }

    /// Process creation time in seconds since epoch.
    ///
    /// Formula: boot_time + starttime_jiffies / CLK_TCK
    fn calculate_process_start_time(&self, starttime_jiffies: u64) -> f64 {
        if self.boot_time == 0 {
            return 0.0;
        }
        self.boot_time as f64 + starttime_jiffies as f64 / CLK_TCK as f64
    }

    fn pid_dir(&self, pid: u32) -> PathBuf {
        Path::new(&self.proc_path).join(pid.to_string())
    }

    fn read_pid_file(&self, pid: u32, file: &str) -> Result<String, SampleError> {
        self.fs
            .read_to_string(&self.pid_dir(pid).join(file))
            .map_err(|e| SampleError::from_io(pid, e))
    }

    fn read_stat(&self, pid: u32) -> Result<ProcStat, SampleError> {
        let content = self.read_pid_file(pid, "stat")?;
        parse_proc_stat(&content).map_err(|e| SampleError::Malformed {
            pid,
            message: e.message,
        })
    }

    fn read_args(&self, pid: u32) -> Option<Vec<String>> {
        self.read_pid_file(pid, "cmdline")
            .ok()
            .map(|content| parse_cmdline(&content))
    }

    /// Probes one pid: reads its name and CPU baseline.
    pub fn handle(&self, pid: u32) -> Result<ProcessHandle, SampleError> {
        let observed_at = Instant::now();
        let stat = self.read_stat(pid)?;

        let name = if stat.comm.len() >= COMM_MAX_LEN {
            let args = self.read_args(pid).unwrap_or_default();
            resolve_name(&stat.comm, &args)
        } else {
            stat.comm.clone()
        };

        Ok(ProcessHandle {
            pid,
            name,
            cpu_ticks: stat.cpu_ticks(),
            starttime: stat.starttime,
            observed_at,
        })
    }

    /// Lists every visible process whose name matches `filter`.
    ///
    /// Processes that exit while the table is being scanned are skipped.
    /// Any other per-process failure is returned in [`Enumeration::failed`]
    /// when no filter is set; with a filter the name is unknown and the
    /// process is skipped. Only a failure to list the process table itself
    /// is an error.
    pub fn enumerate(&self, filter: Option<&str>) -> Result<Enumeration, CollectError> {
        let filter = filter.unwrap_or_default();
        let entries = self.fs.read_dir(Path::new(&self.proc_path))?;

        let mut enumeration = Enumeration::default();
        for entry in entries {
            // Check if entry is a PID directory (numeric name)
            let Some(pid) = entry
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<u32>().ok())
            else {
                continue;
            };

            match self.handle(pid) {
                Ok(handle) if matches_filter(&handle.name, filter) => {
                    enumeration.handles.push(handle)
                }
                Ok(_) => {}
                Err(SampleError::NoSuchProcess(_)) => {
                    trace!("process {} exited during enumeration", pid);
                }
                Err(e) if filter.is_empty() => {
                    trace!("process {} not probed: {}", pid, e);
                    enumeration.failed.push(e);
                }
                Err(e) => warn!("skipping process {}: {}", pid, e),
            }
        }

        Ok(enumeration)
    }

    /// Samples one process. Never fails: any error becomes a failed sample.
    pub fn collect(&self, handle: &ProcessHandle) -> ProcessSample {
        match self.try_collect(handle) {
            Ok(metrics) => ProcessSample::Sampled(metrics),
            Err(e) => {
                trace!("process {} not sampled: {}", handle.pid, e);
                ProcessSample::failed(handle.pid, e)
            }
        }
    }

    fn try_collect(&self, handle: &ProcessHandle) -> Result<ProcessMetrics, SampleError> {
        let pid = handle.pid;

        let stat = self.read_stat(pid)?;
        if stat.starttime != handle.starttime {
            // Same pid, different process.
            return Err(SampleError::NoSuchProcess(pid));
        }
        if stat.state == 'Z' {
            return Err(SampleError::Zombie(pid));
        }

        let executable_path = self.read_exe(pid)?;

        let status_content = self.read_pid_file(pid, "status")?;
        let status = parse_proc_status(&status_content).map_err(|e| SampleError::Malformed {
            pid,
            message: e.message,
        })?;

        let cpu = cpu_percent(
            stat.cpu_ticks().saturating_sub(handle.cpu_ticks),
            handle.observed_at.elapsed(),
        );

        let memory_percent = if self.mem_total_kb > 0 {
            status.vm_rss as f64 / self.mem_total_kb as f64 * 100.0
        } else {
            0.0
        };

        let command_line = match self.read_args(pid) {
            Some(args) if !args.is_empty() => args.join(" "),
            _ => NOT_AVAILABLE.to_string(),
        };

        Ok(ProcessMetrics {
            pid,
            name: handle.name.clone(),
            executable_path,
            status: status_name(stat.state).to_string(),
            cpu_percent: cpu,
            memory_rss_mb: kb_to_mb(status.vm_rss),
            memory_vms_mb: kb_to_mb(status.vm_size),
            memory_percent,
            thread_count: u32::try_from(stat.num_threads).unwrap_or(0),
            creation_time: self.calculate_process_start_time(stat.starttime),
            threads: self.read_threads(pid, cpu),
            command_line,
        })
    }

    /// Resolves `/proc/[pid]/exe`.
    ///
    /// Kernel threads have no executable and report `"N/A"`; an unreadable
    /// link of a user process means access is denied.
    fn read_exe(&self, pid: u32) -> Result<String, SampleError> {
        match self.fs.read_link(&self.pid_dir(pid).join("exe")) {
            Ok(target) if target.as_os_str().is_empty() => Ok(NOT_AVAILABLE.to_string()),
            Ok(target) => Ok(target.to_string_lossy().into_owned()),
            Err(e) => match SampleError::from_io(pid, e) {
                SampleError::NoSuchProcess(_) if self.fs.exists(&self.pid_dir(pid)) => {
                    Ok(NOT_AVAILABLE.to_string())
                }
                SampleError::Io { source, .. } => {
                    trace!("exe of process {} unavailable: {}", pid, source);
                    Ok(NOT_AVAILABLE.to_string())
                }
                err => Err(err),
            },
        }
    }

    /// Lists `/proc/[pid]/task/` in tid order.
    ///
    /// Every thread reports the process-level `cpu_percent`. A failure here
    /// yields no threads rather than a failed sample.
    fn read_threads(&self, pid: u32, cpu_percent: f64) -> Vec<ThreadSample> {
        let entries = match self.fs.read_dir(&self.pid_dir(pid).join("task")) {
            Ok(entries) => entries,
            Err(e) => {
                trace!("threads of process {} unavailable: {}", pid, e);
                return Vec::new();
            }
        };

        let mut tids: Vec<u32> = entries
            .iter()
            .filter_map(|entry| entry.file_name()?.to_str()?.parse().ok())
            .collect();
        tids.sort_unstable();

        tids.into_iter()
            .map(|thread_id| ThreadSample {
                thread_id,
                cpu_percent,
            })
            .collect()
    }
}

//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string inputs.

use std::collections::HashMap;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parsed data from `/proc/[pid]/stat`.
///
/// Only the fields the sampler reports are kept.
#[derive(Debug, Clone, Default)]
pub struct ProcStat {
    pub pid: u32,
    pub comm: String,
    pub state: char,
    /// User-mode CPU time in clock ticks.
    pub utime: u64,
    /// Kernel-mode CPU time in clock ticks.
    pub stime: u64,
    pub num_threads: i32,
    /// Start time after boot, in clock ticks.
    pub starttime: u64,
}

impl ProcStat {
    /// Total CPU time consumed so far, in clock ticks.
    pub fn cpu_ticks(&self) -> u64 {
        self.utime + self.stime
    }
}

/// Parses `/proc/[pid]/stat` content.
///
/// The format is tricky because the comm field can contain spaces and parentheses.
/// Format: pid (comm) state ppid pgrp session tty_nr ...
pub fn parse_proc_stat(content: &str) -> Result<ProcStat, ParseError> {
    let content = content.trim();

    // comm is everything between the first '(' and the last ')'
    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' in stat"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    if close_paren <= open_paren {
        return Err(ParseError::new("invalid parentheses in stat"));
    }

    let pid: u32 = content[..open_paren]
        .trim()
        .parse()
        .map_err(|_| ParseError::new("invalid pid"))?;

    let comm = content[open_paren + 1..close_paren].to_string();

    // Field indexes below are relative to the first field after ')', i.e. state = 0.
    let remaining = &content[close_paren + 1..];
    let fields: Vec<&str> = remaining.split_whitespace().collect();

    if fields.len() < 20 {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected 20+, got {}",
            fields.len()
        )));
    }

    let parse_field_u64 = |idx: usize, name: &str| -> Result<u64, ParseError> {
        fields[idx]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    Ok(ProcStat {
        pid,
        comm,
        state: fields[0].chars().next().unwrap_or('?'),
        utime: parse_field_u64(11, "utime")?,
        stime: parse_field_u64(12, "stime")?,
        num_threads: fields[17]
            .parse()
            .map_err(|_| ParseError::new("invalid num_threads"))?,
        starttime: parse_field_u64(19, "starttime")?,
    })
}

/// Parsed data from `/proc/[pid]/status`.
#[derive(Debug, Clone, Default)]
pub struct ProcStatus {
    /// Virtual memory size (kB).
    pub vm_size: u64,
    /// Resident set size (kB).
    pub vm_rss: u64,
}

/// Parses `/proc/[pid]/status` content.
///
/// Format is key:\tvalue pairs, one per line. Kernel threads and zombies
/// have no `Vm*` lines; those read as zero.
pub fn parse_proc_status(content: &str) -> Result<ProcStatus, ParseError> {
    let mut fields: HashMap<&str, &str> = HashMap::new();

    for line in content.lines() {
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim(), value.trim());
        }
    }

    if fields.is_empty() {
        return Err(ParseError::new("empty status"));
    }

    // Memory fields are in kB format: "12345 kB"
    let parse_kb = |key: &str| -> u64 {
        fields
            .get(key)
            .and_then(|s| s.split_whitespace().next())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    Ok(ProcStatus {
        vm_size: parse_kb("VmSize"),
        vm_rss: parse_kb("VmRSS"),
    })
}

/// Splits `/proc/[pid]/cmdline` into its NUL-separated arguments.
///
/// Kernel threads and zombies have an empty cmdline, which yields no arguments.
pub fn parse_cmdline(content: &str) -> Vec<String> {
    content
        .trim_end_matches('\0')
        .split('\0')
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads `MemTotal` from `/proc/meminfo`, in kB.
pub fn parse_mem_total(content: &str) -> Result<u64, ParseError> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("MemTotal:"))
        .and_then(|rest| rest.split_whitespace().next())
        .ok_or_else(|| ParseError::new("MemTotal not found in meminfo"))?
        .parse()
        .map_err(|_| ParseError::new("invalid MemTotal"))
}

/// Reads the `btime` line (boot time, seconds since epoch) from `/proc/stat`.
pub fn parse_boot_time(content: &str) -> Result<u64, ParseError> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("btime "))
        .ok_or_else(|| ParseError::new("btime not found in stat"))?
        .trim()
        .parse()
        .map_err(|_| ParseError::new("invalid btime"))
}

/// Maps the one-letter state from `/proc/[pid]/stat` to its long name.
pub fn status_name(state: char) -> &'static str {
    match state {
        'R' => "running",
        'S' => "sleeping",
        'D' => "disk-sleep",
        'T' => "stopped",
        't' => "tracing-stop",
        'Z' => "zombie",
        'X' | 'x' => "dead",
        'K' => "wake-kill",
        'W' => "waking",
        'P' => "parked",
        'I' => "idle",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proc_stat_basic() {
        let content = "1234 (bash) S 1233 1234 1234 34816 1235 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0 100000 25000000 2000 18446744073709551615 0 0 0 0 0 0 65536 3670020 1266777851 0 0 0 17 2 0 0 5 0 0 0 0 0 0 0 0 0 0";
        let stat = parse_proc_stat(content).unwrap();

        assert_eq!(stat.pid, 1234);
        assert_eq!(stat.comm, "bash");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.utime, 100);
        assert_eq!(stat.stime, 50);
        assert_eq!(stat.cpu_ticks(), 150);
        assert_eq!(stat.num_threads, 1);
        assert_eq!(stat.starttime, 100000);
    }

    #[test]
    fn test_parse_proc_stat_with_spaces_in_comm() {
        let content = "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0";
        let stat = parse_proc_stat(content).unwrap();

        assert_eq!(stat.pid, 5000);
        assert_eq!(stat.comm, "Web Content");
        assert_eq!(stat.num_threads, 20);
    }

    #[test]
    fn test_parse_proc_stat_with_parentheses_in_comm() {
        let content = "5001 (test(1)) S 1 5001 5001 0 -1 4194304 1000 0 0 0 10 5 0 0 20 0 1 0 500100 10000000 1000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0";
        let stat = parse_proc_stat(content).unwrap();

        assert_eq!(stat.pid, 5001);
        assert_eq!(stat.comm, "test(1)");
    }

    #[test]
    fn test_parse_proc_stat_zombie() {
        let content = "4000 (defunct) Z 1000 4000 1000 0 -1 4194308 0 0 0 0 0 0 0 0 20 0 1 0 400000 0 0 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 -1 0 0 0 0 0 0 0 0 0 0 0 0 0 0";
        let stat = parse_proc_stat(content).unwrap();

        assert_eq!(stat.pid, 4000);
        assert_eq!(stat.state, 'Z');
    }

    #[test]
    fn test_parse_proc_stat_truncated() {
        let err = parse_proc_stat("77 (short) S 1 2 3").unwrap_err();
        assert!(err.message.contains("not enough fields"));

        assert!(parse_proc_stat("").is_err());
        assert!(parse_proc_stat("abc (x) S").is_err());
    }

    #[test]
    fn test_parse_proc_status() {
        let content = "\
Name:\tbash
State:\tS (sleeping)
Pid:\t1234
PPid:\t1233
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
Threads:\t3
voluntary_ctxt_switches:\t500
";
        let status = parse_proc_status(content).unwrap();

        assert_eq!(status.vm_size, 25000);
        assert_eq!(status.vm_rss, 8000);
    }

    #[test]
    fn test_parse_proc_status_kernel_thread() {
        let content = "Name:\tkthreadd\nState:\tS (sleeping)\nPid:\t2\nThreads:\t1\n";
        let status = parse_proc_status(content).unwrap();

        assert_eq!(status.vm_size, 0);
        assert_eq!(status.vm_rss, 0);
    }

    #[test]
    fn test_parse_proc_status_empty() {
        assert!(parse_proc_status("").is_err());
    }

    #[test]
    fn test_parse_cmdline() {
        assert_eq!(
            parse_cmdline("/bin/bash\0--login\0"),
            vec!["/bin/bash", "--login"]
        );
        assert_eq!(parse_cmdline("/usr/bin/top"), vec!["/usr/bin/top"]);
        assert!(parse_cmdline("").is_empty());
        assert!(parse_cmdline("\0").is_empty());
    }

    #[test]
    fn test_parse_mem_total() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
";
        assert_eq!(parse_mem_total(content).unwrap(), 16384000);
        assert!(parse_mem_total("MemFree: 1 kB\n").is_err());
    }

    #[test]
    fn test_parse_boot_time() {
        let content = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
ctxt 500000
btime 1700000000
processes 10000
";
        assert_eq!(parse_boot_time(content).unwrap(), 1700000000);
        assert!(parse_boot_time("ctxt 1\n").is_err());
    }

    #[test]
    fn test_status_name() {
        assert_eq!(status_name('R'), "running");
        assert_eq!(status_name('S'), "sleeping");
        assert_eq!(status_name('D'), "disk-sleep");
        assert_eq!(status_name('Z'), "zombie");
        assert_eq!(status_name('I'), "idle");
        assert_eq!(status_name('?'), "unknown");
    }
}

//! Pre-built mock `/proc` scenarios for testing.
//!
//! Every scenario includes `/proc/meminfo` (16 GB) and `/proc/stat` with
//! `btime 1700000000`, so system facts resolve the same way everywhere.

use super::filesystem::MockFs;

const TAIL: &str = "18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0";

fn stat_line(head: &str) -> String {
    format!("{} {}", head, TAIL)
}

impl MockFs {
    /// System-wide files only, no processes.
    pub fn empty_system() -> Self {
        let fs = Self::new();
        fs.add_dir("/proc");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 5000 250 1500 40000 500 100 50 0 0 0
cpu1 5000 250 1500 40000 500 100 50 0 0 0
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs
    }

    /// A small container-like process table.
    ///
    /// Includes: init (PID 1), kthreadd (PID 2, kernel thread), a bash shell
    /// (1000) running `cat` (1001), and a three-threaded python server (1500).
    pub fn typical_system() -> Self {
        let fs = Self::empty_system();

        fs.add_process(
            1,
            &stat_line(
                "1 (systemd) S 0 1 1 0 -1 4194560 50000 1000000 100 500 1000 500 2000 1000 20 0 1 0 1 170000000 3000",
            ),
            "\
Name:\tsystemd
State:\tS (sleeping)
Pid:\t1
PPid:\t0
VmPeak:\t  200000 kB
VmSize:\t  170000 kB
VmRSS:\t   12000 kB
Threads:\t1
",
            "/sbin/init\0",
            Some("/usr/lib/systemd/systemd"),
            &[1],
        );

        fs.add_process(
            2,
            &stat_line("2 (kthreadd) S 0 0 0 0 -1 2129984 0 0 0 0 0 3 0 0 20 0 1 0 2 0 0"),
            "\
Name:\tkthreadd
State:\tS (sleeping)
Pid:\t2
PPid:\t0
Threads:\t1
",
            "",
            None,
            &[2],
        );

        fs.add_process(
            1000,
            &stat_line(
                "1000 (bash) S 999 1000 1000 34816 1001 4194304 5000 50000 0 0 100 50 200 100 20 0 1 0 100000 25000000 2000",
            ),
            "\
Name:\tbash
State:\tS (sleeping)
Pid:\t1000
PPid:\t999
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
Threads:\t1
",
            "/bin/bash\0--login\0",
            Some("/usr/bin/bash"),
            &[1000],
        );

        fs.add_process(
            1001,
            &stat_line(
                "1001 (cat) R 1000 1000 1000 34816 1001 4194304 100 0 0 0 5 2 0 0 20 0 1 0 100100 5000000 500",
            ),
            "\
Name:\tcat
State:\tR (running)
Pid:\t1001
PPid:\t1000
VmSize:\t    5000 kB
VmRSS:\t    2000 kB
Threads:\t1
",
            "/bin/cat\0file.txt\0",
            Some("/usr/bin/cat"),
            &[1001],
        );

        fs.add_process(
            1500,
            &stat_line(
                "1500 (python3) S 1 1500 1500 0 -1 4194304 3000 0 10 0 250 50 0 0 20 0 3 0 150000 300000000 8000",
            ),
            "\
Name:\tpython3
State:\tS (sleeping)
Pid:\t1500
PPid:\t1
VmSize:\t  300000 kB
VmRSS:\t   51200 kB
Threads:\t3
",
            "/usr/bin/python3\0-m\0http.server\x008080\0",
            Some("/usr/bin/python3.12"),
            &[1500, 1502, 1501],
        );

        fs
    }

    /// Creates a system with a zombie process (PID 4000).
    pub fn with_zombie_process() -> Self {
        let fs = Self::typical_system();

        fs.add_process(
            4000,
            "4000 (defunct) Z 1000 4000 1000 0 -1 4194308 0 0 0 0 0 0 0 0 20 0 1 0 400000 0 0 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 -1 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tdefunct
State:\tZ (zombie)
Pid:\t4000
PPid:\t1000
Threads:\t1
",
            "",
            None,
            &[4000],
        );

        fs
    }

    /// Creates a system with processes that have special characters in names.
    pub fn with_special_names() -> Self {
        let fs = Self::typical_system();

        // Process with spaces in name (like Firefox's "Web Content")
        fs.add_process(
            5000,
            &stat_line(
                "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000",
            ),
            "Name:\tWeb Content\nVmSize:\t 2000000 kB\nVmRSS:\t  200000 kB\n",
            "/usr/lib/firefox/firefox\0-contentproc\0",
            Some("/usr/lib/firefox/firefox"),
            &[5000],
        );

        // Process with parentheses in name
        fs.add_process(
            5001,
            &stat_line(
                "5001 (test(1)) S 1 5001 5001 0 -1 4194304 1000 0 0 0 10 5 0 0 20 0 1 0 500100 10000000 1000",
            ),
            "Name:\ttest(1)\nVmSize:\t   10000 kB\nVmRSS:\t    4000 kB\n",
            "/usr/bin/test(1)\0",
            Some("/usr/bin/test(1)"),
            &[5001],
        );

        fs
    }

    /// Adds a process whose 15-byte `comm` is a truncation of its real name
    /// (`gunicorn-worker-pool`, PID 1600).
    pub fn with_truncated_name() -> Self {
        let fs = Self::typical_system();

        fs.add_process(
            1600,
            &stat_line(
                "1600 (gunicorn-worker) S 1 1600 1600 0 -1 4194304 100 0 0 0 40 10 0 0 20 0 1 0 160000 90000000 5000",
            ),
            "Name:\tgunicorn-worker\nVmSize:\t   90000 kB\nVmRSS:\t   20000 kB\n",
            "/opt/app/bin/gunicorn-worker-pool\0--workers\x004\0",
            Some("/opt/app/bin/gunicorn-worker-pool"),
            &[1600],
        );

        fs
    }

    /// Adds a process owned by another user (PID 6000) whose `exe` link
    /// cannot be read.
    pub fn with_restricted_process() -> Self {
        let fs = Self::typical_system();

        fs.add_process(
            6000,
            &stat_line(
                "6000 (postgres) S 1 6000 6000 0 -1 4194304 100 0 0 0 30 20 0 0 20 0 1 0 600000 200000000 10000",
            ),
            "Name:\tpostgres\nVmSize:\t  200000 kB\nVmRSS:\t   40000 kB\n",
            "/usr/lib/postgresql/16/bin/postgres\0-D\0/var/lib/postgresql\0",
            Some("/usr/lib/postgresql/16/bin/postgres"),
            &[6000],
        );
        fs.deny("/proc/6000/exe");

        fs
    }
}

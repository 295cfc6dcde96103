//! Main collector that runs one sampling pass over the process table.
//!
//! A pass enumerates the table, waits one CPU measurement window, then
//! samples every selected process. The window is shared by all processes,
//! so a pass costs one window no matter how many processes there are.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::collector::procfs::{
    CollectError, Enumeration, ProcessCollector, SystemCollector, SystemInfo,
};
use crate::collector::traits::FileSystem;
use crate::model::ProcessSample;
use crate::sampler::BatchSource;

/// Main collector that gathers process samples.
pub struct Collector<F: FileSystem + Clone> {
    process_collector: ProcessCollector<F>,
    system_collector: SystemCollector<F>,
    /// Case-insensitive name filter; `None` samples everything.
    filter: Option<String>,
    cpu_window: Duration,
}

impl<F: FileSystem + Clone> Collector<F> {
    /// Default CPU measurement window.
    pub const DEFAULT_CPU_WINDOW: Duration = Duration::from_millis(100);

    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    ///
    /// Call [`Collector::probe`] before the first pass so creation times and
    /// memory percentages can be derived.
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        let proc_path = proc_path.into();
        Self {
            process_collector: ProcessCollector::new(fs.clone(), &proc_path),
            system_collector: SystemCollector::new(fs, &proc_path),
            filter: None,
            cpu_window: Self::DEFAULT_CPU_WINDOW,
        }
    }

    /// Restricts sampling to processes whose name contains `filter`
    /// (case-insensitive). An empty filter samples everything.
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.filter(|f| !f.is_empty());
        self
    }

    /// Sets the CPU measurement window.
    pub fn with_cpu_window(mut self, window: Duration) -> Self {
        self.cpu_window = window;
        self
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Verifies that `/proc` is usable and loads boot time and total memory.
    pub fn probe(&mut self) -> Result<SystemInfo, CollectError> {
        let info = self.system_collector.probe()?;
        self.process_collector.set_boot_time(info.boot_time);
        self.process_collector.set_mem_total(info.mem_total_kb);
        Ok(info)
    }

    /// Runs one sampling pass.
    ///
    /// Only a failure to list the process table is an error; per-process
    /// failures are returned as failed samples.
    pub fn collect_processes(&mut self) -> Result<Vec<ProcessSample>, CollectError> {
        let start = Instant::now();

        let Enumeration { handles, failed } =
            self.process_collector.enumerate(self.filter.as_deref())?;
        let enumerated = start.elapsed();

        if !self.cpu_window.is_zero() {
            std::thread::sleep(self.cpu_window);
        }

        let mut samples: Vec<ProcessSample> = handles
            .iter()
            .map(|handle| self.process_collector.collect(handle))
            .collect();
        samples.extend(failed.into_iter().map(|e| ProcessSample::failed(e.pid(), e)));

        let failed = samples.iter().filter(|s| s.error().is_some()).count();
        debug!(
            "Sampled {} processes ({} failed): enumerate={:?}, total={:?}",
            samples.len(),
            failed,
            enumerated,
            start.elapsed()
        );

        Ok(samples)
    }
}

impl<F: FileSystem + Clone> BatchSource for Collector<F> {
    fn collect_batch(&mut self) -> Result<Vec<ProcessSample>, CollectError> {
        self.collect_processes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn collector(fs: MockFs) -> Collector<MockFs> {
        let mut collector = Collector::new(fs, "/proc").with_cpu_window(Duration::ZERO);
        collector.probe().unwrap();
        collector
    }

    #[test]
    fn test_collect_all_processes() {
        let mut collector = collector(MockFs::typical_system());

        let samples = collector.collect_processes().unwrap();
        assert_eq!(samples.len(), 5);
        assert!(samples.iter().all(|s| s.error().is_none()));

        let mut pids: Vec<u32> = samples.iter().map(|s| s.pid()).collect();
        pids.sort();
        assert_eq!(pids, vec![1, 2, 1000, 1001, 1500]);
    }

    #[test]
    fn test_collect_with_filter() {
        let mut collector =
            collector(MockFs::typical_system()).with_filter(Some("BaSh".to_string()));

        let samples = collector.collect_processes().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].metrics().unwrap().name, "bash");
    }

    #[test]
    fn test_empty_filter_means_all() {
        let collector = collector(MockFs::typical_system()).with_filter(Some(String::new()));
        assert_eq!(collector.filter(), None);
    }

    #[test]
    fn test_collect_mixed_outcomes() {
        let mut collector = collector(MockFs::with_zombie_process());

        let samples = collector.collect_processes().unwrap();
        assert_eq!(samples.len(), 6);

        let zombie = samples.iter().find(|s| s.pid() == 4000).unwrap();
        assert_eq!(zombie.error(), Some("process is a zombie (pid=4000)"));
        assert_eq!(samples.iter().filter(|s| s.error().is_none()).count(), 5);
    }

    #[test]
    fn test_unreadable_process_is_reported() {
        let fs = MockFs::typical_system();
        fs.add_file("/proc/7000/stat", "");
        fs.deny("/proc/7000/stat");
        let mut collector = collector(fs);

        let samples = collector.collect_processes().unwrap();
        assert_eq!(samples.len(), 6);

        let denied = samples.iter().find(|s| s.pid() == 7000).unwrap();
        assert_eq!(denied.error(), Some("access denied (pid=7000)"));
    }

    #[test]
    fn test_unreadable_process_is_skipped_with_filter() {
        let fs = MockFs::typical_system();
        fs.add_file("/proc/7000/stat", "");
        fs.deny("/proc/7000/stat");
        let mut collector = collector(fs).with_filter(Some("bash".to_string()));

        let samples = collector.collect_processes().unwrap();
        assert_eq!(samples.len(), 1);
        assert!(samples.iter().all(|s| s.error().is_none()));
    }

    #[test]
    fn test_collect_empty_table() {
        let mut collector = collector(MockFs::empty_system());
        assert!(collector.collect_processes().unwrap().is_empty());
    }

    #[test]
    fn test_collect_fails_when_proc_disappears() {
        let fs = MockFs::typical_system();
        let mut collector = collector(fs.clone());

        fs.remove("/proc");
        assert!(collector.collect_processes().is_err());
    }

    #[test]
    fn test_probe_sets_derived_metrics() {
        let mut collector = collector(MockFs::typical_system()).with_filter(Some("systemd".into()));

        let samples = collector.collect_processes().unwrap();
        let metrics = samples[0].metrics().unwrap();
        // starttime = 1 jiffy
        assert!((metrics.creation_time - 1700000000.01).abs() < 1e-6);
        assert!(metrics.memory_percent > 0.0);
    }

    #[test]
    fn test_cpu_window_is_waited() {
        let mut collector = Collector::new(MockFs::empty_system(), "/proc")
            .with_cpu_window(Duration::from_millis(50));

        let start = Instant::now();
        collector.collect_processes().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}

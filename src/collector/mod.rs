//! Process metrics collection for Linux.
//!
//! Everything is read from the `/proc` filesystem through the [`FileSystem`]
//! trait, so collectors run unchanged against [`MockFs`] in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Collector                         │
//! │  ┌──────────────────────────┐  ┌──────────────────────┐  │
//! │  │    ProcessCollector      │  │   SystemCollector    │  │
//! │  │  enumerate() (filter,    │  │  - /proc/meminfo     │  │
//! │  │    CPU baseline)         │  │  - /proc/stat btime  │  │
//! │  │  collect() per pid       │  └──────────┬───────────┘  │
//! │  └────────────┬─────────────┘             │              │
//! │               └─────────────┬─────────────┘              │
//! │                      ┌──────▼──────┐                     │
//! │                      │  FileSystem │ (trait)             │
//! │                      └──────┬──────┘                     │
//! └─────────────────────────────┼────────────────────────────┘
//!                     ┌─────────┴─────────┐
//!              ┌──────▼──────┐     ┌──────▼──────┐
//!              │   RealFs    │     │   MockFs    │
//!              └─────────────┘     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use procwatch::collector::{Collector, MockFs};
//! use std::time::Duration;
//!
//! let fs = MockFs::typical_system();
//! let mut collector = Collector::new(fs, "/proc").with_cpu_window(Duration::ZERO);
//! collector.probe().unwrap();
//! let samples = collector.collect_processes().unwrap();
//! assert!(!samples.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::Collector;
pub use mock::MockFs;
pub use procfs::{
    CollectError, Enumeration, ProcessCollector, ProcessHandle, SampleError, SystemInfo,
};
pub use traits::{FileSystem, RealFs};

//! Collectors for Linux `/proc` filesystem.
//!
//! This module provides parsers and collectors for reading system and process
//! information from the `/proc` virtual filesystem.

pub mod parser;
pub mod process;
pub mod system;

pub use process::{CollectError, Enumeration, ProcessCollector, ProcessHandle, SampleError};
pub use system::{SystemCollector, SystemInfo};

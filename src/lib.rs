//! procwatch - in-container process sampling agent.
//!
//! Periodically samples every process visible in `/proc` (optionally only
//! those whose name matches a filter) and writes each pass to stdout as one
//! JSON line. Lifecycle messages and collection failures are written to the
//! same stream as JSON log events.
//!
//! The library is driven by the `procwatchd` binary:
//! - [`collector`] reads `/proc` and builds per-process samples
//! - [`sampler`] runs the interval loop
//! - [`emitter`] serializes records as JSON lines
//! - [`shutdown`] turns termination signals into a cooperative stop

pub mod collector;
pub mod config;
pub mod emitter;
pub mod model;
pub mod sampler;
pub mod shutdown;

//! Records produced by one sampling pass.
//!
//! Nothing here outlives a pass: samples are built, serialized once by the
//! [`Emitter`](crate::emitter::Emitter) and dropped.

mod process;
mod record;

pub use process::{FailedSample, NOT_AVAILABLE, ProcessMetrics, ProcessSample, ThreadSample};
pub use record::{BatchKind, Level, LogEvent, SampleBatch, utc_timestamp};

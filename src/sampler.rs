//! The sampling loop.
//!
//! Lifecycle: `Starting → Running → Stopping → Stopped`. One INFO event is
//! emitted on start and one on stop, however many passes run in between.
//! Each pass is collected, emitted and followed by the interval wait; the
//! shutdown flag is checked before every pass and throughout the wait. A
//! failed pass becomes a single ERROR event and the loop carries on after
//! the normal wait. Passes never overlap and a batch is emitted whole or
//! not at all.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, error};

use crate::collector::CollectError;
use crate::emitter::{EmitError, Emitter};
use crate::model::{LogEvent, ProcessSample, SampleBatch};
use crate::shutdown::ShutdownFlag;

/// Granularity of the interruptible interval wait.
const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Produces the samples of one pass.
pub trait BatchSource {
    fn collect_batch(&mut self) -> Result<Vec<ProcessSample>, CollectError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: u64,
    pub failed_passes: u64,
}

pub struct Sampler<S: BatchSource, W: Write> {
    source: S,
    emitter: Emitter<W>,
    shutdown: ShutdownFlag,
    interval: Duration,
    filter: Option<String>,
    state: SamplerState,
}

impl<S: BatchSource, W: Write> Sampler<S, W> {
    /// `filter` is only used to describe the run in the start event.
    pub fn new(
        source: S,
        emitter: Emitter<W>,
        shutdown: ShutdownFlag,
        interval: Duration,
        filter: Option<&str>,
    ) -> Self {
        Self {
            source,
            emitter,
            shutdown,
            interval,
            filter: filter.filter(|f| !f.is_empty()).map(str::to_string),
            state: SamplerState::Starting,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Runs until shutdown is requested.
    ///
    /// Returns an error only when a record cannot be written; nothing more
    /// can be reported then.
    pub fn run(&mut self) -> Result<RunSummary, EmitError> {
        debug_assert_eq!(self.state, SamplerState::Starting);

        self.emitter.emit_event(&LogEvent::info(format!(
            "Process monitor started (interval: {}s, filter: {})",
            self.interval.as_secs(),
            self.filter.as_deref().unwrap_or("all")
        )))?;
        self.state = SamplerState::Running;

        let mut summary = RunSummary::default();
        while !self.shutdown.is_set() {
            match self.source.collect_batch() {
                Ok(processes) => {
                    let batch = SampleBatch::new(processes);
                    self.emitter.emit_batch(&batch)?;
                    summary.batches += 1;
                    debug!(
                        "Batch #{}: {} processes",
                        summary.batches, batch.total_processes
                    );
                }
                Err(e) => {
                    summary.failed_passes += 1;
                    error!("Failed to collect process metrics: {}", e);
                    self.emitter.emit_event(&LogEvent::error(format!(
                        "Error collecting process metrics: {}",
                        e
                    )))?;
                }
            }

            self.wait_interval();
        }

        self.state = SamplerState::Stopping;
        debug!(
            "Stopping after {} batches ({} failed passes)",
            summary.batches, summary.failed_passes
        );

        self.emitter
            .emit_event(&LogEvent::info("Process monitor stopped"))?;
        self.state = SamplerState::Stopped;

        Ok(summary)
    }

    /// Sleeps for the interval, waking early once shutdown is requested.
    fn wait_interval(&self) {
        let mut remaining = self.interval;
        while remaining > Duration::ZERO && !self.shutdown.is_set() {
            let sleep_time = remaining.min(WAIT_SLICE);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    pub fn into_emitter(self) -> Emitter<W> {
        self.emitter
    }
}

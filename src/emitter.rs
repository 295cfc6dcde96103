//! Line-delimited JSON output.
//!
//! Each call writes exactly one complete record followed by `\n` in a single
//! `write_all`, then flushes, so a log collector sees whole lines only and
//! without buffering delay.

use std::io::{self, Write};

use serde::Serialize;

use crate::model::{LogEvent, SampleBatch};

/// Error writing a record.
#[derive(Debug)]
pub enum EmitError {
    /// The output stream rejected the write or flush.
    Io(io::Error),
    /// The record could not be serialized.
    Json(serde_json::Error),
}

impl std::fmt::Display for EmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmitError::Io(e) => write!(f, "write error: {}", e),
            EmitError::Json(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for EmitError {}

impl From<io::Error> for EmitError {
    fn from(e: io::Error) -> Self {
        EmitError::Io(e)
    }
}

impl From<serde_json::Error> for EmitError {
    fn from(e: serde_json::Error) -> Self {
        EmitError::Json(e)
    }
}

/// Writes records to one output stream.
pub struct Emitter<W: Write> {
    out: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn emit_batch(&mut self, batch: &SampleBatch) -> Result<(), EmitError> {
        self.write_record(batch)
    }

    pub fn emit_event(&mut self, event: &LogEvent) -> Result<(), EmitError> {
        self.write_record(event)
    }

    /// Serializes fully before writing, so a serialization failure never
    /// leaves a partial line behind.
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<(), EmitError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.out.write_all(&line)?;
        self.out.flush()?;
        Ok(())
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Level, ProcessSample};
    use serde_json::Value;

    /// Records writes and flushes separately.
    #[derive(Default)]
    struct Recorder {
        writes: Vec<Vec<u8>>,
        flushes: usize,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_each_record_is_one_flushed_line() {
        let mut emitter = Emitter::new(Recorder::default());
        emitter
            .emit_event(&LogEvent::info("Process monitor started"))
            .unwrap();
        emitter
            .emit_batch(&SampleBatch::new(vec![ProcessSample::failed(
                9,
                "access denied (pid=9)",
            )]))
            .unwrap();

        let recorder = emitter.into_inner();
        assert_eq!(recorder.writes.len(), 2);
        assert_eq!(recorder.flushes, 2);
        for write in &recorder.writes {
            assert_eq!(write.last(), Some(&b'\n'));
            assert_eq!(write.iter().filter(|b| **b == b'\n').count(), 1);
        }
    }

    #[test]
    fn test_lines_parse_independently() {
        let mut emitter = Emitter::new(Vec::new());
        emitter.emit_event(&LogEvent::info("started")).unwrap();
        emitter.emit_batch(&SampleBatch::new(Vec::new())).unwrap();
        emitter.emit_event(&LogEvent::error("pass failed")).unwrap();

        let output = String::from_utf8(emitter.into_inner()).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[1]["type"], "process_metrics");
        assert_eq!(lines[1]["total_processes"], 0);
        assert_eq!(lines[2]["level"], "ERROR");
        assert_eq!(lines[2]["message"], "pass failed");
    }

    #[test]
    fn test_decoded_event_matches() {
        let event = LogEvent::error("Error collecting process metrics: I/O error");
        let mut emitter = Emitter::new(Vec::new());
        emitter.emit_event(&event).unwrap();

        let output = emitter.into_inner();
        let decoded: LogEvent = serde_json::from_slice(&output).unwrap();
        assert_eq!(decoded, event);
        assert_eq!(decoded.level, Level::Error);
    }

    #[test]
    fn test_write_error_is_reported() {
        let mut emitter = Emitter::new(Broken);
        let err = emitter.emit_event(&LogEvent::info("x")).unwrap_err();
        assert!(matches!(err, EmitError::Io(_)));
    }
}

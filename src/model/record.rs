//! Top-level records: the metrics batch and lifecycle/error events.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::process::ProcessSample;

/// Current UTC time as RFC 3339 with microseconds, e.g. `2026-01-05T10:00:00.123456Z`.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Value of the `type` field that marks a metrics batch.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    ProcessMetrics,
}

/// Every process sampled in one pass.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SampleBatch {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: BatchKind,
    /// Always `processes.len()`.
    pub total_processes: usize,
    pub processes: Vec<ProcessSample>,
}

impl SampleBatch {
    /// Stamps a finished pass with the current time.
    pub fn new(processes: Vec<ProcessSample>) -> Self {
        Self::at(utc_timestamp(), processes)
    }

    pub fn at(timestamp: impl Into<String>, processes: Vec<ProcessSample>) -> Self {
        Self {
            timestamp: timestamp.into(),
            kind: BatchKind::ProcessMetrics,
            total_processes: processes.len(),
            processes,
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Error,
}

/// Lifecycle or error notification outside the metrics channel.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct LogEvent {
    pub timestamp: String,
    pub level: Level,
    pub message: String,
}

impl LogEvent {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: utc_timestamp(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProcessMetrics, ThreadSample};
    use chrono::DateTime;
    use serde_json::Value;

    #[test]
    fn test_timestamp_is_rfc3339_utc() {
        let ts = utc_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_batch_counts_processes() {
        let batch = SampleBatch::new(vec![
            ProcessSample::failed(1, "access denied (pid=1)"),
            ProcessSample::failed(2, "access denied (pid=2)"),
        ]);
        assert_eq!(batch.total_processes, 2);

        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["type"], "process_metrics");
        assert_eq!(value["total_processes"], 2);
    }

    #[test]
    fn test_empty_batch() {
        let value = serde_json::to_value(SampleBatch::new(Vec::new())).unwrap();
        assert_eq!(value["total_processes"], 0);
        assert_eq!(value["processes"], Value::Array(Vec::new()));
    }

    #[test]
    fn test_batch_decodes_to_same_values() {
        let batch = SampleBatch::at(
            "2026-03-01T12:00:00.000001Z",
            vec![
                ProcessSample::Sampled(ProcessMetrics {
                    pid: 1000,
                    name: "bash".to_string(),
                    executable_path: "/bin/bash".to_string(),
                    status: "sleeping".to_string(),
                    cpu_percent: 0.99,
                    memory_rss_mb: 7.8125,
                    memory_vms_mb: 24.4140625,
                    memory_percent: 0.048828125,
                    thread_count: 1,
                    creation_time: 1700001000.0,
                    threads: vec![ThreadSample {
                        thread_id: 1000,
                        cpu_percent: 0.99,
                    }],
                    command_line: "/bin/bash --login".to_string(),
                }),
                ProcessSample::failed(4000, "process is a zombie (pid=4000)"),
            ],
        );

        let line = serde_json::to_string(&batch).unwrap();
        let decoded: SampleBatch = serde_json::from_str(&line).unwrap();
        assert_eq!(decoded, batch);
    }

    #[test]
    fn test_log_event_levels() {
        let value = serde_json::to_value(LogEvent::info("Process monitor stopped")).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "Process monitor stopped");
        assert!(value["timestamp"].is_string());

        let value = serde_json::to_value(LogEvent::error("boom")).unwrap();
        assert_eq!(value["level"], "ERROR");
    }
}

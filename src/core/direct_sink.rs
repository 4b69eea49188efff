//! Synchronous backend writing encoded records on the calling thread

use super::{
    error::Result,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    sink::{self, Backend, SharedSink},
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// The sink may be shared with a pipeline consumer that never returned
const SINK_LOCK_WAIT: Duration = Duration::from_millis(100);

/// How the direct backend turns a record into a line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordEncoding {
    /// Tab-separated: `2025-01-08T10:30:45.123Z\tINFO\tsrc/main.rs:12\tmessage`
    #[default]
    Console,

    /// One JSON object per line:
    /// `{"ts":"2025-01-08T10:30:45.123Z","level":"INFO","caller":"src/main.rs:12","msg":"message"}`
    Json,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    ts: String,
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<String>,
    msg: &'a str,
    thread: &'a str,
}

impl RecordEncoding {
    pub fn encode(&self, record: &LogRecord) -> Result<String> {
        let ts = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
        match self {
            RecordEncoding::Console => {
                let mut line = format!("{}\t{}", ts, record.level.to_str());
                if let Some(caller) = record.caller() {
                    line.push('\t');
                    line.push_str(&caller);
                }
                line.push('\t');
                line.push_str(&record.message);
                Ok(line)
            }
            RecordEncoding::Json => {
                let line = JsonLine {
                    ts,
                    level: record.level.to_str(),
                    caller: record.caller(),
                    msg: &record.message,
                    thread: record.thread_name.as_deref().unwrap_or(&record.thread_id),
                };
                Ok(serde_json::to_string(&line)?)
            }
        }
    }
}

/// Encodes each record and writes it to the structured sink immediately.
///
/// Sink failures are counted and reported once per failure streak through
/// the fallback sink; the calling thread never sees them.
pub struct DirectSink {
    sink: SharedSink,
    encoding: RecordEncoding,
    fallback: SharedSink,
    metrics: Arc<LoggerMetrics>,
    failing: AtomicBool,
}

impl DirectSink {
    pub fn new(
        sink: SharedSink,
        encoding: RecordEncoding,
        fallback: SharedSink,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            sink,
            encoding,
            fallback,
            metrics,
            failing: AtomicBool::new(false),
        }
    }

    pub fn encoding(&self) -> RecordEncoding {
        self.encoding
    }

    fn fail(&self, message: String) {
        self.metrics.record_sink_failure();
        if !self.failing.swap(true, Ordering::AcqRel) {
            sink::report(&self.fallback, LogLevel::Error, &message);
        }
    }
}

impl Backend for DirectSink {
    fn write(&self, record: LogRecord) {
        let line = match self.encoding.encode(&record) {
            Ok(line) => line,
            Err(e) => {
                self.fail(format!("[LOGGER ERROR] Failed to encode record: {}", e));
                return;
            }
        };

        let result = {
            let mut out = self.sink.lock();
            sink::write_guarded(out.as_mut(), record.level, &line)
                .map_err(|e| format!("[LOGGER ERROR] Sink '{}' failed: {}", out.name(), e))
        };

        match result {
            Ok(()) => self.failing.store(false, Ordering::Release),
            Err(message) => self.fail(message),
        }
    }

    fn flush(&self) -> Result<()> {
        sink::flush_shared(&self.sink, SINK_LOCK_WAIT)
    }

    fn name(&self) -> &str {
        "direct"
    }
}

//! Log record structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::panic::Location;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// A single log call, created at the call site and consumed by one backend
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub thread_id: String,
    pub thread_name: Option<String>,
}

impl LogRecord {
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so one call can never produce more than one output line.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl AsRef<str>) -> Self {
        Self {
            level,
            message: Self::sanitize_message(message.as_ref()),
            timestamp: Utc::now(),
            file: None,
            line: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
        }
    }

    pub fn with_caller(mut self, location: &'static Location<'static>) -> Self {
        self.file = Some(location.file());
        self.line = Some(location.line());
        self
    }

    /// `file:line` of the call site, if captured
    pub fn caller(&self) -> Option<String> {
        match (self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitizes_control_characters() {
        let record = LogRecord::new(LogLevel::Info, "a\nb\rc\td");
        assert_eq!(record.message, "a\\nb\\rc\\td");
    }

    #[test]
    fn test_caller_capture() {
        let record = LogRecord::new(LogLevel::Warn, "x").with_caller(Location::caller());
        let caller = record.caller().unwrap();
        assert!(caller.starts_with(file!()));
    }

    #[test]
    fn test_caller_absent_by_default() {
        let record = LogRecord::new(LogLevel::Debug, "x");
        assert!(record.caller().is_none());
    }
}

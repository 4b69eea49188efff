//! In-memory sink
//!
//! Clones share one buffer, so a handle kept by the caller observes lines
//! written by a pipeline that owns another clone.

use crate::core::{LogLevel, Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every `(level, text)` written so far
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().clone()
    }

    /// Snapshot of the written text only
    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|(_, text)| text.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write_line(&mut self, level: LogLevel, text: &str) -> Result<()> {
        self.lines.lock().push((level, text.to_string()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let handle = MemorySink::new();
        let mut writer = handle.clone();

        writer.write_line(LogLevel::Warn, "shared").unwrap();

        assert_eq!(handle.len(), 1);
        assert!(handle.contains("shared"));
        assert_eq!(handle.lines()[0].0, LogLevel::Warn);

        handle.clear();
        assert!(writer.is_empty());
    }
}

//! Minimum-severity gate shared by every log call

use super::log_level::LogLevel;
use std::sync::atomic::{AtomicU8, Ordering};

/// Holds the current threshold as a single atomic byte.
///
/// `Error` always passes, whatever the threshold: verbosity configuration
/// can silence chatter but never failures.
#[derive(Debug)]
pub struct LevelGate {
    threshold: AtomicU8,
}

impl LevelGate {
    pub const fn new(threshold: LogLevel) -> Self {
        Self {
            threshold: AtomicU8::new(threshold as u8),
        }
    }

    #[inline]
    pub fn threshold(&self) -> LogLevel {
        LogLevel::from_u8(self.threshold.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_level(&self, level: LogLevel) {
        self.threshold.store(level.as_u8(), Ordering::Release);
    }

    /// Parse and apply a level name.
    ///
    /// On an unrecognized name the threshold is left untouched and the
    /// parse error is returned for the caller to report.
    pub fn set_threshold(&self, name: &str) -> super::error::Result<LogLevel> {
        let level: LogLevel = name.parse()?;
        self.set_level(level);
        Ok(level)
    }

    #[inline]
    pub fn should_log(&self, level: LogLevel) -> bool {
        level == LogLevel::Error || level >= self.threshold()
    }
}

impl Default for LevelGate {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

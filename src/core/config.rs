//! Shared runtime configuration and declarative settings
//!
//! [`LoggerConfig`] is the mutable, read-mostly state every log call
//! consults. [`LoggerSettings`] is the serializable description a
//! [`LoggerBuilder`](super::LoggerBuilder) can be seeded from.

use super::direct_sink::RecordEncoding;
use super::driver::{DriverSelector, LogDriver};
use super::error::{LoggerError, Result};
use super::level_gate::LevelGate;
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default capacity of the async queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Threshold and driver, injected into a `Logger` and shared by reference
#[derive(Debug, Default)]
pub struct LoggerConfig {
    gate: LevelGate,
    driver: DriverSelector,
}

impl LoggerConfig {
    pub const fn new(level: LogLevel, driver: LogDriver) -> Self {
        Self {
            gate: LevelGate::new(level),
            driver: DriverSelector::new(driver),
        }
    }

    #[inline]
    pub fn gate(&self) -> &LevelGate {
        &self.gate
    }

    #[inline]
    pub fn driver(&self) -> &DriverSelector {
        &self.driver
    }
}

/// Declarative logger settings
///
/// # Example
///
/// ```
/// use rust_log_facade::{LogDriver, LogLevel, LoggerSettings};
///
/// let settings = LoggerSettings::from_json(r#"{ "level": "warn", "driver": "direct" }"#).unwrap();
/// assert_eq!(settings.level, LogLevel::Warn);
/// assert_eq!(settings.driver, LogDriver::Direct);
/// assert_eq!(settings.queue_capacity, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub level: LogLevel,
    pub driver: LogDriver,
    pub queue_capacity: usize,
    pub shutdown_timeout_ms: u64,
    pub use_colors: bool,
    pub encoding: RecordEncoding,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            driver: LogDriver::AsyncBuffered,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_timeout_ms: 5_000,
            use_colors: true,
            encoding: RecordEncoding::Console,
        }
    }
}

impl LoggerSettings {
    /// Parse settings from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LoggerError::config(
                "LoggerSettings",
                "queue_capacity must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.gate().threshold(), LogLevel::Debug);
        assert_eq!(config.driver().current_driver(), LogDriver::AsyncBuffered);
    }

    #[test]
    fn test_settings_from_empty_json() {
        let settings = LoggerSettings::from_json("{}").unwrap();
        assert_eq!(settings, LoggerSettings::default());
        assert_eq!(settings.shutdown_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_settings_full_json() {
        let settings = LoggerSettings::from_json(
            r#"{
                "level": "error",
                "driver": "async_buffered",
                "queue_capacity": 16,
                "shutdown_timeout_ms": 250,
                "use_colors": false,
                "encoding": "json"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.level, LogLevel::Error);
        assert_eq!(settings.queue_capacity, 16);
        assert!(!settings.use_colors);
        assert_eq!(settings.encoding, RecordEncoding::Json);
    }

    #[test]
    fn test_settings_reject_zero_capacity() {
        let err = LoggerSettings::from_json(r#"{ "queue_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_settings_reject_unknown_level() {
        let err = LoggerSettings::from_json(r#"{ "level": "verbose" }"#).unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }
}

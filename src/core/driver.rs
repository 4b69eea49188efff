//! Backend selection

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Which backend handles writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "snake_case")]
pub enum LogDriver {
    /// Encode and write synchronously on the calling thread
    Direct = 0,
    /// Render and enqueue; a background consumer writes
    #[default]
    AsyncBuffered = 1,
}

impl LogDriver {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogDriver::Direct => "direct",
            LogDriver::AsyncBuffered => "async",
        }
    }

    fn from_u8(value: u8) -> Self {
        if value == LogDriver::Direct as u8 {
            LogDriver::Direct
        } else {
            LogDriver::AsyncBuffered
        }
    }
}

impl fmt::Display for LogDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for LogDriver {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(LogDriver::Direct),
            "async" | "async_buffered" => Ok(LogDriver::AsyncBuffered),
            _ => Err(LoggerError::InvalidDriver(s.to_string())),
        }
    }
}

impl TryFrom<i32> for LogDriver {
    type Error = LoggerError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(LogDriver::Direct),
            1 => Ok(LogDriver::AsyncBuffered),
            other => Err(LoggerError::InvalidDriver(other.to_string())),
        }
    }
}

/// Active driver, stored as one atomic byte so readers never see a mixed value
#[derive(Debug)]
pub struct DriverSelector {
    current: AtomicU8,
}

impl DriverSelector {
    pub const fn new(driver: LogDriver) -> Self {
        Self {
            current: AtomicU8::new(driver as u8),
        }
    }

    #[inline]
    pub fn current_driver(&self) -> LogDriver {
        LogDriver::from_u8(self.current.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_driver(&self, driver: LogDriver) {
        self.current.store(driver as u8, Ordering::Release);
    }
}

impl Default for DriverSelector {
    fn default() -> Self {
        Self::new(LogDriver::default())
    }
}

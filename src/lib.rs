//! # Rust Log Facade
//!
//! A leveled logging facade with two interchangeable backends behind one
//! call surface.
//!
//! ## Features
//!
//! - **Level gate**: `debug < info < warn < error`; `error` is never filtered
//! - **Direct driver**: encodes each record and writes it on the calling thread
//! - **Async driver**: colorized lines go through a bounded queue to a single
//!   consumer thread; a full queue drops the line and the consumer later
//!   writes one `"N messages dropped"` notice per burst
//! - **Sinks**: console, in-memory, and daily files with retention
//!
//! ## Example
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::{info, warnf};
//!
//! let logger = Logger::builder().min_level(LogLevel::Info).build();
//! logger.start_async_backend().unwrap();
//!
//! info!(logger, "service", "ready");
//! warnf!(logger, "queue at {}%", 80);
//!
//! logger.stop_async_backend();
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Backend, Formatter, LogDriver, LogLevel, LogRecord, Logger, LoggerBuilder, LoggerError,
        LoggerMetrics, LoggerSettings, RecordEncoding, Result, Sink, DEFAULT_QUEUE_CAPACITY,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
    #[cfg(feature = "file")]
    pub use crate::sinks::DailyFileSink;
    pub use crate::sinks::{ConsoleSink, MemorySink};
}

pub use crate::core::{
    AsyncPipeline, Backend, DirectSink, DriverSelector, Formatter, LevelGate, LogDriver, LogLevel,
    LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, LoggerSettings,
    PipelineStatus, RecordEncoding, Result, SharedSink, Sink, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
#[cfg(feature = "file")]
pub use crate::sinks::DailyFileSink;
pub use crate::sinks::{ConsoleSink, MemorySink};

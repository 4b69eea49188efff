//! Core logger types and traits

pub mod async_pipeline;
pub mod config;
pub mod direct_sink;
pub mod driver;
pub mod error;
pub mod formatter;
pub mod level_gate;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod sink;

pub use async_pipeline::{AsyncPipeline, PipelineStatus, DEFAULT_SHUTDOWN_TIMEOUT};
pub use config::{LoggerConfig, LoggerSettings, DEFAULT_QUEUE_CAPACITY};
pub use direct_sink::{DirectSink, RecordEncoding};
pub use driver::{DriverSelector, LogDriver};
pub use error::{LoggerError, Result};
pub use formatter::Formatter;
pub use level_gate::LevelGate;
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use sink::{shared, Backend, SharedSink, Sink};

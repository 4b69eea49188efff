//! Process-wide logger
//!
//! The first use installs either the logger handed to [`init`] or a
//! default [`Logger`]. A logger in a `static` is never dropped, so
//! [`stop_async_backend`] must be called before the process exits for
//! buffered lines to reach the sink.
//!
//! ```no_run
//! use rust_log_facade::global;
//!
//! global::set_level("info");
//! global::start_async_backend().unwrap();
//! global::infof(format_args!("listening on {}", 8080));
//! global::stop_async_backend();
//! ```

use crate::core::{LogDriver, Logger, LoggerError, Result};
use std::fmt::{self, Display};
use std::sync::OnceLock;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Install `logger` as the process-wide logger.
///
/// Fails if a logger is already installed, including one created lazily
/// by an earlier call into this module.
pub fn init(logger: Logger) -> Result<()> {
    let mut candidate = Some(logger);
    GLOBAL.get_or_init(|| candidate.take().unwrap_or_default());
    match candidate {
        None => Ok(()),
        Some(_) => Err(LoggerError::config("global logger", "already initialized")),
    }
}

/// The process-wide logger, created with defaults on first use
pub fn logger() -> &'static Logger {
    GLOBAL.get_or_init(Logger::new)
}

pub fn set_level(name: &str) {
    logger().set_level(name);
}

pub fn set_driver(driver: LogDriver) {
    logger().set_driver(driver);
}

pub fn start_async_backend() -> Result<()> {
    logger().start_async_backend()
}

pub fn stop_async_backend() -> bool {
    logger().stop_async_backend()
}

pub fn dropped_count() -> u64 {
    logger().dropped_count()
}

#[track_caller]
pub fn debug(values: &[&dyn Display]) {
    logger().debug(values);
}

#[track_caller]
pub fn info(values: &[&dyn Display]) {
    logger().info(values);
}

#[track_caller]
pub fn warn(values: &[&dyn Display]) {
    logger().warn(values);
}

#[track_caller]
pub fn error(values: &[&dyn Display]) {
    logger().error(values);
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    logger().debugf(args);
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    logger().infof(args);
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    logger().warnf(args);
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    logger().errorf(args);
}

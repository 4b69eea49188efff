//! Main logger implementation

use super::{
    async_pipeline::{AsyncPipeline, DEFAULT_SHUTDOWN_TIMEOUT},
    config::{LoggerConfig, LoggerSettings, DEFAULT_QUEUE_CAPACITY},
    direct_sink::{DirectSink, RecordEncoding},
    driver::LogDriver,
    error::{LoggerError, Result},
    formatter::Formatter,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    sink::{self, shared, Backend, SharedSink, Sink},
};
use crate::sinks::ConsoleSink;
use std::fmt::{self, Display};
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

/// Leveled logging facade over a direct and an asynchronous backend
///
/// Every call passes the level gate first; `error` always passes. The
/// active [`LogDriver`] then decides whether the record is written on the
/// calling thread or rendered and queued for the background consumer.
/// No logging call returns an error.
pub struct Logger {
    config: Arc<LoggerConfig>,
    direct: DirectSink,
    pipeline: AsyncPipeline,
    fallback: SharedSink,
    metrics: Arc<LoggerMetrics>,
    shutdown_timeout: Duration,
}

impl Logger {
    /// Console sinks, `debug` threshold, async driver, pipeline not started
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_log_facade::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Info)
    ///     .driver(LogDriver::AsyncBuffered)
    ///     .queue_capacity(4096)
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Shared threshold and driver state
    pub fn config(&self) -> &Arc<LoggerConfig> {
        &self.config
    }

    /// Set the threshold by name (`debug`, `info`, `warn`, `error`).
    ///
    /// An unrecognized name leaves the threshold unchanged and is reported
    /// through the fallback sink.
    pub fn set_level(&self, name: &str) {
        if let Err(e) = self.config.gate().set_threshold(name) {
            self.report_config_error(e);
        }
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.config.gate().set_level(level);
    }

    pub fn level(&self) -> LogLevel {
        self.config.gate().threshold()
    }

    pub fn set_driver(&self, driver: LogDriver) {
        self.config.driver().set_driver(driver);
    }

    /// Set the driver by name (`direct`, `async`); unknown names are reported
    pub fn set_driver_name(&self, name: &str) {
        match name.parse::<LogDriver>() {
            Ok(driver) => self.set_driver(driver),
            Err(e) => self.report_config_error(e),
        }
    }

    /// Set the driver by numeric id (`0` direct, `1` async); unknown ids are reported
    pub fn set_driver_id(&self, id: i32) {
        match LogDriver::try_from(id) {
            Ok(driver) => self.set_driver(driver),
            Err(e) => self.report_config_error(e),
        }
    }

    pub fn driver(&self) -> LogDriver {
        self.config.driver().current_driver()
    }

    fn report_config_error(&self, error: LoggerError) {
        sink::report(
            &self.fallback,
            LogLevel::Warn,
            &format!("[LOGGER WARNING] {}; keeping previous configuration", error),
        );
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.config.gate().should_log(level)
    }

    /// Log space-joined values at `level`
    #[track_caller]
    pub fn log(&self, level: LogLevel, values: &[&dyn Display]) {
        if !self.is_enabled(level) {
            return;
        }
        self.dispatch(LogRecord::new(level, Formatter::join(values)).with_caller(Location::caller()));
    }

    /// Log a positional format at `level`; formatting happens only past the gate
    #[track_caller]
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.is_enabled(level) {
            return;
        }
        self.dispatch(LogRecord::new(level, fmt::format(args)).with_caller(Location::caller()));
    }

    fn dispatch(&self, record: LogRecord) {
        self.backend(self.driver()).write(record);
    }

    fn backend(&self, driver: LogDriver) -> &dyn Backend {
        match driver {
            LogDriver::Direct => &self.direct,
            LogDriver::AsyncBuffered => &self.pipeline,
        }
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, values: &[&dyn Display]) {
        self.log(LogLevel::Debug, values);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, values: &[&dyn Display]) {
        self.log(LogLevel::Info, values);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, values: &[&dyn Display]) {
        self.log(LogLevel::Warn, values);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, values: &[&dyn Display]) {
        self.log(LogLevel::Error, values);
    }

    #[inline]
    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Debug, args);
    }

    #[inline]
    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Info, args);
    }

    #[inline]
    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Warn, args);
    }

    #[inline]
    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.logf(LogLevel::Error, args);
    }

    /// Start the background consumer.
    ///
    /// Returns [`LoggerError::AlreadyStarted`] if it is already running.
    pub fn start_async_backend(&self) -> Result<()> {
        self.pipeline.start()
    }

    /// Stop the background consumer with the configured drain deadline.
    ///
    /// Must be called before process exit for buffered lines to be written;
    /// a `Logger` held in a `static` is never dropped.
    pub fn stop_async_backend(&self) -> bool {
        self.shutdown(self.shutdown_timeout)
    }

    /// Stop the pipeline within `timeout`, then flush the direct backend.
    ///
    /// # Returns
    ///
    /// `true` if the queue drained within the deadline and both backends
    /// flushed cleanly
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_facade::Logger;
    /// use std::time::Duration;
    ///
    /// let logger = Logger::new();
    /// logger.start_async_backend().unwrap();
    /// logger.info(&[&"Important message"]);
    ///
    /// if !logger.shutdown(Duration::from_secs(10)) {
    ///     eprintln!("Warning: Logger shutdown timed out");
    /// }
    /// ```
    pub fn shutdown(&self, timeout: Duration) -> bool {
        let drained = self.pipeline.stop(timeout);

        if let Err(e) = self.direct.flush() {
            sink::report(
                &self.fallback,
                LogLevel::Error,
                &format!("[LOGGER ERROR] Failed to flush direct backend: {}", e),
            );
            return false;
        }

        drained
    }

    pub fn flush(&self) -> Result<()> {
        self.pipeline.flush()?;
        self.direct.flush()
    }

    pub fn pipeline(&self) -> &AsyncPipeline {
        &self.pipeline
    }

    pub fn direct(&self) -> &DirectSink {
        &self.direct
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_facade::Logger;
    ///
    /// let logger = Logger::new();
    /// let metrics = logger.metrics();
    /// println!("Dropped: {}", metrics.dropped_count());
    /// println!("Drop rate: {:.2}%", metrics.drop_rate());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Total lines rejected by a full queue
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.pipeline.is_running() {
            self.pipeline.stop(self.shutdown_timeout);
        }
        if let Err(e) = self.direct.flush() {
            sink::report(
                &self.fallback,
                LogLevel::Error,
                &format!("[LOGGER ERROR] Failed to flush during shutdown: {}", e),
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
/// use rust_log_facade::sinks::MemorySink;
///
/// let lines = MemorySink::new();
/// let logger = Logger::builder()
///     .min_level(LogLevel::Warn)
///     .sink(lines.clone())
///     .colors(false)
///     .build();
///
/// logger.start_async_backend().unwrap();
/// logger.info(&[&"filtered"]);
/// logger.warn(&[&"disk at", &91, &"%"]);
/// logger.stop_async_backend();
///
/// assert_eq!(lines.messages(), vec!["[WARN] disk at 91 %".to_string()]);
/// ```
pub struct LoggerBuilder {
    level: Option<LogLevel>,
    driver: Option<LogDriver>,
    queue_capacity: usize,
    use_colors: bool,
    encoding: RecordEncoding,
    shutdown_timeout: Duration,
    sink: Option<SharedSink>,
    direct_sink: Option<SharedSink>,
    fallback: Option<SharedSink>,
    config: Option<Arc<LoggerConfig>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            level: None,
            driver: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            use_colors: true,
            encoding: RecordEncoding::Console,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            sink: None,
            direct_sink: None,
            fallback: None,
            config: None,
        }
    }

    /// Apply declarative settings
    #[must_use = "builder methods return a new value"]
    pub fn settings(mut self, settings: &LoggerSettings) -> Self {
        self.level = Some(settings.level);
        self.driver = Some(settings.driver);
        self.queue_capacity = settings.queue_capacity;
        self.use_colors = settings.use_colors;
        self.encoding = settings.encoding;
        self.shutdown_timeout = settings.shutdown_timeout();
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn driver(mut self, driver: LogDriver) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Capacity of the async queue (at least 1)
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Colorize lines rendered for the async pipeline
    #[must_use = "builder methods return a new value"]
    pub fn colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Record encoding used by the direct backend
    #[must_use = "builder methods return a new value"]
    pub fn encoding(mut self, encoding: RecordEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Drain deadline used by `stop_async_backend` and on drop
    #[must_use = "builder methods return a new value"]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Destination of the async pipeline
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(shared(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Structured backend written by the direct driver
    #[must_use = "builder methods return a new value"]
    pub fn direct_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.direct_sink = Some(shared(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_direct_sink(mut self, sink: SharedSink) -> Self {
        self.direct_sink = Some(sink);
        self
    }

    /// Receives pre-start and post-stop lines plus the logger's own diagnostics
    #[must_use = "builder methods return a new value"]
    pub fn fallback_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.fallback = Some(shared(sink));
        self
    }

    /// Share threshold and driver with other loggers or with the caller.
    ///
    /// Level and driver set on this builder are still applied to it.
    #[must_use = "builder methods return a new value"]
    pub fn shared_config(mut self, config: Arc<LoggerConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the Logger. The async pipeline is not started.
    pub fn build(self) -> Logger {
        let config = self.config.unwrap_or_default();
        if let Some(level) = self.level {
            config.gate().set_level(level);
        }
        if let Some(driver) = self.driver {
            config.driver().set_driver(driver);
        }

        let metrics = Arc::new(LoggerMetrics::new());
        let fallback = self.fallback.unwrap_or_else(|| shared(ConsoleSink::stderr()));
        let sink = self.sink.unwrap_or_else(|| shared(ConsoleSink::new()));
        let direct_sink = self.direct_sink.unwrap_or_else(|| shared(ConsoleSink::new()));

        let direct = DirectSink::new(
            direct_sink,
            self.encoding,
            Arc::clone(&fallback),
            Arc::clone(&metrics),
        );
        let pipeline = AsyncPipeline::new(
            self.queue_capacity,
            Formatter::with_colors(self.use_colors),
            sink,
            Arc::clone(&fallback),
            Arc::clone(&metrics),
        );

        Logger {
            config,
            direct,
            pipeline,
            fallback,
            metrics,
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

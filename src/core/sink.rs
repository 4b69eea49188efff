//! Sink and backend contracts
//!
//! A [`Sink`] is a destination that accepts one formatted line at a time.
//! A [`Backend`] accepts whole [`LogRecord`]s and decides how and when they
//! reach a sink. The `Logger` dispatches to one of two backends: the
//! synchronous [`DirectSink`](super::DirectSink) or the buffered
//! [`AsyncPipeline`](super::AsyncPipeline).

use super::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_record::LogRecord,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub trait Sink: Send {
    /// Write one line; the sink supplies the line terminator
    fn write_line(&mut self, level: LogLevel, text: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

/// A sink shared between a backend and its worker thread
pub type SharedSink = Arc<Mutex<Box<dyn Sink>>>;

pub fn shared<S: Sink + 'static>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(Box::new(sink)))
}

pub trait Backend: Send + Sync {
    /// Hand a record to the backend. Never fails the caller.
    fn write(&self, record: LogRecord);
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Write one line with panic isolation.
///
/// Both a returned error and a panic inside the sink come back as `Err`
/// with a printable description, so the caller's thread survives either.
pub(crate) fn write_guarded(
    sink: &mut dyn Sink,
    level: LogLevel,
    text: &str,
) -> std::result::Result<(), String> {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        sink.write_line(level, text)
    }));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic_info) => Err(panic_message(panic_info.as_ref())),
    }
}

/// Flush with panic isolation; see [`write_guarded`]
pub(crate) fn flush_guarded(sink: &mut dyn Sink) -> std::result::Result<(), String> {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.flush()));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic_info) => Err(panic_message(panic_info.as_ref())),
    }
}

/// Flush a shared sink, waiting at most `wait` for its lock.
///
/// A consumer detached by a timed-out stop may still hold the lock; the
/// flush is then skipped with an error instead of blocking.
pub(crate) fn flush_shared(sink: &SharedSink, wait: Duration) -> Result<()> {
    let mut out = sink
        .try_lock_for(wait)
        .ok_or_else(|| LoggerError::writer("sink is busy, flush skipped"))?;
    flush_guarded(out.as_mut())
        .map_err(|e| LoggerError::writer(format!("Sink '{}' flush failed: {}", out.name(), e)))
}

pub(crate) fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked: unknown panic".to_string()
    }
}

/// Write an internal diagnostic line through the fallback sink.
///
/// A failing or panicking fallback has nowhere left to report to, so
/// stderr is the last resort.
pub(crate) fn report(fallback: &SharedSink, level: LogLevel, text: &str) {
    let mut sink = fallback.lock();
    if let Err(e) = write_guarded(sink.as_mut(), level, text) {
        eprintln!("{}", text);
        eprintln!("[LOGGER ERROR] Fallback sink '{}' failed: {}", sink.name(), e);
    }
}

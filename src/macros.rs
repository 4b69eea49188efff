//! Logging macros for ergonomic leveled calls.
//!
//! Two families mirror the two call forms on [`Logger`](crate::Logger):
//!
//! - `debug!`, `info!`, `warn!`, `error!` take any number of `Display`
//!   values and join them with a single space.
//! - `debugf!`, `infof!`, `warnf!`, `errorf!` take a format string with
//!   positional arguments, like `format!`.
//!
//! Both capture the caller location of the macro invocation.
//!
//! # Examples
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::{info, infof};
//!
//! let logger = Logger::builder().driver(LogDriver::Direct).build();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "listening on port", port);
//! infof!(logger, "listening on port {}", port);
//! ```

/// Log space-joined values at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().driver(LogDriver::Direct).build();
/// use rust_log_facade::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code:", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $value:expr)* $(,)?) => {
        $logger.log($level, &[$(&$value as &dyn ::std::fmt::Display),*])
    };
}

/// Log a positional format at an explicit level.
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().driver(LogDriver::Direct).build();
/// use rust_log_facade::logf;
/// logf!(logger, LogLevel::Warn, "retry {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! logf {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, ::std::format_args!($($arg)+))
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().driver(LogDriver::Direct).build();
/// use rust_log_facade::debug;
/// debug!(logger, "Counter value:", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Debug $(, $value)*)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Info $(, $value)*)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().driver(LogDriver::Direct).build();
/// use rust_log_facade::warn;
/// warn!(logger, "Low disk space:", 3, "GB left");
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Warn $(, $value)*)
    };
}

/// Log an error-level message. Never filtered by the threshold.
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Error $(, $value)*)
    };
}

#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log a formatted info-level message.
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().driver(LogDriver::Direct).build();
/// use rust_log_facade::infof;
/// infof!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogDriver, LogLevel, Logger};
    use crate::sinks::MemorySink;

    fn direct_logger() -> (Logger, MemorySink) {
        let out = MemorySink::new();
        let logger = Logger::builder()
            .driver(LogDriver::Direct)
            .direct_sink(out.clone())
            .build();
        (logger, out)
    }

    fn last_message(out: &MemorySink) -> String {
        let messages = out.messages();
        let last = messages.last().cloned().unwrap_or_default();
        last.rsplit('\t').next().unwrap_or_default().to_string()
    }

    #[test]
    fn test_log_macro() {
        let (logger, out) = direct_logger();
        log!(logger, LogLevel::Info, "Test message");
        assert_eq!(last_message(&out), "Test message");
        log!(logger, LogLevel::Info, "Formatted:", 42);
        assert_eq!(last_message(&out), "Formatted: 42");
    }

    #[test]
    fn test_value_macros_join_with_space() {
        let (logger, out) = direct_logger();
        debug!(logger, "Count:", 5);
        info!(logger, "Items:", 100, "pending");
        warn!(logger, "Retry", 1, "of", 3);
        error!(logger, "Code:", 500,);

        let lines = out.lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines.iter().map(|(level, _)| *level).collect::<Vec<_>>(),
            LogLevel::ALL.to_vec()
        );
        assert!(lines[1].1.ends_with("\tItems: 100 pending"));
        assert!(lines[3].1.ends_with("\tCode: 500"));
    }

    #[test]
    fn test_empty_value_list() {
        let (logger, out) = direct_logger();
        info!(logger);
        assert_eq!(out.len(), 1);
        assert_eq!(last_message(&out), "");
    }

    #[test]
    fn test_format_macros() {
        let (logger, out) = direct_logger();
        debugf!(logger, "a={}", 1);
        infof!(logger, "b={} c={}", 2, "x");
        warnf!(logger, "{:>4}", 7);
        errorf!(logger, "plain");

        assert_eq!(out.len(), 4);
        assert!(out.contains("b=2 c=x"));
        assert!(out.contains("   7"));
        assert_eq!(last_message(&out), "plain");
    }

    #[test]
    fn test_macros_respect_threshold() {
        let (logger, out) = direct_logger();
        logger.set_level("error");
        info!(logger, "hidden");
        warnf!(logger, "hidden {}", 1);
        error!(logger, "shown");

        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_macro_records_call_site() {
        let (logger, out) = direct_logger();
        let line = line!() + 1;
        info!(logger, "here");
        assert!(out.contains(&format!("{}:{}", file!(), line)));
    }
}

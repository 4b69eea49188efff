//! Console sink implementation

use crate::core::{LogLevel, Result, Sink};
use std::io::{self, Write};

/// Where a [`ConsoleSink`] sends each line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Routing {
    /// Error to stderr, everything else to stdout
    ByLevel,
    /// Everything to stderr
    Stderr,
}

pub struct ConsoleSink {
    routing: Routing,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            routing: Routing::ByLevel,
        }
    }

    /// All lines to stderr; the default fallback sink
    pub fn stderr() -> Self {
        Self {
            routing: Routing::Stderr,
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write_line(&mut self, level: LogLevel, text: &str) -> Result<()> {
        match (self.routing, level) {
            (Routing::Stderr, _) | (Routing::ByLevel, LogLevel::Error) => {
                writeln!(io::stderr().lock(), "{}", text)?;
            }
            (Routing::ByLevel, _) => {
                writeln!(io::stdout().lock(), "{}", text)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        io::stdout().flush()?;
        io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        match self.routing {
            Routing::ByLevel => "console",
            Routing::Stderr => "stderr",
        }
    }
}

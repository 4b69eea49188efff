//! Sink implementations

pub mod console;
#[cfg(feature = "file")]
pub mod daily_file;
pub mod memory;

pub use console::ConsoleSink;
#[cfg(feature = "file")]
pub use daily_file::{DailyFileSink, DailyFileSinkBuilder, DateSource};
pub use memory::MemorySink;

pub use crate::core::Sink;

//! Basic logger usage example
//!
//! Demonstrates the direct driver, level names and the two call forms.
//!
//! Run with: cargo run --example basic_usage

use rust_log_facade::prelude::*;
use rust_log_facade::{debug, errorf, info, warnf};

fn main() -> Result<()> {
    println!("=== Rust Log Facade - Basic Usage Example ===\n");

    let logger = Logger::builder().driver(LogDriver::Direct).build();

    println!("1. Logging at different levels:");
    logger.debug(&[&"This is a debug message"]);
    logger.info(&[&"This is an info message"]);
    logger.warn(&[&"This is a warning message"]);
    logger.error(&[&"This is an error message"]);

    println!("\n2. Values and format strings:");
    let port = 8080;
    info!(logger, "listening on port", port);
    warnf!(logger, "memory usage high: {:.2}%", 85.5);

    println!("\n3. Threshold set to \"warn\" - debug and info won't show:");
    logger.set_level("warn");
    debug!(logger, "Debug message (hidden)");
    info!(logger, "Info message (hidden)");
    errorf!(logger, "Error message (always visible): code {}", 500);

    println!("\n4. Unknown level names are rejected and reported on stderr:");
    logger.set_level("verbose");
    println!("   threshold is still {}", logger.level());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}

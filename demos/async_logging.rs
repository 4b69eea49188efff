//! Async pipeline example
//!
//! Demonstrates colorized buffered output, overflow accounting and the
//! start/stop lifecycle.
//!
//! Run with: cargo run --example async_logging

use rust_log_facade::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Facade - Async Logging Example ===\n");

    let logger = Arc::new(
        Logger::builder()
            .driver(LogDriver::AsyncBuffered)
            .queue_capacity(64)
            .shutdown_timeout(Duration::from_secs(2))
            .build(),
    );

    println!("1. Before start, lines take the synchronous fallback:");
    logger.info(&[&"pipeline not started yet"]);

    logger.start_async_backend()?;

    println!("\n2. Four producers share one bounded queue:");
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..50 {
                    logger.infof(format_args!("worker {} message {}", worker, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    if !logger.stop_async_backend() {
        eprintln!("Warning: pipeline did not drain before the deadline");
    }

    println!("\n3. Metrics:");
    let metrics = logger.metrics();
    println!("   enqueued:  {}", metrics.enqueued_count());
    println!("   delivered: {}", metrics.delivered_count());
    println!("   dropped:   {} ({:.2}%)", metrics.dropped_count(), metrics.drop_rate());
    println!("   notices:   {}", metrics.drop_notices());

    println!("\n4. After stop, lines take the synchronous fallback again:");
    logger.warn(&[&"pipeline stopped"]);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}

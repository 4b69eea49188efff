//! Daily file logging example
//!
//! Installs a process-wide logger that writes records synchronously to a
//! dated file and walks through a simulated order.
//!
//! Run with: cargo run --example file_logging

use rust_log_facade::global;
use rust_log_facade::prelude::*;
use std::thread;
use std::time::{Duration, Instant};

fn simulate_work() {
    thread::sleep(Duration::from_millis(100));
}

fn process_order(order_id: &str) {
    global::info(&[&"processing order:", &order_id]);

    let steps = ["validate order", "check stock", "process payment", "update status"];
    for (i, step) in steps.iter().enumerate() {
        global::debugf(format_args!("step {}: {}", i + 1, step));
        simulate_work();

        if i == 2 {
            global::warn(&[&"payment is slow, check the payment gateway"]);
        }
    }

    global::info(&[&"order complete:", &order_id]);
}

fn main() -> Result<()> {
    println!("=== Rust Log Facade - File Logging Example ===\n");

    let sink = DailyFileSink::builder("./logs")
        .prefix("server")
        .max_age_days(30)
        .build()?;
    println!("Writing to {}", sink.current_path().display());

    global::init(
        Logger::builder()
            .driver(LogDriver::Direct)
            .direct_sink(sink)
            .build(),
    )?;
    global::set_level("debug");

    global::debug(&[&"server starting, initializing"]);
    global::info(&[&"current time:", &chrono::Local::now().format("%Y-%m-%d %H:%M:%S")]);
    global::infof(format_args!("HTTP server listening on port {}", 8080));

    let memory_usage = 85.5;
    if memory_usage > 80.0 {
        global::warnf(format_args!("memory usage high: {:.2}%", memory_usage));
    }

    let failure = LoggerError::other("simulated failure");
    global::error(&[&"operation failed:", &failure]);

    process_order("ORDER123");

    let start = Instant::now();
    simulate_work();
    global::debugf(format_args!("operation took {:?}", start.elapsed()));

    global::stop_async_backend();
    global::logger().flush()?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}

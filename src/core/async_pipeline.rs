//! Bounded, lossy asynchronous pipeline
//!
//! Producers render a line and `try_send` it into a fixed-capacity
//! crossbeam channel; exactly one consumer thread drains it in FIFO order
//! and writes to the sink. A full queue never blocks or fails a producer:
//! the line is dropped and counted. The next line that does get in carries
//! the size of the drop streak, and the consumer writes a single
//! "N messages dropped" notice ahead of it.
//!
//! Lifecycle: `Unstarted -> start() -> Running -> stop() -> Stopped`.
//! Outside `Running`, lines are written synchronously through the fallback
//! sink instead of being lost.

use super::{
    error::{LoggerError, Result},
    formatter::Formatter,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    sink::{self, Backend, SharedSink},
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default drain deadline for `stop` and for drop-time shutdown (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Lines written between two sink flushes at most
const BATCH_SIZE: usize = 64;

const SHUTDOWN_POLL: Duration = Duration::from_millis(5);

/// Upper bound on waiting for the sink lock outside the consumer; a
/// consumer detached by a timed-out stop may hold it indefinitely
const SINK_LOCK_WAIT: Duration = Duration::from_millis(100);

struct QueuedLine {
    level: LogLevel,
    text: String,
    /// Drops accumulated since the previous accepted line
    dropped_before: u64,
}

enum PipelineState {
    Unstarted,
    Running {
        sender: Sender<QueuedLine>,
        worker: JoinHandle<()>,
        abandon: Arc<AtomicBool>,
    },
    Stopped,
}

/// Observable lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Unstarted,
    Running,
    Stopped,
}

pub struct AsyncPipeline {
    capacity: usize,
    formatter: Formatter,
    sink: SharedSink,
    fallback: SharedSink,
    metrics: Arc<LoggerMetrics>,
    /// Drops since the last accepted line; reset by `swap`, never read-then-clear
    drop_streak: AtomicU64,
    state: RwLock<PipelineState>,
}

impl AsyncPipeline {
    pub fn new(
        capacity: usize,
        formatter: Formatter,
        sink: SharedSink,
        fallback: SharedSink,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            capacity: capacity.max(1),
            formatter,
            sink,
            fallback,
            metrics,
            drop_streak: AtomicU64::new(0),
            state: RwLock::new(PipelineState::Unstarted),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub fn status(&self) -> PipelineStatus {
        match &*self.state.read() {
            PipelineState::Unstarted => PipelineStatus::Unstarted,
            PipelineState::Running { .. } => PipelineStatus::Running,
            PipelineState::Stopped => PipelineStatus::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status() == PipelineStatus::Running
    }

    /// Lines currently waiting in the queue
    pub fn queue_len(&self) -> usize {
        match &*self.state.read() {
            PipelineState::Running { sender, .. } => sender.len(),
            _ => 0,
        }
    }

    /// Drops not yet announced by a notice
    pub fn drop_streak(&self) -> u64 {
        self.drop_streak.load(Ordering::Acquire)
    }

    /// Allocate the queue and spawn the consumer.
    ///
    /// Calling `start` on a running pipeline returns
    /// [`LoggerError::AlreadyStarted`]. A stopped pipeline can be started
    /// again.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.write();
        if matches!(*state, PipelineState::Running { .. }) {
            return Err(LoggerError::AlreadyStarted);
        }

        let (sender, receiver) = bounded(self.capacity);
        let abandon = Arc::new(AtomicBool::new(false));

        let consumer = Consumer {
            receiver,
            sink: Arc::clone(&self.sink),
            fallback: Arc::clone(&self.fallback),
            formatter: self.formatter,
            metrics: Arc::clone(&self.metrics),
            abandon: Arc::clone(&abandon),
            failing: false,
        };

        let worker = thread::Builder::new()
            .name("log-pipeline".to_string())
            .spawn(move || consumer.run())
            .map_err(|e| {
                LoggerError::io_operation("spawning log pipeline", "thread spawn failed", e)
            })?;

        *state = PipelineState::Running {
            sender,
            worker,
            abandon,
        };
        Ok(())
    }

    /// Non-blocking enqueue of a rendered line. Never fails the caller.
    pub fn enqueue(&self, level: LogLevel, text: String) {
        let state = self.state.read();
        let sender = match &*state {
            PipelineState::Running { sender, .. } => sender,
            _ => {
                self.write_fallback(level, &text);
                return;
            }
        };

        let dropped_before = if self.drop_streak.load(Ordering::Relaxed) > 0 {
            self.drop_streak.swap(0, Ordering::AcqRel)
        } else {
            0
        };

        match sender.try_send(QueuedLine {
            level,
            text,
            dropped_before,
        }) {
            Ok(()) => {
                self.metrics.record_enqueued();
            }
            Err(TrySendError::Full(_)) => {
                self.drop_streak
                    .fetch_add(dropped_before + 1, Ordering::AcqRel);
                self.metrics.record_dropped();
            }
            Err(TrySendError::Disconnected(line)) => {
                // Consumer is gone without a stop; keep the streak and degrade
                self.drop_streak
                    .fetch_add(line.dropped_before, Ordering::AcqRel);
                self.write_fallback(line.level, &line.text);
            }
        }
    }

    fn write_fallback(&self, level: LogLevel, text: &str) {
        self.metrics.record_fallback_write();
        sink::report(&self.fallback, level, text);
    }

    /// Close the queue and wait up to `timeout` for the consumer to drain it.
    ///
    /// Returns `true` if every accepted line reached the sink before the
    /// deadline. On timeout the consumer is told to abandon what is left
    /// and is detached. The sink is flushed either way.
    pub fn stop(&self, timeout: Duration) -> bool {
        let (sender, worker, abandon) = {
            let mut state = self.state.write();
            match std::mem::replace(&mut *state, PipelineState::Stopped) {
                PipelineState::Running {
                    sender,
                    worker,
                    abandon,
                } => (sender, worker, abandon),
                idle => {
                    *state = idle;
                    drop(state);
                    return self.flush_sink();
                }
            }
        };

        // Closing the only sender lets the consumer drain and exit
        drop(sender);

        let start = Instant::now();
        loop {
            if worker.is_finished() {
                if let Err(panic_info) = worker.join() {
                    sink::report(
                        &self.fallback,
                        LogLevel::Error,
                        &format!(
                            "[LOGGER ERROR] Log pipeline consumer {} during shutdown",
                            sink::panic_message(panic_info.as_ref())
                        ),
                    );
                    return false;
                }
                return self.flush_sink();
            }

            if start.elapsed() >= timeout {
                abandon.store(true, Ordering::Release);
                sink::report(
                    &self.fallback,
                    LogLevel::Warn,
                    &format!(
                        "[LOGGER WARNING] Log pipeline did not drain within {:?}. \
                         Remaining messages are abandoned.",
                        timeout
                    ),
                );
                let _ = sink::flush_shared(&self.sink, SINK_LOCK_WAIT);
                return false;
            }

            thread::sleep(SHUTDOWN_POLL);
        }
    }

    fn flush_sink(&self) -> bool {
        match sink::flush_shared(&self.sink, SINK_LOCK_WAIT) {
            Ok(()) => true,
            Err(e) => {
                sink::report(
                    &self.fallback,
                    LogLevel::Error,
                    &format!("[LOGGER ERROR] Failed to flush during shutdown: {}", e),
                );
                false
            }
        }
    }
}

impl Backend for AsyncPipeline {
    fn write(&self, record: LogRecord) {
        let text = self.formatter.render_message(record.level, &record.message);
        self.enqueue(record.level, text);
    }

    fn flush(&self) -> Result<()> {
        sink::flush_shared(&self.sink, SINK_LOCK_WAIT)
    }

    fn name(&self) -> &str {
        "async"
    }
}

impl Drop for AsyncPipeline {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop(DEFAULT_SHUTDOWN_TIMEOUT);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            sink::report(
                &self.fallback,
                LogLevel::Warn,
                &format!(
                    "[LOGGER WARNING] Log pipeline shutting down with {} dropped messages (drop rate: {:.2}%)",
                    dropped,
                    self.metrics.drop_rate()
                ),
            );
        }
    }
}

/// State owned by the consumer thread
struct Consumer {
    receiver: Receiver<QueuedLine>,
    sink: SharedSink,
    fallback: SharedSink,
    formatter: Formatter,
    metrics: Arc<LoggerMetrics>,
    abandon: Arc<AtomicBool>,
    /// Whether the last sink write failed; only the first failure of a
    /// streak is reported
    failing: bool,
}

impl Consumer {
    fn run(mut self) {
        let mut batch = Vec::with_capacity(BATCH_SIZE);

        // recv() keeps yielding buffered lines after the sender is dropped
        while let Ok(line) = self.receiver.recv() {
            batch.push(line);
            while batch.len() < BATCH_SIZE {
                match self.receiver.try_recv() {
                    Ok(line) => batch.push(line),
                    Err(_) => break,
                }
            }

            if !self.process_batch(&mut batch) {
                let remaining = batch.len() + self.receiver.len();
                self.metrics.record_abandoned(remaining as u64);
                return;
            }
        }
    }

    /// Write and flush one batch. Returns `false` if the drain was abandoned
    /// part-way, leaving the unwritten lines in `batch`.
    fn process_batch(&mut self, batch: &mut Vec<QueuedLine>) -> bool {
        let mut failures = Vec::new();
        let mut written = 0;
        let mut abandoned = false;

        {
            let sink_handle = Arc::clone(&self.sink);
            let mut out = sink_handle.lock();

            for line in batch.iter() {
                if self.abandon.load(Ordering::Acquire) {
                    abandoned = true;
                    break;
                }

                if line.dropped_before > 0 {
                    let notice = self.formatter.render_drop_notice(line.dropped_before);
                    self.metrics.record_drop_notice();
                    let result = sink::write_guarded(out.as_mut(), LogLevel::Warn, &notice);
                    self.track(result, out.name(), &mut failures);
                }

                let result = sink::write_guarded(out.as_mut(), line.level, &line.text);
                self.metrics.record_delivered();
                self.track(result, out.name(), &mut failures);
                written += 1;
            }

            if let Err(e) = sink::flush_guarded(out.as_mut()) {
                self.metrics.record_sink_failure();
                failures.push(format!("[LOGGER ERROR] Sink '{}' flush failed: {}", out.name(), e));
            }
        }

        // Reported after the sink lock is released; the fallback may be the same sink
        for failure in failures {
            sink::report(&self.fallback, LogLevel::Error, &failure);
        }

        batch.drain(..written);
        !abandoned
    }

    fn track(
        &mut self,
        result: std::result::Result<(), String>,
        sink_name: &str,
        failures: &mut Vec<String>,
    ) {
        match result {
            Ok(()) => self.failing = false,
            Err(e) => {
                self.metrics.record_sink_failure();
                if !self.failing {
                    self.failing = true;
                    failures.push(format!("[LOGGER ERROR] Sink '{}' failed: {}", sink_name, e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::{shared, Sink};
    use crate::sinks::MemorySink;
    use parking_lot::{Condvar, Mutex};

    fn pipeline(capacity: usize) -> (AsyncPipeline, MemorySink, MemorySink, Arc<LoggerMetrics>) {
        let sink = MemorySink::new();
        let fallback = MemorySink::new();
        let metrics = Arc::new(LoggerMetrics::new());
        let pipeline = AsyncPipeline::new(
            capacity,
            Formatter::plain(),
            shared(sink.clone()),
            shared(fallback.clone()),
            Arc::clone(&metrics),
        );
        (pipeline, sink, fallback, metrics)
    }

    /// Blocks every write until released, so the queue can be filled deterministically
    #[derive(Clone)]
    struct GateSink {
        inner: MemorySink,
        open: Arc<(Mutex<bool>, Condvar)>,
        entered: Arc<AtomicBool>,
    }

    impl GateSink {
        fn new(inner: MemorySink) -> Self {
            Self {
                inner,
                open: Arc::new((Mutex::new(false), Condvar::new())),
                entered: Arc::new(AtomicBool::new(false)),
            }
        }

        /// Wait until the consumer is blocked inside `write_line`
        fn wait_entered(&self) {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !self.entered.load(Ordering::Acquire) && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(1));
            }
        }

        fn release(&self) {
            let (lock, cvar) = &*self.open;
            *lock.lock() = true;
            cvar.notify_all();
        }
    }

    impl Sink for GateSink {
        fn write_line(&mut self, level: LogLevel, text: &str) -> Result<()> {
            self.entered.store(true, Ordering::Release);
            let (lock, cvar) = &*self.open;
            let mut open = lock.lock();
            while !*open {
                cvar.wait(&mut open);
            }
            drop(open);
            self.inner.write_line(level, text)
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "gate"
        }
    }

    #[test]
    fn test_fifo_delivery() {
        let (pipeline, sink, _, _) = pipeline(128);
        pipeline.start().unwrap();

        for i in 0..100 {
            pipeline.enqueue(LogLevel::Info, format!("m{}", i));
        }
        assert!(pipeline.stop(Duration::from_secs(5)));

        let expected: Vec<String> = (0..100).map(|i| format!("m{}", i)).collect();
        assert_eq!(sink.messages(), expected);
    }

    #[test]
    fn test_second_start_rejected() {
        let (pipeline, _, _, _) = pipeline(8);
        pipeline.start().unwrap();
        assert!(matches!(pipeline.start(), Err(LoggerError::AlreadyStarted)));
        assert!(pipeline.stop(Duration::from_secs(1)));
    }

    #[test]
    fn test_enqueue_before_start_uses_fallback() {
        let (pipeline, sink, fallback, metrics) = pipeline(8);
        pipeline.enqueue(LogLevel::Warn, "early".to_string());

        assert_eq!(fallback.messages(), vec!["early".to_string()]);
        assert!(sink.is_empty());
        assert_eq!(metrics.fallback_writes(), 1);
    }

    #[test]
    fn test_enqueue_after_stop_uses_fallback() {
        let (pipeline, sink, fallback, _) = pipeline(8);
        pipeline.start().unwrap();
        pipeline.enqueue(LogLevel::Info, "before".to_string());
        assert!(pipeline.stop(Duration::from_secs(1)));
        assert_eq!(pipeline.status(), PipelineStatus::Stopped);

        pipeline.enqueue(LogLevel::Info, "after".to_string());
        assert_eq!(sink.messages(), vec!["before".to_string()]);
        assert_eq!(fallback.messages(), vec!["after".to_string()]);
    }

    #[test]
    fn test_restart_after_stop() {
        let (pipeline, sink, _, _) = pipeline(8);
        pipeline.start().unwrap();
        pipeline.enqueue(LogLevel::Info, "one".to_string());
        assert!(pipeline.stop(Duration::from_secs(1)));

        pipeline.start().unwrap();
        pipeline.enqueue(LogLevel::Info, "two".to_string());
        assert!(pipeline.stop(Duration::from_secs(1)));

        assert_eq!(sink.messages(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_drop_accounting_and_single_notice() {
        let memory = MemorySink::new();
        let gate = GateSink::new(memory.clone());
        let metrics = Arc::new(LoggerMetrics::new());
        let fallback = MemorySink::new();
        let pipeline = AsyncPipeline::new(
            2,
            Formatter::plain(),
            shared(gate.clone()),
            shared(fallback.clone()),
            Arc::clone(&metrics),
        );
        pipeline.start().unwrap();

        // First line is taken by the consumer, which then blocks in the sink
        pipeline.enqueue(LogLevel::Info, "held".to_string());
        gate.wait_entered();

        pipeline.enqueue(LogLevel::Info, "q1".to_string());
        pipeline.enqueue(LogLevel::Info, "q2".to_string());
        for i in 0..5 {
            pipeline.enqueue(LogLevel::Debug, format!("lost{}", i));
        }
        assert_eq!(pipeline.drop_streak(), 5);
        assert_eq!(metrics.dropped_count(), 5);

        gate.release();
        let deadline = Instant::now() + Duration::from_secs(5);
        while pipeline.queue_len() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        pipeline.enqueue(LogLevel::Info, "after".to_string());
        assert_eq!(pipeline.drop_streak(), 0);
        assert!(pipeline.stop(Duration::from_secs(5)));

        assert_eq!(
            memory.messages(),
            vec![
                "held".to_string(),
                "q1".to_string(),
                "q2".to_string(),
                "[WARN] 5 messages dropped".to_string(),
                "after".to_string(),
            ]
        );
        assert_eq!(metrics.drop_notices(), 1);
        assert_eq!(metrics.enqueued_count(), 4);
        assert_eq!(metrics.delivered_count(), 4);

        drop(pipeline);
        assert!(fallback.contains("shutting down with 5 dropped messages"));
    }

    #[test]
    fn test_stop_deadline_abandons_remaining() {
        let memory = MemorySink::new();
        let gate = GateSink::new(memory.clone());
        let metrics = Arc::new(LoggerMetrics::new());
        let fallback = MemorySink::new();
        let pipeline = AsyncPipeline::new(
            16,
            Formatter::plain(),
            shared(gate.clone()),
            shared(fallback.clone()),
            Arc::clone(&metrics),
        );
        pipeline.start().unwrap();
        for i in 0..4 {
            pipeline.enqueue(LogLevel::Info, format!("m{}", i));
        }

        assert!(!pipeline.stop(Duration::from_millis(50)));
        assert!(fallback.messages()[0].contains("did not drain"));

        gate.release();
        let deadline = Instant::now() + Duration::from_secs(5);
        while metrics.abandoned_count() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        // The line already inside the sink completes; the rest are abandoned
        assert_eq!(memory.len() as u64 + metrics.abandoned_count(), 4);
    }

    #[test]
    fn test_backend_renders_with_template() {
        let (pipeline, sink, _, _) = pipeline(8);
        pipeline.start().unwrap();
        pipeline.write(LogRecord::new(LogLevel::Error, "boom"));
        assert!(pipeline.stop(Duration::from_secs(1)));
        assert_eq!(sink.messages(), vec!["[ERROR] boom".to_string()]);
    }

    /// Panics on its first flush only
    struct PanicFlushOnce {
        inner: MemorySink,
        panicked: bool,
    }

    impl Sink for PanicFlushOnce {
        fn write_line(&mut self, level: LogLevel, text: &str) -> Result<()> {
            self.inner.write_line(level, text)
        }

        fn flush(&mut self) -> Result<()> {
            if !self.panicked {
                self.panicked = true;
                panic!("flush exploded");
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "panic_flush"
        }
    }

    #[test]
    fn test_panicking_flush_keeps_consumer_alive() {
        let memory = MemorySink::new();
        let fallback = MemorySink::new();
        let metrics = Arc::new(LoggerMetrics::new());
        let pipeline = AsyncPipeline::new(
            8,
            Formatter::plain(),
            shared(PanicFlushOnce {
                inner: memory.clone(),
                panicked: false,
            }),
            shared(fallback.clone()),
            Arc::clone(&metrics),
        );
        pipeline.start().unwrap();

        pipeline.enqueue(LogLevel::Info, "first".to_string());
        let deadline = Instant::now() + Duration::from_secs(5);
        while !fallback.contains("flush failed") && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        pipeline.enqueue(LogLevel::Info, "second".to_string());
        assert!(pipeline.stop(Duration::from_secs(5)));

        assert_eq!(memory.messages(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(metrics.fallback_writes(), 0);
        assert_eq!(metrics.sink_failures(), 1);
        assert!(fallback.contains("flush exploded"));
    }

    #[test]
    fn test_stop_after_timeout_does_not_block() {
        let gate = GateSink::new(MemorySink::new());
        let fallback = MemorySink::new();
        let pipeline = AsyncPipeline::new(
            8,
            Formatter::plain(),
            shared(gate.clone()),
            shared(fallback.clone()),
            Arc::new(LoggerMetrics::new()),
        );
        pipeline.start().unwrap();
        pipeline.enqueue(LogLevel::Info, "stuck".to_string());
        gate.wait_entered();

        assert!(!pipeline.stop(Duration::from_millis(50)));

        // The detached consumer still holds the sink lock
        let started = Instant::now();
        assert!(!pipeline.stop(Duration::from_millis(50)));
        assert!(pipeline.flush().is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(fallback.contains("flush skipped"));

        gate.release();
    }
}

//! Logger metrics for observability
//!
//! Counters for monitoring pipeline health: accepted, delivered, dropped,
//! drop notices, sink failures and fallback writes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// `dropped_count` is cumulative and never reset by the pipeline, unlike
/// the per-burst drop streak that feeds the drop notice.
///
/// # Example
///
/// ```
/// use rust_log_facade::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.enqueued_count(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.drop_rate(), 50.0);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Lines accepted into the queue
    enqueued: AtomicU64,

    /// Lines handed to the sink by the consumer
    delivered: AtomicU64,

    /// Lines rejected because the queue was full
    dropped_count: AtomicU64,

    /// "N messages dropped" notices emitted
    drop_notices: AtomicU64,

    /// Failed sink writes (errors and panics)
    sink_failures: AtomicU64,

    /// Lines written synchronously through the fallback sink
    fallback_writes: AtomicU64,

    /// Lines still queued when a drain deadline expired
    abandoned: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            drop_notices: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            fallback_writes: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn drop_notices(&self) -> u64 {
        self.drop_notices.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fallback_writes(&self) -> u64 {
        self.fallback_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn abandoned_count(&self) -> u64 {
        self.abandoned.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_drop_notice(&self) -> u64 {
        self.drop_notices.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_fallback_write(&self) -> u64 {
        self.fallback_writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_abandoned(&self, count: u64) -> u64 {
        self.abandoned.fetch_add(count, Ordering::Relaxed)
    }

    /// Dropped lines as a percentage (0.0 - 100.0) of all enqueue attempts
    ///
    /// Returns 0.0 if nothing has been attempted.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.enqueued_count() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.drop_notices.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.fallback_writes.store(0, Ordering::Relaxed);
        self.abandoned.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued_count()),
            delivered: AtomicU64::new(self.delivered_count()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            drop_notices: AtomicU64::new(self.drop_notices()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            fallback_writes: AtomicU64::new(self.fallback_writes()),
            abandoned: AtomicU64::new(self.abandoned_count()),
        }
    }
}

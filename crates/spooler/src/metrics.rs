//! Worker metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single worker
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    /// Messages dequeued by this worker
    received: AtomicU64,
    /// Buffer-to-temp-file swaps performed
    swaps: AtomicU64,
    /// Temp files promoted to final log files
    saves: AtomicU64,
    /// Non-terminal message read failures
    read_errors: AtomicU64,
    /// Temp-file append failures
    swap_failures: AtomicU64,
    /// Failed promotions (rename)
    save_failures: AtomicU64,
    /// Messages given up on after repeated read failures
    abandoned: AtomicU64,
}

impl WorkerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get received message count
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Increment received message count
    pub fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Get swap count
    pub fn swaps(&self) -> u64 {
        self.swaps.load(Ordering::Relaxed)
    }

    /// Increment swap count
    pub fn inc_swaps(&self) {
        self.swaps.fetch_add(1, Ordering::Relaxed);
    }

    /// Get save count
    pub fn saves(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    /// Increment save count
    pub fn inc_saves(&self) {
        self.saves.fetch_add(1, Ordering::Relaxed);
    }

    /// Get read error count
    pub fn read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }

    /// Increment read error count
    pub fn inc_read_errors(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get swap failure count
    pub fn swap_failures(&self) -> u64 {
        self.swap_failures.load(Ordering::Relaxed)
    }

    /// Increment swap failure count
    pub fn inc_swap_failures(&self) {
        self.swap_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get save failure count
    pub fn save_failures(&self) -> u64 {
        self.save_failures.load(Ordering::Relaxed)
    }

    /// Increment save failure count
    pub fn inc_save_failures(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get abandoned message count
    pub fn abandoned(&self) -> u64 {
        self.abandoned.load(Ordering::Relaxed)
    }

    /// Increment abandoned message count
    pub fn inc_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received(),
            swaps: self.swaps(),
            saves: self.saves(),
            read_errors: self.read_errors(),
            swap_failures: self.swap_failures(),
            save_failures: self.save_failures(),
            abandoned: self.abandoned(),
        }
    }
}

/// Snapshot of worker counters (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub swaps: u64,
    pub saves: u64,
    pub read_errors: u64,
    pub swap_failures: u64,
    pub save_failures: u64,
    pub abandoned: u64,
}

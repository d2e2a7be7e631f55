//! Spool metric recording helpers
//!
//! Thin wrappers over the `metrics` facade so callers never spell metric
//! names twice. The spooler core itself records nothing; the embedding
//! application (the CLI, a daemon) samples spooler snapshots and publishes
//! them here.

use metrics::{counter, gauge};

/// Record a message accepted at admission
pub fn record_message_accepted() {
    counter!("logspool_messages_accepted_total").increment(1);
}

/// Record a message rejected after the admission timeout
pub fn record_message_rejected() {
    counter!("logspool_messages_rejected_total").increment(1);
}

/// Record payload bytes handed to the spooler
pub fn record_spooled_bytes(bytes: u64) {
    counter!("logspool_bytes_total").increment(bytes);
}

/// Publish a worker's progress counters
pub fn record_worker_progress(worker_id: usize, received: u64, swaps: u64, saves: u64) {
    let worker = worker_id.to_string();
    gauge!("logspool_worker_received", "worker" => worker.clone()).set(received as f64);
    gauge!("logspool_worker_swaps", "worker" => worker.clone()).set(swaps as f64);
    gauge!("logspool_worker_saves", "worker" => worker).set(saves as f64);
}

/// Publish a worker's anomaly counters
pub fn record_worker_anomalies(
    worker_id: usize,
    read_errors: u64,
    swap_failures: u64,
    save_failures: u64,
    abandoned: u64,
) {
    let worker = worker_id.to_string();
    gauge!("logspool_worker_read_errors", "worker" => worker.clone()).set(read_errors as f64);
    gauge!("logspool_worker_swap_failures", "worker" => worker.clone()).set(swap_failures as f64);
    gauge!("logspool_worker_save_failures", "worker" => worker.clone()).set(save_failures as f64);
    gauge!("logspool_worker_abandoned", "worker" => worker).set(abandoned as f64);
}

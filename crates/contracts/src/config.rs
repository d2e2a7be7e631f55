//! Spool configuration value shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// What a worker does with buffered bytes when the temp-file append fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    /// Treat the buffer as flushed even if the write failed (at-most-once).
    #[default]
    BestEffort,
    /// Keep the buffered bytes so the next swap retries them.
    FailLoud,
}

/// Spooler configuration
///
/// Built with value-returning setters and handed to `Spooler::new` by value;
/// workers keep derived copies, so the configuration is never mutated after
/// construction.
///
/// ```
/// use contracts::SpoolConfig;
///
/// let config = SpoolConfig::new()
///     .workers(2)
///     .capacity(32 * 1024)
///     .prefix("events_");
/// assert_eq!(config.workers, 2);
/// ```
#[derive(Debug, Clone)]
pub struct SpoolConfig {
    /// Number of worker tasks, each owning one buffer and one temp file
    pub workers: usize,
    /// In-memory buffer capacity in bytes; also the rotation threshold
    pub capacity: usize,
    /// Directory that receives final `.log` files
    pub root_dir: PathBuf,
    /// Directory that holds per-worker `.tmp` files
    pub temp_dir: PathBuf,
    /// Filename prefix for both temp and final files
    pub prefix: String,
    /// Permission bits applied to final files (unix)
    pub mode: u32,
    /// Bounded admission wait before a message is rejected
    pub timeout: Duration,
    /// Capacity of the shared work queue, independent of worker count
    pub queue_capacity: usize,
    /// Policy for buffered bytes when a temp-file append fails
    pub durability: Durability,
    /// Consecutive read failures tolerated before a message is abandoned
    pub max_read_retries: u32,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            capacity: 65536,
            root_dir: std::env::temp_dir(),
            temp_dir: std::env::temp_dir(),
            prefix: String::new(),
            mode: 0o400,
            timeout: Duration::from_millis(100),
            queue_capacity: 512,
            durability: Durability::default(),
            max_read_retries: 3,
        }
    }
}

impl SpoolConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the buffer capacity in bytes
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the final-file output directory
    pub fn root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    /// Set the temp-file directory
    pub fn temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Set the filename prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the permission bits for final files
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Set the admission timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the shared work queue capacity
    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Set the durability policy
    pub fn durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    /// Set the consecutive read-retry bound
    pub fn max_read_retries(mut self, max_read_retries: u32) -> Self {
        self.max_read_retries = max_read_retries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SpoolConfig::new();
        assert_eq!(config.workers, 4);
        assert_eq!(config.capacity, 65536);
        assert_eq!(config.mode, 0o400);
        assert_eq!(config.timeout, Duration::from_millis(100));
        assert_eq!(config.queue_capacity, 512);
        assert_eq!(config.durability, Durability::BestEffort);
        assert!(config.prefix.is_empty());
    }

    #[test]
    fn test_fluent_setters() {
        let config = SpoolConfig::new()
            .workers(8)
            .capacity(1024)
            .root_dir("/var/spool/out")
            .temp_dir("/var/spool/tmp")
            .prefix("audit_")
            .mode(0o640)
            .timeout(Duration::from_millis(250))
            .queue_capacity(64)
            .durability(Durability::FailLoud)
            .max_read_retries(5);

        assert_eq!(config.workers, 8);
        assert_eq!(config.capacity, 1024);
        assert_eq!(config.root_dir, PathBuf::from("/var/spool/out"));
        assert_eq!(config.temp_dir, PathBuf::from("/var/spool/tmp"));
        assert_eq!(config.prefix, "audit_");
        assert_eq!(config.mode, 0o640);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.durability, Durability::FailLoud);
        assert_eq!(config.max_read_retries, 5);
    }

    #[test]
    fn test_durability_serde_roundtrip() {
        let json = serde_json::to_string(&Durability::FailLoud).unwrap();
        assert_eq!(json, "\"fail_loud\"");
        let back: Durability = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Durability::FailLoud);
    }
}

//! On-disk spool profile
//!
//! The serde-facing shape of a configuration file. Every field is optional;
//! missing fields resolve to the `SpoolConfig` defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use contracts::{Durability, SpoolConfig};

/// Spool configuration as written in a TOML/JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpoolProfile {
    /// Worker task count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Buffer capacity in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    /// Final-file output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,
    /// Temp-file directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
    /// Filename prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Final-file permission bits (octal integers work in TOML: `0o640`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    /// Admission timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Shared work queue capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,
    /// `best_effort` or `fail_loud`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durability: Option<Durability>,
    /// Consecutive read failures tolerated per message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_read_retries: Option<u32>,
}

impl SpoolProfile {
    /// Resolve the profile onto the configuration defaults
    pub fn into_config(self) -> SpoolConfig {
        let mut config = SpoolConfig::new();
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(root_dir) = self.root_dir {
            config.root_dir = root_dir;
        }
        if let Some(temp_dir) = self.temp_dir {
            config.temp_dir = temp_dir;
        }
        if let Some(prefix) = self.prefix {
            config.prefix = prefix;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(queue_capacity) = self.queue_capacity {
            config.queue_capacity = queue_capacity;
        }
        if let Some(durability) = self.durability {
            config.durability = durability;
        }
        if let Some(max_read_retries) = self.max_read_retries {
            config.max_read_retries = max_read_retries;
        }
        config
    }
}

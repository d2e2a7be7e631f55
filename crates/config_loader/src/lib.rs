//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON spool profiles
//! - Validate the resolved configuration
//! - Produce a ready-to-use `SpoolConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("spool.toml")).unwrap();
//! println!("workers: {}", config.workers);
//! ```

mod parser;
mod profile;
mod validator;

pub use contracts::SpoolConfig;
pub use parser::ConfigFormat;
pub use profile::SpoolProfile;
pub use validator::validate;

use contracts::SpoolError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load a spool configuration from files or
/// strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a configuration from a file path
    ///
    /// Detects the format from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SpoolConfig, SpoolError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a configuration from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<SpoolConfig, SpoolError> {
        let config = parser::parse(content, format)?.into_config();
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize a profile to a TOML string
    pub fn to_toml(profile: &SpoolProfile) -> Result<String, SpoolError> {
        toml::to_string_pretty(profile)
            .map_err(|e| SpoolError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a profile to a JSON string
    pub fn to_json(profile: &SpoolProfile) -> Result<String, SpoolError> {
        serde_json::to_string_pretty(profile)
            .map_err(|e| SpoolError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer the configuration format from the file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, SpoolError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            SpoolError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| SpoolError::config_parse(format!("unsupported config format: .{ext}")))
    }

    /// Read the configuration file content
    fn read_file(path: &Path) -> Result<String, SpoolError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

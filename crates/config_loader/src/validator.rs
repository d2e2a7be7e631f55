//! Configuration validation
//!
//! Rules:
//! - workers >= 1
//! - capacity >= 1 byte
//! - queue_capacity >= 1
//! - timeout > 0
//! - mode fits in permission bits (<= 0o777)
//! - prefix contains no path separator

use contracts::{SpoolConfig, SpoolError};

/// Validate a resolved configuration
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &SpoolConfig) -> Result<(), SpoolError> {
    validate_pool(config)?;
    validate_capacities(config)?;
    validate_timeout(config)?;
    validate_mode(config)?;
    validate_prefix(config)?;
    Ok(())
}

fn validate_pool(config: &SpoolConfig) -> Result<(), SpoolError> {
    if config.workers == 0 {
        return Err(SpoolError::config_validation(
            "workers",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_capacities(config: &SpoolConfig) -> Result<(), SpoolError> {
    if config.capacity == 0 {
        return Err(SpoolError::config_validation(
            "capacity",
            "must be at least 1 byte",
        ));
    }
    if config.queue_capacity == 0 {
        return Err(SpoolError::config_validation(
            "queue_capacity",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_timeout(config: &SpoolConfig) -> Result<(), SpoolError> {
    if config.timeout.is_zero() {
        return Err(SpoolError::config_validation(
            "timeout_ms",
            "must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_mode(config: &SpoolConfig) -> Result<(), SpoolError> {
    if config.mode > 0o777 {
        return Err(SpoolError::config_validation(
            "mode",
            format!("0o{:o} does not fit in permission bits", config.mode),
        ));
    }
    Ok(())
}

fn validate_prefix(config: &SpoolConfig) -> Result<(), SpoolError> {
    if config.prefix.chars().any(std::path::is_separator) {
        return Err(SpoolError::config_validation(
            "prefix",
            "must not contain a path separator",
        ));
    }
    Ok(())
}

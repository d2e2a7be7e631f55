//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::SpoolConfig;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    workers: usize,
    capacity: usize,
    queue_capacity: usize,
    timeout_ms: u64,
    durability: String,
    mode: String,
    root_dir: String,
    temp_dir: String,
    prefix: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(summarize(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &SpoolConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.mode & 0o400 == 0 {
        warnings.push(format!(
            "mode 0o{:o} has no owner-read bit - final files will be unreadable",
            config.mode
        ));
    }

    if config.queue_capacity < config.workers {
        warnings.push(format!(
            "queue_capacity ({}) is smaller than the worker pool ({}) - workers will idle",
            config.queue_capacity, config.workers
        ));
    }

    if config.root_dir == config.temp_dir {
        warnings.push(
            "root_dir equals temp_dir - in-flight .tmp files will sit next to final logs"
                .to_string(),
        );
    }

    warnings
}

fn summarize(config: &SpoolConfig) -> ConfigSummary {
    ConfigSummary {
        workers: config.workers,
        capacity: config.capacity,
        queue_capacity: config.queue_capacity,
        timeout_ms: config.timeout.as_millis() as u64,
        durability: format!("{:?}", config.durability),
        mode: format!("0o{:o}", config.mode),
        root_dir: config.root_dir.display().to_string(),
        temp_dir: config.temp_dir.display().to_string(),
        prefix: config.prefix.clone(),
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Workers:        {}", summary.workers);
            println!("  Capacity:       {} bytes", summary.capacity);
            println!("  Queue capacity: {}", summary.queue_capacity);
            println!("  Timeout:        {} ms", summary.timeout_ms);
            println!("  Durability:     {}", summary.durability);
            println!("  Mode:           {}", summary.mode);
            println!("  Root dir:       {}", summary.root_dir);
            println!("  Temp dir:       {}", summary.temp_dir);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::SpoolConfig;

use crate::cli::InfoArgs;

/// Effective configuration for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    workers: usize,
    capacity: usize,
    queue_capacity: usize,
    timeout_ms: u64,
    durability: String,
    mode: String,
    prefix: String,
    root_dir: String,
    temp_dir: String,
    worker_paths: Vec<WorkerPaths>,
}

#[derive(Serialize)]
struct WorkerPaths {
    worker: usize,
    temp_file: String,
    final_pattern: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => SpoolConfig::new(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&build_config_info(&config))
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn worker_paths(config: &SpoolConfig) -> Vec<WorkerPaths> {
    (0..config.workers)
        .map(|id| WorkerPaths {
            worker: id,
            temp_file: config
                .temp_dir
                .join(format!("{}{}.tmp", config.prefix, id))
                .display()
                .to_string(),
            final_pattern: config
                .root_dir
                .join(format!("{}{}_<nanos>.log", config.prefix, id))
                .display()
                .to_string(),
        })
        .collect()
}

fn build_config_info(config: &SpoolConfig) -> ConfigInfo {
    ConfigInfo {
        workers: config.workers,
        capacity: config.capacity,
        queue_capacity: config.queue_capacity,
        timeout_ms: config.timeout.as_millis() as u64,
        durability: format!("{:?}", config.durability),
        mode: format!("0o{:o}", config.mode),
        prefix: config.prefix.clone(),
        root_dir: config.root_dir.display().to_string(),
        temp_dir: config.temp_dir.display().to_string(),
        worker_paths: worker_paths(config),
    }
}

fn print_config_info(config: &SpoolConfig) {
    println!("logspool effective configuration\n");
    println!("  Pool");
    println!("   ├─ Workers:        {}", config.workers);
    println!("   ├─ Capacity:       {} bytes", config.capacity);
    println!("   ├─ Queue capacity: {}", config.queue_capacity);
    println!("   └─ Timeout:        {} ms", config.timeout.as_millis());

    println!("\n  Files");
    println!("   ├─ Root dir:   {}", config.root_dir.display());
    println!("   ├─ Temp dir:   {}", config.temp_dir.display());
    println!(
        "   ├─ Prefix:     {:?}",
        if config.prefix.is_empty() {
            "(none)"
        } else {
            config.prefix.as_str()
        }
    );
    println!("   ├─ Mode:       0o{:o}", config.mode);
    println!("   └─ Durability: {:?}", config.durability);

    println!("\n  Workers");
    let paths = worker_paths(config);
    for (i, wp) in paths.iter().enumerate() {
        let prefix = if i == paths.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        println!("   {} {}: {} -> {}", prefix, wp.worker, wp.temp_file, wp.final_pattern);
    }
    println!();
}

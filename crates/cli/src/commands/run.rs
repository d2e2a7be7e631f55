//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::info;

use contracts::{BytesSource, SpoolConfig};
use spooler::Spooler;

use crate::cli::RunArgs;

/// Execute the `run` command
///
/// Feeds newline-delimited stdin records into the spooler until EOF, the
/// record limit, or an interrupt, then flushes every worker and shuts the
/// pool down.
pub async fn run_spool(args: &RunArgs) -> Result<()> {
    let config = resolve_config(args)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    info!(
        workers = config.workers,
        capacity = config.capacity,
        root = %config.root_dir.display(),
        temp = %config.temp_dir.display(),
        "Starting spooler"
    );
    let spooler = Spooler::new(config).context("Failed to start spooler")?;

    let started = Instant::now();
    let mut accepted: u64 = 0;
    let mut rejected: u64 = 0;
    let mut bytes: u64 = 0;

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(mut record) => {
                    record.push('\n');
                    let len = record.len() as u64;
                    if spooler.write(Box::new(BytesSource::new(record.into_bytes()))).await {
                        accepted += 1;
                        bytes += len;
                        observability::record_message_accepted();
                        observability::record_spooled_bytes(len);
                    } else {
                        rejected += 1;
                        observability::record_message_rejected();
                    }
                    if args.max_records != 0 && accepted + rejected >= args.max_records {
                        info!(records = args.max_records, "Record limit reached");
                        break;
                    }
                }
                None => {
                    info!("Input exhausted, flushing");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, flushing");
                break;
            }
        }
    }

    spooler.flush().await;
    publish_worker_metrics(&spooler);
    print_summary(&spooler, accepted, rejected, bytes, started.elapsed());
    spooler.shutdown().await;

    Ok(())
}

/// Load the configuration file (when given) and apply CLI overrides
fn resolve_config(args: &RunArgs) -> Result<SpoolConfig> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => SpoolConfig::new(),
    };

    if let Some(ref root_dir) = args.root_dir {
        info!(root = %root_dir.display(), "Overriding root directory from CLI");
        config.root_dir = root_dir.clone();
    }
    if let Some(ref temp_dir) = args.temp_dir {
        info!(temp = %temp_dir.display(), "Overriding temp directory from CLI");
        config.temp_dir = temp_dir.clone();
    }
    if let Some(workers) = args.workers {
        info!(workers, "Overriding worker count from CLI");
        config.workers = workers;
    }
    if let Some(ref prefix) = args.prefix {
        config.prefix = prefix.clone();
    }

    config_loader::validate(&config).context("Invalid configuration")?;
    Ok(config)
}

fn publish_worker_metrics(spooler: &Spooler) {
    for (id, snapshot) in spooler.metrics() {
        observability::record_worker_progress(id, snapshot.received, snapshot.swaps, snapshot.saves);
        observability::record_worker_anomalies(
            id,
            snapshot.read_errors,
            snapshot.swap_failures,
            snapshot.save_failures,
            snapshot.abandoned,
        );
    }
}

fn print_summary(spooler: &Spooler, accepted: u64, rejected: u64, bytes: u64, elapsed: Duration) {
    println!("\nSpool summary");
    println!("  Records accepted: {accepted}");
    println!("  Records rejected: {rejected}");
    println!("  Bytes spooled:    {bytes}");
    println!("  Elapsed:          {:.2}s", elapsed.as_secs_f64());
    for (id, snapshot) in spooler.metrics() {
        println!(
            "  Worker {id}: received={} swaps={} saves={} anomalies={}",
            snapshot.received,
            snapshot.swaps,
            snapshot.saves,
            snapshot.read_errors + snapshot.swap_failures + snapshot.save_failures
        );
    }
}

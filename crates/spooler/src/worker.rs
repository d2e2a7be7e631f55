//! Worker - per-task buffering and file rotation
//!
//! Exactly one worker ever touches its own buffer and temp file, so all of
//! this runs without locks. Bytes accumulate in a fixed buffer; a full
//! buffer is swapped (appended) to the worker's temp file; once the temp
//! file has grown to the configured capacity it is saved (renamed) into the
//! final log namespace with a nanosecond timestamp in the name.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_channel::Receiver;
use contracts::{Durability, Message, SpoolConfig};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::handle::WorkerCommand;
use crate::metrics::WorkerMetrics;

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

/// Temp files always use this restrictive mode; the configured mode only
/// applies to final files.
#[cfg(unix)]
const TEMP_MODE: u32 = 0o600;

pub(crate) struct Worker {
    id: usize,
    /// Fixed-size buffer, allocated once; `buf.len()` is the capacity
    buf: Vec<u8>,
    /// Valid bytes in `buf`; everything past it is stale
    len: usize,
    root_dir: PathBuf,
    prefix: String,
    temp_path: PathBuf,
    mode: u32,
    durability: Durability,
    max_read_retries: u32,
    /// Nanosecond stamp of the last save, for collision-free filenames
    last_stamp: u64,
    metrics: Arc<WorkerMetrics>,
}

impl Worker {
    pub(crate) fn new(id: usize, config: &SpoolConfig, metrics: Arc<WorkerMetrics>) -> Self {
        let temp_path = config.temp_dir.join(format!("{}{}.tmp", config.prefix, id));
        Self {
            id,
            buf: vec![0; config.capacity],
            len: 0,
            root_dir: config.root_dir.clone(),
            prefix: config.prefix.clone(),
            temp_path,
            mode: config.mode,
            durability: config.durability,
            max_read_retries: config.max_read_retries,
            last_stamp: 0,
            metrics,
        }
    }

    /// Receive loop: messages from the shared queue, commands from the
    /// worker's handle. Ends when both sides are closed.
    pub(crate) async fn run(
        mut self,
        queue: Receiver<Message>,
        mut ctrl: mpsc::Receiver<WorkerCommand>,
        slots: Arc<Semaphore>,
    ) {
        // stale leftover from a prior run is unrecoverable
        let _ = fs::remove_file(&self.temp_path);
        debug!(worker = self.id, temp = %self.temp_path.display(), "worker started");

        loop {
            tokio::select! {
                cmd = ctrl.recv() => match cmd {
                    Some(WorkerCommand::Flush { ack }) => {
                        self.flush();
                        let _ = ack.send(());
                    }
                    None => break,
                },
                received = queue.recv() => match received {
                    Ok(message) => {
                        slots.add_permits(1);
                        self.process(message).await;
                    }
                    Err(_) => break,
                },
            }
        }

        // the control side can close while accepted messages are still queued
        while let Ok(message) = queue.recv().await {
            slots.add_permits(1);
            self.process(message).await;
        }

        self.checkpoint();
        debug!(worker = self.id, "worker stopped");
    }

    /// Drain one message into the buffer, swapping and saving as capacity
    /// boundaries are crossed. Closes the message on every exit path.
    async fn process(&mut self, mut message: Message) {
        self.metrics.inc_received();
        let mut swapped = false;

        // A failed fail-loud swap can leave the buffer full from an earlier
        // message; make room before the first read or give this message up.
        if self.len == self.buf.len() {
            swapped = self.swap();
            if self.len == self.buf.len() {
                warn!(worker = self.id, "buffer still full after swap retry, dropping message");
                self.metrics.inc_abandoned();
                message.close().await;
                return;
            }
        }

        let mut consecutive_failures = 0u32;
        loop {
            match message.read(&mut self.buf[self.len..]).await {
                Ok(0) => {
                    if self.len == self.buf.len() || swapped {
                        self.swap();
                        self.save();
                    }
                    break;
                }
                Ok(n) => {
                    consecutive_failures = 0;
                    self.len += n;
                    if self.len == self.buf.len() {
                        swapped = self.swap() || swapped;
                        if self.len == self.buf.len() {
                            warn!(worker = self.id, "swap failed with buffer full, dropping message tail");
                            self.metrics.inc_abandoned();
                            break;
                        }
                    }
                }
                Err(e) => {
                    self.metrics.inc_read_errors();
                    consecutive_failures += 1;
                    if consecutive_failures > self.max_read_retries {
                        warn!(
                            worker = self.id,
                            error = %e,
                            attempts = consecutive_failures,
                            "abandoning message after repeated read failures"
                        );
                        self.metrics.inc_abandoned();
                        break;
                    }
                    debug!(worker = self.id, error = %e, attempt = consecutive_failures, "message read failed, retrying");
                }
            }
        }

        message.close().await;
    }

    /// Swap then save whatever this worker currently holds.
    fn flush(&mut self) {
        self.swap();
        self.save();
    }

    /// Append the buffered bytes to the temp file and empty the buffer.
    ///
    /// Returns whether the temp file has reached the rotation threshold.
    /// An append failure reports `false`; under `BestEffort` the buffer is
    /// emptied anyway, under `FailLoud` the bytes stay for the next swap.
    fn swap(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        match self.append_temp() {
            Ok(spooled) => {
                self.len = 0;
                self.metrics.inc_swaps();
                spooled >= self.buf.len() as u64
            }
            Err(e) => {
                self.metrics.inc_swap_failures();
                warn!(worker = self.id, temp = %self.temp_path.display(), error = %e, "temp file append failed");
                if self.durability == Durability::BestEffort {
                    self.len = 0;
                }
                false
            }
        }
    }

    fn append_temp(&mut self) -> std::io::Result<u64> {
        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        options.mode(TEMP_MODE);
        let mut file = options.open(&self.temp_path)?;
        file.write_all(&self.buf[..self.len])?;
        Ok(file.metadata()?.len())
    }

    /// Promote the temp file to a permanent, permissioned log file.
    fn save(&mut self) {
        let stamp = self.next_stamp();
        let target = self.final_path(stamp);
        if let Err(e) = fs::rename(&self.temp_path, &target) {
            self.metrics.inc_save_failures();
            warn!(
                worker = self.id,
                from = %self.temp_path.display(),
                to = %target.display(),
                error = %e,
                "temp file promotion failed"
            );
            return;
        }
        self.metrics.inc_saves();
        debug!(worker = self.id, file = %target.display(), "log file saved");
        #[cfg(unix)]
        {
            // chmod is best-effort
            let _ = fs::set_permissions(&target, fs::Permissions::from_mode(self.mode));
        }
    }

    /// Final swap+save on shutdown, skipped when there is nothing pending.
    fn checkpoint(&mut self) {
        if self.len > 0 || self.temp_path.exists() {
            self.flush();
        }
    }

    /// Wall-clock nanoseconds, bumped so two saves never share a stamp.
    fn next_stamp(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let stamp = if now <= self.last_stamp {
            self.last_stamp + 1
        } else {
            now
        };
        self.last_stamp = stamp;
        stamp
    }

    fn final_path(&self, stamp: u64) -> PathBuf {
        self.root_dir
            .join(format!("{}{}_{}.log", self.prefix, self.id, stamp))
    }
}

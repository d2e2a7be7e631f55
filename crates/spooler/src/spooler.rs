//! Spooler - admission control and fan-out to the worker pool

use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_channel::{Sender, TrySendError};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use contracts::{Message, SpoolConfig};

use crate::error::SpoolerError;
use crate::handle::WorkerHandle;
use crate::metrics::MetricsSnapshot;

/// Accepts messages from arbitrary concurrent producers and distributes them
/// over a fixed pool of workers through one shared bounded queue.
///
/// Admission is the only back-pressure mechanism: a producer waits for a
/// queue slot for at most the configured timeout, then the message is closed
/// and rejected. After admission, no buffering or rotation failure ever
/// reaches a producer; anomalies are logged and counted.
pub struct Spooler {
    admission_timeout: Duration,
    queue_tx: Sender<Message>,
    /// One permit per queue slot; acquiring with a deadline is what makes
    /// admission timed without losing the message on the timeout path
    slots: Arc<Semaphore>,
    handles: Vec<WorkerHandle>,
    rejected: AtomicU64,
}

impl Spooler {
    /// Create the spool directories and spawn the worker pool
    pub fn new(config: SpoolConfig) -> Result<Self, SpoolerError> {
        if config.workers == 0 {
            return Err(SpoolerError::config("workers", "must be at least 1"));
        }
        if config.capacity == 0 {
            return Err(SpoolerError::config("capacity", "must be at least 1 byte"));
        }
        if config.queue_capacity == 0 {
            return Err(SpoolerError::config("queue_capacity", "must be at least 1"));
        }
        fs::create_dir_all(&config.root_dir)
            .map_err(|e| SpoolerError::create_dir(&config.root_dir, e))?;
        fs::create_dir_all(&config.temp_dir)
            .map_err(|e| SpoolerError::create_dir(&config.temp_dir, e))?;

        let (queue_tx, queue_rx) = async_channel::bounded(config.queue_capacity);
        let slots = Arc::new(Semaphore::new(config.queue_capacity));

        let handles = (0..config.workers)
            .map(|id| WorkerHandle::spawn(id, &config, queue_rx.clone(), Arc::clone(&slots)))
            .collect();

        info!(
            workers = config.workers,
            capacity = config.capacity,
            queue = config.queue_capacity,
            root = %config.root_dir.display(),
            "spooler started"
        );

        Ok(Self {
            admission_timeout: config.timeout,
            queue_tx,
            slots,
            handles,
            rejected: AtomicU64::new(0),
        })
    }

    /// Offer a message to the worker pool
    ///
    /// Returns `true` when a queue slot was claimed within the admission
    /// timeout; ownership of the message passes to whichever worker dequeues
    /// it. Returns `false` when the timeout elapsed first; the message has
    /// already been closed and the caller holds nothing.
    pub async fn write(&self, mut message: Message) -> bool {
        let permit = match timeout(self.admission_timeout, self.slots.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) | Err(_) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                debug!("admission timed out, message rejected");
                message.close().await;
                return false;
            }
        };

        // a permit guarantees a slot, so this only fails on a closed queue
        match self.queue_tx.try_send(message) {
            Ok(()) => {
                permit.forget();
                true
            }
            Err(TrySendError::Full(mut message)) | Err(TrySendError::Closed(mut message)) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!("work queue unavailable, message rejected");
                message.close().await;
                false
            }
        }
    }

    /// Force every worker to save its current state to a final file
    ///
    /// Each worker swaps its buffer to the temp file and promotes the temp
    /// file, whether or not the rotation threshold was reached. Workers are
    /// flushed one after another; there is no atomicity across them, and
    /// they keep accepting messages afterwards.
    pub async fn flush(&self) {
        for handle in &self.handles {
            handle.flush().await;
        }
        debug!(workers = self.handles.len(), "flush complete");
    }

    /// Number of workers in the pool
    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Messages rejected at admission since construction
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Per-worker counter snapshots
    pub fn metrics(&self) -> Vec<(usize, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.id(), h.metrics().snapshot()))
            .collect()
    }

    /// Stop accepting messages, drain the queue, and join every worker
    ///
    /// Queued messages are still processed; each worker then checkpoints
    /// whatever it holds to a final file before its task ends.
    pub async fn shutdown(self) {
        self.slots.close();
        self.queue_tx.close();
        for handle in self.handles {
            handle.shutdown().await;
        }
        info!("spooler shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::{BytesSource, MessageSource};
    use std::io;
    use tempfile::tempdir;

    fn message(bytes: &[u8]) -> Message {
        Box::new(BytesSource::new(bytes.to_vec()))
    }

    /// Source that stalls its worker for a while before yielding anything
    struct SlowSource {
        delay: Duration,
        closes: Arc<AtomicU64>,
    }

    #[async_trait]
    impl MessageSource for SlowSource {
        async fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            tokio::time::sleep(self.delay).await;
            Ok(0)
        }

        async fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_rejects_zero_workers() {
        let config = SpoolConfig::new().workers(0);
        assert!(matches!(
            Spooler::new(config),
            Err(SpoolerError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_creates_spool_directories() {
        let dir = tempdir().unwrap();
        let config = SpoolConfig::new()
            .root_dir(dir.path().join("out"))
            .temp_dir(dir.path().join("tmp"));

        let _spooler = Spooler::new(config).unwrap();
        assert!(dir.path().join("out").is_dir());
        assert!(dir.path().join("tmp").is_dir());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_write_flush_shutdown_roundtrip() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let config = SpoolConfig::new()
            .workers(1)
            .capacity(128)
            .root_dir(root.path())
            .temp_dir(temp.path());

        let spooler = Spooler::new(config).unwrap();
        assert!(spooler.write(message(b"first ")).await);
        assert!(spooler.write(message(b"second")).await);

        // the flush command and queued messages race otherwise
        for _ in 0..200 {
            if spooler.metrics()[0].1.received == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        spooler.flush().await;

        let files: Vec<_> = fs::read_dir(root.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(fs::read(&files[0]).unwrap(), b"first second");

        let snapshots = spooler.metrics();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].1.received, 2);
        assert_eq!(spooler.rejected(), 0);

        spooler.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_saturated_queue_rejects_and_closes() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let config = SpoolConfig::new()
            .workers(1)
            .queue_capacity(1)
            .timeout(Duration::from_millis(100))
            .root_dir(root.path())
            .temp_dir(temp.path());

        let spooler = Spooler::new(config).unwrap();
        let closes = Arc::new(AtomicU64::new(0));

        // stall the only worker, then occupy the only queue slot
        assert!(
            spooler
                .write(Box::new(SlowSource {
                    delay: Duration::from_secs(2),
                    closes: Arc::new(AtomicU64::new(0)),
                }))
                .await
        );
        assert!(spooler.write(message(b"queued")).await);

        let rejected = Box::new(SlowSource {
            delay: Duration::ZERO,
            closes: Arc::clone(&closes),
        });
        assert!(!spooler.write(rejected).await);
        assert_eq!(closes.load(Ordering::Relaxed), 1);
        assert_eq!(spooler.rejected(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_write_succeeds_when_slot_frees_in_time() {
        let root = tempdir().unwrap();
        let temp = tempdir().unwrap();
        let config = SpoolConfig::new()
            .workers(1)
            .queue_capacity(1)
            .timeout(Duration::from_secs(5))
            .root_dir(root.path())
            .temp_dir(temp.path());

        let spooler = Spooler::new(config).unwrap();

        // worker busy for a moment, slot occupied; the generous timeout
        // outlives the stall
        assert!(
            spooler
                .write(Box::new(SlowSource {
                    delay: Duration::from_millis(50),
                    closes: Arc::new(AtomicU64::new(0)),
                }))
                .await
        );
        assert!(spooler.write(message(b"waits")).await);
        assert!(spooler.write(message(b"admitted")).await);

        spooler.shutdown().await;
    }
}

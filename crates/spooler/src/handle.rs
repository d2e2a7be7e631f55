//! WorkerHandle - owns a worker's control channel and background task

use std::sync::Arc;

use async_channel::Receiver;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use contracts::{Message, SpoolConfig};

use crate::metrics::WorkerMetrics;
use crate::worker::Worker;

/// Commands a handle can send its worker
pub(crate) enum WorkerCommand {
    /// Swap and save whatever the worker holds; ack when done
    Flush { ack: oneshot::Sender<()> },
}

/// Handle to a running worker task
pub struct WorkerHandle {
    id: usize,
    ctrl_tx: mpsc::Sender<WorkerCommand>,
    metrics: Arc<WorkerMetrics>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Create the worker and spawn its receive loop
    pub(crate) fn spawn(
        id: usize,
        config: &SpoolConfig,
        queue: Receiver<Message>,
        slots: Arc<Semaphore>,
    ) -> Self {
        let metrics = Arc::new(WorkerMetrics::new());
        let (ctrl_tx, ctrl_rx) = mpsc::channel(4);
        let worker = Worker::new(id, config, Arc::clone(&metrics));
        let join = tokio::spawn(worker.run(queue, ctrl_rx, slots));

        Self {
            id,
            ctrl_tx,
            metrics,
            join,
        }
    }

    /// Get worker id
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<WorkerMetrics> {
        &self.metrics
    }

    /// Ask the worker to swap+save its current state and wait for the ack
    pub(crate) async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self
            .ctrl_tx
            .send(WorkerCommand::Flush { ack })
            .await
            .is_ok()
        {
            let _ = done.await;
        }
    }

    /// Release the control channel and wait for the worker task to stop
    pub(crate) async fn shutdown(self) {
        drop(self.ctrl_tx);
        if let Err(e) = self.join.await {
            error!(worker = self.id, error = ?e, "worker task panicked");
        }
        debug!(worker = self.id, "worker handle shutdown complete");
    }
}

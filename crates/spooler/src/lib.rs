//! # Spooler
//!
//! The buffering-and-rotation engine.
//!
//! Responsibilities:
//! - Accept messages from arbitrary concurrent producers with bounded
//!   admission (timed queue insertion, not a rate limiter)
//! - Distribute messages over a fixed pool of workers through one shared
//!   bounded queue
//! - Per worker: accumulate bytes in a fixed buffer, swap full buffers to a
//!   temp file, promote completed temp files to timestamped final log files

pub mod error;
pub mod handle;
pub mod metrics;
pub mod spooler;

mod worker;

pub use contracts::{BytesSource, Durability, Message, MessageSource, ReaderSource, SpoolConfig};
pub use error::SpoolerError;
pub use handle::WorkerHandle;
pub use metrics::{MetricsSnapshot, WorkerMetrics};
pub use spooler::Spooler;

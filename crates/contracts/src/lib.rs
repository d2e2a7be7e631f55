//! # Contracts
//!
//! Frozen interface contracts shared by every logspool crate: the message
//! source trait, the spool configuration value, and the unified error type.
//! All business crates can only depend on this crate, reverse dependencies
//! are prohibited.

mod config;
mod error;
mod source;

pub use config::{Durability, SpoolConfig};
pub use error::SpoolError;
pub use source::{BytesSource, Message, MessageSource, ReaderSource};

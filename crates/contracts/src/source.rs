//! MessageSource trait - the byte stream a producer hands to the spooler
//!
//! A message is an opaque readable byte source with an explicit close
//! operation. Ownership moves with the message: whichever component ends up
//! holding it (a worker, or the dispatcher on admission rejection) must call
//! `close` exactly once before letting it go.

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Boxed message as carried by the shared work queue
pub type Message = Box<dyn MessageSource>;

/// Readable byte source with an explicit close
///
/// `read` fills as much of `buf` as it can and returns the number of bytes
/// written. `Ok(0)` signals end-of-stream. An `Err` is a non-terminal fault:
/// the caller may retry the same source.
#[async_trait]
pub trait MessageSource: Send {
    /// Read up to `buf.len()` bytes into `buf`
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release whatever the source holds
    ///
    /// Must be idempotent-safe to implement cheaply; callers invoke it
    /// exactly once.
    async fn close(&mut self);
}

/// In-memory message over a `Bytes` payload
///
/// The cheapest way to hand a ready-made record to the spooler. `chunk`
/// optionally caps how many bytes a single `read` yields, which lets tests
/// exercise multi-read draining.
pub struct BytesSource {
    data: Bytes,
    chunk: Option<usize>,
}

impl BytesSource {
    /// Wrap a payload
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            chunk: None,
        }
    }

    /// Cap the number of bytes returned by a single `read`
    pub fn with_chunk(mut self, chunk: usize) -> Self {
        self.chunk = Some(chunk);
        self
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

#[async_trait]
impl MessageSource for BytesSource {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = self.data.len().min(buf.len());
        if let Some(chunk) = self.chunk {
            n = n.min(chunk);
        }
        if n == 0 {
            return Ok(0);
        }
        let taken = self.data.split_to(n);
        buf[..n].copy_from_slice(&taken);
        Ok(n)
    }

    async fn close(&mut self) {
        self.data = Bytes::new();
    }
}

/// Message over any tokio reader
///
/// Used by the CLI to spool stdin records; also adapts files and sockets.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: AsyncRead + Send + Unpin> ReaderSource<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl<R: AsyncRead + Send + Unpin> MessageSource for ReaderSource<R> {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.reader.read(buf).await
    }

    async fn close(&mut self) {
        // Dropping the reader releases the underlying handle.
    }
}

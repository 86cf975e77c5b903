//! Byte-transport contract for the instrument link

use crate::error::TransportResult;
use async_trait::async_trait;
use std::time::Duration;

/// Byte-oriented link to the instrument.
///
/// Implementations hold the only open handle to the physical device; closing
/// the transport invalidates any frame still in flight.
///
/// # Blocking Model
/// All operations are sequential on a single logical thread. The only place
/// the system waits is inside [`Transport::receive`], and that wait is bounded
/// by the `timeout` argument so callers can poll cancellation between calls
/// instead of interrupting a read mid-flight.
#[async_trait]
pub trait Transport: Send {
    /// Send raw bytes to the device
    ///
    /// # Errors
    /// Returns `TransportError::LinkLost` if the link dropped.
    async fn send(&mut self, bytes: &[u8]) -> TransportResult<()>;

    /// Receive up to `max_len` bytes, waiting at most `timeout`.
    ///
    /// Returns at least one byte on success; never returns an empty buffer.
    ///
    /// # Errors
    /// Returns `TransportError::Timeout` if nothing arrived in time and
    /// `TransportError::LinkLost` if the link dropped.
    async fn receive(&mut self, max_len: usize, timeout: Duration) -> TransportResult<Vec<u8>>;

    /// Release the device handle. Idempotent, best effort.
    async fn close(&mut self);

    /// Check whether the transport has been closed or has lost its link
    fn is_closed(&self) -> bool;
}

#[async_trait]
impl Transport for Box<dyn Transport> {
    async fn send(&mut self, bytes: &[u8]) -> TransportResult<()> {
        (**self).send(bytes).await
    }

    async fn receive(&mut self, max_len: usize, timeout: Duration) -> TransportResult<Vec<u8>> {
        (**self).receive(max_len, timeout).await
    }

    async fn close(&mut self) {
        (**self).close().await
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

//! Incremental frame reader
//!
//! Accumulates transport bytes until a complete frame is buffered, keeping
//! the stream aligned on sync bytes. Exactly one frame's bytes are consumed
//! per call, so a frame that fails validation is dropped whole and the next
//! read starts at a clean boundary.

use crate::error::SessionResult;
use crate::frame::{self, Frame, FRAME_OVERHEAD, MAX_PAYLOAD_LEN, SYNC};
use bytes::{Buf, BytesMut};
use std::time::Duration;
use ut181_transport::Transport;

/// Transport read size per receive call
const READ_CHUNK: usize = 256;

/// Incremental frame reader with resynchronisation
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: BytesMut,
}

impl FrameReader {
    /// Create a new reader with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and decode the next frame from `transport`.
    ///
    /// `timeout` bounds each individual transport receive, which keeps this
    /// call suitable for cancellation polling by the layers above.
    ///
    /// # Errors
    /// Transport errors (including `Timeout`) and frame validation errors
    /// propagate; after a frame error the damaged bytes have already been
    /// consumed.
    pub async fn read_frame(
        &mut self,
        transport: &mut dyn Transport,
        timeout: Duration,
    ) -> SessionResult<Frame> {
        loop {
            self.discard_noise();

            if let Some(total) = frame::declared_frame_len(&self.buf) {
                if total > FRAME_OVERHEAD + MAX_PAYLOAD_LEN {
                    // Bogus header, likely mid-stream garbage that happened to
                    // contain a sync byte. Drop it and rescan.
                    log::warn!("dropping sync byte with implausible length {}", total);
                    self.buf.advance(1);
                    continue;
                }
                if self.buf.len() >= total {
                    let bytes = self.buf.split_to(total);
                    return Ok(Frame::decode(&bytes)?);
                }
            }

            let chunk = transport.receive(READ_CHUNK, timeout).await?;
            self.buf.extend_from_slice(&chunk);
        }
    }

    /// Drop leading bytes up to the next sync byte
    fn discard_noise(&mut self) {
        let noise = self.buf.iter().take_while(|&&b| b != SYNC).count();
        if noise > 0 {
            log::warn!("discarding {} noise bytes before sync", noise);
            self.buf.advance(noise);
        }
    }
}

//! Device session: the live connection state between open and close

use crate::error::{FrameError, SessionResult};
use crate::frame::{Frame, Opcode};
use crate::reader::FrameReader;
use std::time::Duration;
use ut181_transport::Transport;

/// Default bound on waiting for a response frame
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(500);

/// How long the best-effort close waits for the device to acknowledge
const CLOSE_TIMEOUT: Duration = Duration::from_millis(200);

/// Capabilities negotiated during the open handshake.
///
/// Carried in the Ack payload of the OpenSession exchange. Older firmware
/// replies with an empty payload; defaults apply then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCapabilities {
    pub protocol_version: u8,
    pub flags: u8,
}

impl Default for SessionCapabilities {
    fn default() -> Self {
        Self {
            protocol_version: 1,
            flags: 0,
        }
    }
}

impl SessionCapabilities {
    /// Decode capabilities from an Ack payload, tolerating short payloads
    pub fn decode(payload: &[u8]) -> Self {
        let defaults = Self::default();
        Self {
            protocol_version: payload.first().copied().unwrap_or(defaults.protocol_version),
            flags: payload.get(1).copied().unwrap_or(defaults.flags),
        }
    }
}

/// An open link to the instrument.
///
/// Owns the transport exclusively; exactly one session is open at a time.
/// Requests and responses are strictly paired in order — the session never
/// pipelines. Callers serialize catalog, download and monitor operations
/// against the same session.
pub struct DeviceSession {
    transport: Box<dyn Transport>,
    reader: FrameReader,
    capabilities: SessionCapabilities,
    open: bool,
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("capabilities", &self.capabilities)
            .field("open", &self.open)
            .finish()
    }
}

impl DeviceSession {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        reader: FrameReader,
        capabilities: SessionCapabilities,
    ) -> Self {
        Self {
            transport,
            reader,
            capabilities,
            open: true,
        }
    }

    /// Capabilities reported by the device during the handshake
    pub fn capabilities(&self) -> SessionCapabilities {
        self.capabilities
    }

    /// Check whether the session is still open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Send one request frame
    pub async fn send_request(&mut self, opcode: Opcode, payload: &[u8]) -> SessionResult<()> {
        let frame = Frame::new(opcode, payload);
        self.transport.send(&frame.encode()).await?;
        Ok(())
    }

    /// Read the next response frame, waiting at most `timeout` per receive.
    ///
    /// Only instrument-side opcodes (Ack, Nak, Data) are valid here; a
    /// request opcode in the response stream means the link has slipped.
    pub async fn read_response(&mut self, timeout: Duration) -> SessionResult<Frame> {
        let frame = self.reader.read_frame(&mut *self.transport, timeout).await?;
        if !frame.opcode.is_response() {
            return Err(FrameError::Malformed(format!(
                "request opcode {} in the response stream",
                frame.opcode
            ))
            .into());
        }
        Ok(frame)
    }

    /// Send one request and read its single response.
    ///
    /// This is the only exchange shape the protocol supports: one request,
    /// one response, in order.
    pub async fn transact(
        &mut self,
        opcode: Opcode,
        payload: &[u8],
        timeout: Duration,
    ) -> SessionResult<Frame> {
        self.send_request(opcode, payload).await?;
        self.read_response(timeout).await
    }

    /// Close the session.
    ///
    /// Sends CloseSession best-effort — a failure here is logged, never
    /// raised — then releases the transport. Idempotent and always safe to
    /// call, including after cancellation or mid-download errors.
    pub async fn close(&mut self) {
        if self.open {
            match self.transact(Opcode::CloseSession, &[], CLOSE_TIMEOUT).await {
                Ok(frame) if frame.opcode == Opcode::Ack => {}
                Ok(frame) => {
                    log::warn!("unexpected reply to CloseSession: {}", frame.opcode);
                }
                Err(e) => {
                    log::warn!("best-effort CloseSession failed: {}", e);
                }
            }
            self.open = false;
        }
        self.transport.close().await;
    }
}

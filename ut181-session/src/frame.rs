//! Frame structure and encoding/decoding for the UT181A wire protocol
//!
//! The layout is a fixed external contract with the instrument firmware and
//! must be reproduced bit-exact:
//!
//! ```text
//! +------+--------+--------+--------+- - - - -+----------+
//! | sync | opcode | len_lo | len_hi | payload | checksum |
//! +------+--------+--------+--------+- - - - -+----------+
//! ```
//!
//! Length is the payload byte count, little-endian. The checksum is the
//! wrapping 8-bit sum over opcode, both length bytes and the payload. A frame
//! whose checksum does not match is discarded whole and never partially
//! interpreted.

use crate::error::FrameError;
use std::fmt;

/// Sync byte opening every frame
pub const SYNC: u8 = 0xAB;

/// Fixed per-frame byte count: sync + opcode + length + checksum
pub const FRAME_OVERHEAD: usize = 5;

/// Upper bound on a sane payload length; anything larger is line noise
pub const MAX_PAYLOAD_LEN: usize = 4096;

/// Frame opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    // Host -> instrument
    OpenSession = 0x01,
    CloseSession = 0x02,
    ListRecords = 0x03,
    GetRecordChunk = 0x04,
    GetLiveSample = 0x05,
    // Instrument -> host
    Ack = 0x80,
    Nak = 0x81,
    Data = 0x82,
}

impl Opcode {
    /// Get opcode from its wire byte, `None` if unrecognized
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Opcode::OpenSession),
            0x02 => Some(Opcode::CloseSession),
            0x03 => Some(Opcode::ListRecords),
            0x04 => Some(Opcode::GetRecordChunk),
            0x05 => Some(Opcode::GetLiveSample),
            0x80 => Some(Opcode::Ack),
            0x81 => Some(Opcode::Nak),
            0x82 => Some(Opcode::Data),
            _ => None,
        }
    }

    /// Check whether this opcode is sent by the instrument
    pub fn is_response(&self) -> bool {
        matches!(self, Opcode::Ack | Opcode::Nak | Opcode::Data)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(0x{:02X})", self, *self as u8)
    }
}

/// A single protocol message.
///
/// Instances are transient; they are owned by whichever component last
/// decoded them and carry no transport state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: Opcode,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a new frame
    pub fn new(opcode: Opcode, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            opcode,
            payload: payload.into(),
        }
    }

    /// Encode the frame into its wire form
    pub fn encode(&self) -> Vec<u8> {
        let len = self.payload.len() as u16;
        let mut out = Vec::with_capacity(FRAME_OVERHEAD + self.payload.len());
        out.push(SYNC);
        out.push(self.opcode as u8);
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&self.payload);
        out.push(checksum(self.opcode as u8, &self.payload));
        out
    }

    /// Decode a frame from its wire form.
    ///
    /// Pure function, no transport side effects. The checksum is validated
    /// before the opcode or payload is interpreted.
    ///
    /// # Errors
    /// - `Malformed` if the sync byte is wrong, the buffer is shorter than
    ///   the fixed overhead, or the declared length exceeds the buffer
    /// - `ChecksumMismatch` if integrity validation fails
    /// - `UnknownOpcode` if the opcode byte is unrecognized
    pub fn decode(buf: &[u8]) -> Result<Frame, FrameError> {
        if buf.len() < FRAME_OVERHEAD {
            return Err(FrameError::Malformed(format!(
                "frame shorter than fixed overhead: {} bytes",
                buf.len()
            )));
        }
        if buf[0] != SYNC {
            return Err(FrameError::Malformed(format!(
                "bad sync byte: 0x{:02X}",
                buf[0]
            )));
        }

        let len = usize::from(u16::from_le_bytes([buf[2], buf[3]]));
        if len > MAX_PAYLOAD_LEN {
            return Err(FrameError::Malformed(format!(
                "declared payload length {} exceeds protocol maximum",
                len
            )));
        }
        if FRAME_OVERHEAD + len > buf.len() {
            return Err(FrameError::Malformed(format!(
                "declared payload length {} exceeds buffer ({} bytes)",
                len,
                buf.len()
            )));
        }

        let payload = &buf[4..4 + len];
        let received = buf[4 + len];
        let computed = checksum(buf[1], payload);
        if computed != received {
            return Err(FrameError::ChecksumMismatch { computed, received });
        }

        let opcode = Opcode::from_byte(buf[1]).ok_or(FrameError::UnknownOpcode(buf[1]))?;
        Ok(Frame {
            opcode,
            payload: payload.to_vec(),
        })
    }
}

/// Checksum over opcode, length and payload: wrapping 8-bit sum
pub fn checksum(opcode: u8, payload: &[u8]) -> u8 {
    let len = payload.len() as u16;
    let [len_lo, len_hi] = len.to_le_bytes();
    payload
        .iter()
        .fold(
            opcode.wrapping_add(len_lo).wrapping_add(len_hi),
            |sum, &b| sum.wrapping_add(b),
        )
}

/// Peek the total wire length of the frame starting at `buf[0]`.
///
/// Returns `None` while the 4-byte header is incomplete. The caller is
/// responsible for having aligned `buf` on a sync byte first.
pub(crate) fn declared_frame_len(buf: &[u8]) -> Option<usize> {
    if buf.len() < 4 {
        return None;
    }
    let len = usize::from(u16::from_le_bytes([buf[2], buf[3]]));
    Some(FRAME_OVERHEAD + len)
}

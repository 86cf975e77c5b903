//! Session layer for UT181A multimeter communication
//!
//! This crate owns the instrument's wire format and the session lifecycle:
//! frame encoding/decoding with checksum validation, an incremental frame
//! reader that keeps the byte stream synchronised, and the session manager
//! that discovers a device, performs the open handshake and tears the link
//! down again.

pub mod error;
pub mod frame;
pub mod manager;
pub mod reader;
pub mod session;

pub use error::{FrameError, OpenError, SessionError, SessionResult};
pub use frame::{Frame, Opcode, FRAME_OVERHEAD, MAX_PAYLOAD_LEN, SYNC};
pub use manager::{open, open_with_transport, select_candidate, HANDSHAKE_TIMEOUT};
pub use reader::FrameReader;
pub use session::{DeviceSession, SessionCapabilities, RESPONSE_TIMEOUT};

use thiserror::Error;
use ut181_transport::TransportError;

/// Errors raised while decoding a single frame
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("checksum mismatch: computed 0x{computed:02X}, frame carries 0x{received:02X}")]
    ChecksumMismatch { computed: u8, received: u8 },

    #[error("unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),
}

/// Errors raised by session-level exchanges.
///
/// This is the propagation channel for transport and frame failures through
/// the catalog, downloader and monitor layers.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

impl SessionError {
    /// Check whether this is a bounded-wait expiry rather than a failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Transport(TransportError::Timeout))
    }
}

/// Errors raised while opening a device session
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("no matching UT181A device found")]
    NotFound,

    #[error("{count} candidate devices found, specify a serial string to pick one")]
    AmbiguousDevice { count: usize },

    #[error("session handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("device enumeration failed: {0}")]
    Enumeration(#[source] tokio_serial::Error),

    #[error("failed to open serial port: {0}")]
    Port(#[source] tokio_serial::Error),
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

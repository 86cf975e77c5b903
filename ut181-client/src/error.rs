use thiserror::Error;
use ut181_core::RecordDescriptor;
use ut181_session::{Opcode, SessionError};

/// Errors raised while listing the stored-record catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("protocol violation during listing: {0}")]
    ProtocolViolation(String),

    /// Cancellation observed between frames. Carries the descriptors
    /// gathered so far, since the caller must know the result is partial.
    #[error("listing cancelled after {} descriptors", partial.len())]
    Cancelled { partial: Vec<RecordDescriptor> },
}

/// Errors raised while downloading a stored record
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("protocol violation during download: {0}")]
    ProtocolViolation(String),

    /// Every attempt at one chunk failed checksum validation
    #[error("record {index} corrupt: {attempts} chunk attempts failed checksum")]
    CorruptRecord { index: u32, attempts: u32 },

    #[error("unsupported record kind: 0x{0:02X}")]
    UnsupportedRecordKind(u8),

    /// Cancellation between chunk requests; partial data is discarded
    #[error("download cancelled")]
    Cancelled,
}

/// Errors raised by the live monitor.
///
/// Cancellation is normal termination for the monitor, not an error.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("unexpected response to live sample poll: {0}")]
    UnexpectedResponse(Opcode),
}

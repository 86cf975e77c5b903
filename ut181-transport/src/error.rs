use thiserror::Error;

/// Errors raised by the byte transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// No data arrived within the bounded receive interval. Callers poll
    /// cancellation between receives, so this is frequently not fatal.
    #[error("receive timed out")]
    Timeout,

    /// The physical link dropped or the device handle became unusable
    #[error("link lost: {0}")]
    LinkLost(#[source] std::io::Error),
}

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

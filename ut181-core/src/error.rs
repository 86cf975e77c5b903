use thiserror::Error;

/// Errors produced by pure record/sample decoding
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("unsupported record kind: 0x{0:02X}")]
    UnsupportedKind(u8),

    #[error("record data truncated: {context} needs {needed} bytes, {available} available")]
    Truncated {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("sample count mismatch: preamble declares {declared}, payload holds {actual}")]
    CountMismatch { declared: usize, actual: usize },
}

/// Result type alias for record decoding
pub type RecordResult<T> = Result<T, RecordError>;

//! Result and error types for the Coveron runtime.
//!
//! The marker operations themselves never return these: a failing CRI file
//! must not change the behavior of the instrumented program. Errors surface
//! only from construction-time parsing, explicit initialization and the
//! decoder.

use thiserror::Error;

/// Result type for Coveron runtime operations
pub type CriResult<T> = Result<T, CriError>;

/// Errors that can occur while building, writing or decoding CRI data
#[derive(Debug, Error)]
pub enum CriError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-size field received the wrong number of bytes
    #[error("Invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Field name
        field: &'static str,
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },

    /// A hex-encoded field could not be parsed
    #[error("Invalid hex in {field}: {message}")]
    InvalidHex {
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },

    /// Execution comment is not representable on the wire
    #[error("Invalid execution comment: {message}")]
    InvalidComment {
        /// Error message
        message: String,
    },

    /// Header bytes are not a CRI header
    #[error("Not a CRI header: {message}")]
    InvalidHeader {
        /// Error message
        message: String,
    },

    /// Header belongs to another source or instrumentation pass
    #[error("CRI header does not match the expected source hash and instrumentation random")]
    HeaderMismatch,

    /// Input ended in the middle of a record
    #[error("Truncated record at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedRecord {
        /// Byte offset of the record start
        offset: usize,
        /// Bytes needed to complete the record
        needed: usize,
        /// Bytes remaining in the input
        available: usize,
    },

    /// Event record carries a tag byte that is not a known marker tag
    #[error("Unknown marker tag 0x{tag:02X} at offset {offset}")]
    UnknownTag {
        /// Byte offset of the record start
        offset: usize,
        /// Offending tag byte
        tag: u8,
    },

    /// Execution marker is missing its terminator or newline
    #[error("Malformed execution marker at offset {offset}: {message}")]
    MalformedExecutionMarker {
        /// Byte offset of the record start
        offset: usize,
        /// Error message
        message: String,
    },
}

impl CriError {
    /// Create an invalid comment error
    #[must_use]
    pub fn invalid_comment(message: impl Into<String>) -> Self {
        Self::InvalidComment {
            message: message.into(),
        }
    }

    /// Create an invalid header error
    #[must_use]
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }
}

//! Codec error types

use thiserror::Error;

/// Codec error
#[derive(Error, Debug)]
pub enum CodecError {
    /// Malformed document, unexpected element or unreadable literal
    #[error("Decoding error at position {position}: {message}")]
    Decoding { position: u64, message: String },

    /// A value that cannot be rendered so that it reads back unchanged
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Operation not allowed in the current reader or writer state
    #[error("Invalid codec state: {0}")]
    InvalidState(String),

    /// I/O error from the underlying source or sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn decoding(position: u64, message: impl Into<String>) -> Self {
        CodecError::Decoding {
            position,
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for CodecError {
    fn from(err: quick_xml::Error) -> Self {
        CodecError::Encoding(err.to_string())
    }
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

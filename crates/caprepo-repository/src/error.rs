//! Error types for the repository layer

use caprepo_codec::CodecError;
use caprepo_core::{CoreError, FilterError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Reading or writing the on-disk store failed
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The store document could not be decoded or encoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A delegate could not produce a resource
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// The requirement carries a malformed filter
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Invalid model data, e.g. unparseable coordinates
    #[error("Model error: {0}")]
    Core(#[from] CoreError),

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RepositoryError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RepositoryError::Storage {
            path: path.into(),
            source,
        }
    }
}

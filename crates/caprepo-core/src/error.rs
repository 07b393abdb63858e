//! Error types for caprepo core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Namespace must not be empty")]
    EmptyNamespace,

    #[error("Invalid version '{value}': {message}")]
    InvalidVersion { value: String, message: String },

    #[error("Invalid version range '{value}': {message}")]
    InvalidVersionRange { value: String, message: String },

    #[error("Invalid maven coordinates '{0}'")]
    InvalidCoordinates(String),

    #[error("Invalid {kind} value '{value}'")]
    InvalidValue { kind: String, value: String },

    #[error("Resource already has an identity capability")]
    DuplicateIdentity,
}

pub type Result<T> = std::result::Result<T, CoreError>;

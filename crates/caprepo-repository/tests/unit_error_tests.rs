//! Unit tests for RepositoryError types and error handling

use caprepo_codec::CodecError;
use caprepo_core::{CoreError, FilterParser};
use caprepo_repository::{ConfigError, RepositoryError};
use std::path::PathBuf;

#[test]
fn test_error_invalid_path_display() {
    let error = RepositoryError::InvalidPath {
        path: PathBuf::from("/invalid/path"),
    };

    assert_eq!(error.to_string(), "Invalid path: /invalid/path");
}

#[test]
fn test_error_storage_display() {
    let error = RepositoryError::Storage {
        path: PathBuf::from("/store/repository.xml"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };

    assert_eq!(
        error.to_string(),
        "Storage error at /store/repository.xml: denied"
    );
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_error_retrieval_display() {
    let error = RepositoryError::Retrieval("HTTP 404".to_string());

    assert_eq!(error.to_string(), "Retrieval error: HTTP 404");
}

#[test]
fn test_error_codec_conversion() {
    let codec_error = CodecError::Encoding("bad value".to_string());
    let error: RepositoryError = codec_error.into();

    assert!(error.to_string().contains("Codec error"));
    assert!(error.to_string().contains("bad value"));
}

#[test]
fn test_error_filter_conversion() {
    let filter_error = FilterParser::parse("(a=b").unwrap_err();
    let error: RepositoryError = filter_error.into();

    assert!(error.to_string().starts_with("Filter error"));
}

#[test]
fn test_error_core_conversion() {
    let error: RepositoryError = CoreError::InvalidCoordinates("a:b".to_string()).into();

    assert_eq!(
        error.to_string(),
        "Model error: Invalid maven coordinates 'a:b'"
    );
}

#[test]
fn test_error_config_conversion() {
    let error: RepositoryError = ConfigError::EmptyField {
        field: "name".to_string(),
    }
    .into();

    assert_eq!(error.to_string(), "Configuration error: name must not be empty");
}

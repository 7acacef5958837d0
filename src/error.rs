//! Error types for segment decoding and frame conversion.

use std::error::Error as StdError;
use std::fmt;
use std::result;

/// A specialized Result type for segframe operations.
pub type Result<T> = result::Result<T, Error>;

/// The error type for segframe operations.
#[derive(Debug)]
pub enum Error {
    /// The input JSON did not have the expected shape or a known field had the wrong type
    Decode(String),
    /// The decoded segment tree could not be flattened into a frame
    Transform(String),
    /// Arrow-related errors
    Arrow(String),
    /// Configuration errors
    Config(String),
    /// I/O errors
    Io(std::io::Error),
    /// Serialization errors
    Serialization(String),
}

impl Error {
    pub(crate) fn type_mismatch(field: &str) -> Self {
        Error::Decode(format!("field {}: type mismatch", field))
    }

    pub(crate) fn unexpected_response(dimension: &str) -> Self {
        Error::Transform(format!(
            "unexpected insights response while handling dimension {}",
            dimension
        ))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(msg) => write!(f, "Decode error: {}", msg),
            Error::Transform(msg) => write!(f, "Transform error: {}", msg),
            Error::Arrow(msg) => write!(f, "Arrow error: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<arrow::error::ArrowError> for Error {
    fn from(err: arrow::error::ArrowError) -> Self {
        Error::Arrow(err.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

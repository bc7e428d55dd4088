//! Emitter error taxonomy.

use std::io;

use thiserror::Error;

use super::mode::OutputMode;
use crate::response::InvalidReturn;

/// An output buffering mode outside the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid output buffering mode \"{value}\"; expected one of: {}", OutputMode::NAMES.join(", "))]
pub struct ConfigurationError {
    /// The rejected value.
    pub value: String,
}

impl ConfigurationError {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The values that would have been accepted.
    pub fn legal_values(&self) -> &'static [&'static str] {
        &OutputMode::NAMES
    }
}

/// The application callable returned something other than a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Application must return a Response (status line, header map, readable body stream); got {actual}")]
pub struct UnexpectedResponseTypeError {
    /// Runtime description of what was returned.
    pub actual: String,
}

impl From<InvalidReturn> for UnexpectedResponseTypeError {
    fn from(invalid: InvalidReturn) -> Self {
        Self {
            actual: invalid.actual().to_string(),
        }
    }
}

/// Errors surfaced by [`Emitter`](super::Emitter).
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    UnexpectedResponseType(#[from] UnexpectedResponseTypeError),

    /// Writing to the output channel failed.
    #[error("Output channel write failed: {0}")]
    Io(#[from] io::Error),
}

/// Result type for emitter operations.
pub type EmitResult<T> = Result<T, EmitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_lists_legal_values() {
        let err = ConfigurationError::new("flush");
        assert_eq!(err.legal_values(), &["prepend", "append", "clean"]);
        assert!(err.to_string().contains("\"flush\""));
    }

    #[test]
    fn unexpected_type_names_actual() {
        let err = UnexpectedResponseTypeError::from(InvalidReturn::primitive("string"));
        assert_eq!(
            err.to_string(),
            "Application must return a Response (status line, header map, readable body stream); got string"
        );
    }

    #[test]
    fn emit_error_is_transparent() {
        let err = EmitError::from(ConfigurationError::new("x"));
        assert_eq!(err.to_string(), ConfigurationError::new("x").to_string());

        let err = EmitError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(err.to_string(), "Output channel write failed: gone");
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (chunk size)
//! - Validate observability settings against what the subscriber understands
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EmitterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::EmitterConfig;

/// Largest accepted body read size.
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("output.chunk_size must be greater than 0")]
    ZeroChunkSize,

    #[error("output.chunk_size {0} exceeds maximum {max}", max = MAX_CHUNK_SIZE)]
    ChunkSizeTooLarge(usize),

    #[error("observability.log_level \"{0}\" is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("observability.log_format \"{0}\" is not one of pretty, json")]
    UnknownLogFormat(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &EmitterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let chunk_size = config.output.chunk_size;
    if chunk_size == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    } else if chunk_size > MAX_CHUNK_SIZE {
        errors.push(ValidationError::ChunkSizeTooLarge(chunk_size));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if !LOG_FORMATS.contains(&config.observability.log_format.as_str()) {
        errors.push(ValidationError::UnknownLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&EmitterConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = EmitterConfig::default();
        config.output.chunk_size = 0;
        config.observability.log_level = "loud".into();
        config.observability.log_format = "xml".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroChunkSize,
                ValidationError::UnknownLogLevel("loud".into()),
                ValidationError::UnknownLogFormat("xml".into()),
            ]
        );
    }

    #[test]
    fn rejects_oversized_chunk() {
        let mut config = EmitterConfig::default();
        config.output.chunk_size = MAX_CHUNK_SIZE + 1;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("exceeds maximum"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = EmitterConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}

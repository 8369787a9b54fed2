//! Error types for envelope construction and configuration.
//!
//! Only misuse of the API surfaces as an error. Translation misses, empty
//! payloads and unknown wrapper keys are all defined, successful outcomes.

use thiserror::Error;

/// Result type alias for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// Errors raised by the envelope layer.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// The status code is not a registered HTTP status.
    ///
    /// This is a programming error on the caller's side and is never retried.
    #[error("Invalid HTTP status code: [{0}]")]
    InvalidStatusCode(u16),

    /// A wrapper-table pattern could not be parsed.
    ///
    /// Patterns are three characters, each a digit or `x` (e.g. `"4xx"`, `"422"`).
    #[error("Invalid status pattern: {0:?}")]
    InvalidStatusPattern(String),

    /// The configuration is structurally valid but semantically wrong.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_status_display() {
        let err = EnvelopeError::InvalidStatusCode(1000);
        assert_eq!(err.to_string(), "Invalid HTTP status code: [1000]");
    }

    #[test]
    fn test_invalid_pattern_display() {
        let err = EnvelopeError::InvalidStatusPattern("4x".to_string());
        assert_eq!(err.to_string(), "Invalid status pattern: \"4x\"");
    }
}

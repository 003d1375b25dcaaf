//! Error types for reconciliation operations.
//!
//! This module defines the error types used throughout the restcfg crates.
//! All errors implement `std::error::Error` via `thiserror`.

use thiserror::Error;

/// Result type alias for reconciliation operations.
pub type RestCfgResult<T> = Result<T, RestCfgError>;

/// Errors that can occur while reconciling configuration.
#[derive(Debug, Error)]
pub enum RestCfgError {
    /// A list element is missing one of its declared identity-key fields.
    /// This is a schema/caller bug, not a device condition.
    #[error("List '{list}' element is missing identity key field '{field}'")]
    MissingKeyField {
        /// The list field whose element is malformed.
        list: String,
        /// The missing identity-key field.
        field: String,
    },

    /// Configuration validation error (bad value, missing companion field,
    /// or a semantic precondition that does not hold).
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Raw input contains a value the config model cannot represent
    /// (e.g. a floating-point number).
    #[error("Unsupported configuration value: {message}")]
    UnsupportedValue {
        /// Error message.
        message: String,
    },

    /// REST transport failure reported by the device collaborator.
    /// Propagated to the caller unmodified; requests already sent may
    /// have been applied.
    #[error("REST transport failed: {message}")]
    Transport {
        /// Error message from the transport layer.
        message: String,
    },

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl RestCfgError {
    /// Creates a missing identity-key error.
    pub fn missing_key_field(list: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingKeyField {
            list: list.into(),
            field: field.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported value error.
    pub fn unsupported_value(message: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed when the reconciliation is re-run.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RestCfgError::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RestCfgError::missing_key_field("collectors", "address");
        assert_eq!(
            err.to_string(),
            "List 'collectors' element is missing identity key field 'address'"
        );
    }

    #[test]
    fn test_invalid_config() {
        let err = RestCfgError::invalid_config("polling_interval", "out of range");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for polling_interval: out of range"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(RestCfgError::transport("connection reset").is_retryable());
        assert!(!RestCfgError::internal("bug").is_retryable());
        assert!(!RestCfgError::missing_key_field("ranges", "prefix").is_retryable());
    }
}

//! Custom error types for warikan
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::YearMonth;

/// The main error type for warikan operations
#[derive(Error, Debug)]
pub enum ShareError {
    /// Malformed or contradictory input to the share calculator
    #[error("Validation error on '{field}': {message}")]
    Validation {
        field: String,
        message: String,
    },

    /// No burden ratio is effective for a month that requires one
    #[error("No burden ratio configured for {month}")]
    ConfigurationGap { month: YearMonth },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ShareError {
    /// Create a validation error for the given input field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is a missing-ratio error
    pub fn is_configuration_gap(&self) -> bool {
        matches!(self, Self::ConfigurationGap { .. })
    }

    /// The offending field of a validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for ShareError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ShareError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for ShareError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for warikan operations
pub type ShareResult<T> = Result<T, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ShareError::validation("amount", "must not be negative");
        assert_eq!(
            err.to_string(),
            "Validation error on 'amount': must not be negative"
        );
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("amount"));
    }

    #[test]
    fn test_configuration_gap_display() {
        let err = ShareError::ConfigurationGap {
            month: YearMonth::new(2025, 3).unwrap(),
        };
        assert_eq!(err.to_string(), "No burden ratio configured for 2025-03");
        assert!(err.is_configuration_gap());
        assert!(!err.is_validation());
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_not_found_error() {
        let err = ShareError::transaction_not_found("tx-001");
        assert_eq!(err.to_string(), "Transaction not found: tx-001");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ShareError = io_err.into();
        assert!(matches!(err, ShareError::Io(_)));
    }
}

//! Domain error types
//!
//! This module defines the error hierarchy for Mercator. An export either
//! completes with a full payload or fails with exactly one of these errors;
//! third-party error types never cross the public API.

use thiserror::Error;

/// Main Mercator error type
#[derive(Debug, Error)]
pub enum MercatorError {
    /// Malformed or unsupported export request, detected before any store access
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Store connectivity or missing-relation failure during execute/count
    #[error("Data unavailable: {0}")]
    DataUnavailable(#[from] StoreError),

    /// A renderer failed to produce bytes
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The size estimate is above the refusal threshold
    #[error("Export refused: {0}")]
    TooLarge(String),

    /// The export exceeded its deadline
    #[error("Export timed out: {0}")]
    Timeout(String),

    /// The caller cancelled the export
    #[error("Export cancelled")]
    Cancelled,
}

impl MercatorError {
    /// Shorthand for a validation error with a single message
    pub fn validation(message: impl Into<String>) -> Self {
        MercatorError::Validation(vec![message.into()])
    }

    /// Returns the validation messages, if this is a validation error
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            MercatorError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Data store errors
///
/// Errors raised by a [`DataAccess`](crate::adapters::database::DataAccess)
/// implementation. These do not expose driver types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not reach the store or obtain a pooled connection
    #[error("Failed to connect to data store: {0}")]
    ConnectionFailed(String),

    /// The queried table or view does not exist
    #[error("Relation does not exist: {0}")]
    RelationMissing(String),

    /// The store rejected or failed the query
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A bind value could not be converted to the column's type
    #[error("Cannot bind parameter {index}: {message}")]
    BindFailed { index: usize, message: String },

    /// A result column has a type the decoder does not handle
    #[error("Unsupported column type '{type_name}' for column '{column}'")]
    UnsupportedColumnType { column: String, type_name: String },

    /// A row could not be mapped to the entity's record shape
    #[error("Malformed row: {0}")]
    MalformedRow(String),
}

impl From<std::io::Error> for MercatorError {
    fn from(err: std::io::Error) -> Self {
        MercatorError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MercatorError {
    fn from(err: serde_json::Error) -> Self {
        MercatorError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MercatorError {
    fn from(err: toml::de::Error) -> Self {
        MercatorError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for MercatorError {
    fn from(err: csv::Error) -> Self {
        MercatorError::Render(format!("CSV writer failed: {err}"))
    }
}

impl From<zip::result::ZipError> for MercatorError {
    fn from(err: zip::result::ZipError) -> Self {
        MercatorError::Render(format!("Spreadsheet archive failed: {err}"))
    }
}

impl From<lopdf::Error> for MercatorError {
    fn from(err: lopdf::Error) -> Self {
        MercatorError::Render(format!("PDF assembly failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_joins_messages() {
        let err = MercatorError::Validation(vec![
            "entity is required".to_string(),
            "limit must be positive".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation error: entity is required; limit must be positive"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::RelationMissing("mercados".to_string());
        let err: MercatorError = store_err.into();
        assert!(matches!(err, MercatorError::DataUnavailable(_)));
        assert!(err.to_string().contains("mercados"));
    }

    #[test]
    fn test_validation_errors_accessor() {
        let err = MercatorError::validation("bad request");
        assert_eq!(err.validation_errors(), Some(&["bad request".to_string()][..]));
        assert!(MercatorError::Cancelled.validation_errors().is_none());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: MercatorError = io_err.into();
        assert!(matches!(err, MercatorError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: MercatorError = json_err.into();
        assert!(matches!(err, MercatorError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: MercatorError = toml_err.into();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_mercator_error_implements_std_error() {
        let err = MercatorError::Render("broken".to_string());
        let _: &dyn std::error::Error = &err;
    }
}

//! Domain error types
//!
//! This module defines the error hierarchy for Ferry.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Ferry error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum FerryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Key decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Source database errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Warehouse load errors
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Key decoding errors
///
/// Every variant carries the rendered flattened path that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer than one kind/identifier pair in the path
    #[error("key path too short to hold a kind and identifier: {path}")]
    PathTooShort { path: String },

    /// Path ends with a kind and no identifier
    #[error("key is incomplete (no trailing identifier): {path}")]
    IncompleteKey { path: String },

    /// The kind slot holds an integer identifier
    #[error("kind element is not a name: {path}")]
    KindNotAName { path: String },
}

/// Source database errors
///
/// Errors raised while fetching entities from the document store.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to open a source handle
    #[error("Failed to open source for {scope}: {message}")]
    ConnectionFailed { scope: String, message: String },

    /// Query failed
    #[error("Query failed for kind {kind}: {message}")]
    QueryFailed { kind: String, message: String },

    /// A stored record could not be parsed
    #[error("Invalid record in {file} at line {line}: {message}")]
    InvalidRecord {
        file: String,
        line: usize,
        message: String,
    },

    /// Entity without a key at the top level
    #[error("Entity has no key")]
    MissingKey,
}

/// Warehouse errors
///
/// Errors raised while staging or loading records into the warehouse.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// Failed to stage records
    #[error("Failed to stage records for {table}: {message}")]
    StagingFailed { table: String, message: String },

    /// Load job rejected by the disposition rules
    #[error("Load rejected for {table}: {message}")]
    LoadRejected { table: String, message: String },

    /// Invalid table reference
    #[error("Invalid table reference: {0}")]
    InvalidTable(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for FerryError {
    fn from(err: std::io::Error) -> Self {
        FerryError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FerryError {
    fn from(err: serde_json::Error) -> Self {
        FerryError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FerryError {
    fn from(err: toml::de::Error) -> Self {
        FerryError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ferry_error_display() {
        let err = FerryError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_decode_error_names_path() {
        let err = DecodeError::PathTooShort {
            path: "[\"Order\"]".to_string(),
        };
        assert!(err.to_string().contains("[\"Order\"]"));

        let ferry_err: FerryError = err.into();
        assert!(matches!(ferry_err, FerryError::Decode(_)));
    }

    #[test]
    fn test_source_error_conversion() {
        let source_err = SourceError::QueryFailed {
            kind: "User".to_string(),
            message: "boom".to_string(),
        };
        let ferry_err: FerryError = source_err.into();
        assert!(matches!(ferry_err, FerryError::Source(_)));
        assert!(ferry_err.to_string().contains("User"));
    }

    #[test]
    fn test_warehouse_error_conversion() {
        let wh_err = WarehouseError::InvalidTable("bad".to_string());
        let ferry_err: FerryError = wh_err.into();
        assert!(matches!(ferry_err, FerryError::Warehouse(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let ferry_err: FerryError = io_err.into();
        assert!(matches!(ferry_err, FerryError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let ferry_err: FerryError = json_err.into();
        assert!(matches!(ferry_err, FerryError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let ferry_err: FerryError = toml_err.into();
        assert!(matches!(ferry_err, FerryError::Configuration(_)));
        assert!(ferry_err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_ferry_error_implements_std_error() {
        let err = FerryError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}

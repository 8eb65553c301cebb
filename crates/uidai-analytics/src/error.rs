//! Error types for uidai-analytics.
//!
//! This module defines all error types used throughout the crate. Row-level
//! data problems (unparseable dates, bad counter cells) are not errors: the
//! loader drops or defaults them and reports counts instead.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for uidai-analytics operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Dataset Errors ===
    /// Failed to open the dataset file.
    #[error("failed to open dataset at {path}: {source}")]
    DatasetOpen {
        /// Path to the dataset file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The dataset could not be read as delimited text.
    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    /// The dataset header is missing one or more required columns.
    #[error("missing required column(s): {}", missing.join(", "))]
    Schema {
        /// Names of the missing columns, in required-column order.
        missing: Vec<String>,
    },

    // === Query Errors ===
    /// A filter could not be built from the given mode and value.
    #[error("invalid filter: {message}")]
    InvalidFilter {
        /// Description of what was wrong with the filter.
        message: String,
    },

    /// A counter column name was not recognized.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },
}

/// A specialized Result type for uidai-analytics operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid filter error.
    #[must_use]
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_every_column() {
        let err = Error::Schema {
            missing: vec!["bio_age_5_17".to_string(), "bio_age_17_".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required column(s): bio_age_5_17, bio_age_17_"
        );
    }

    #[test]
    fn test_invalid_filter_display() {
        let err = Error::invalid_filter("year value 'abc' is not a number");
        assert_eq!(
            err.to_string(),
            "invalid filter: year value 'abc' is not a number"
        );
    }

    #[test]
    fn test_unknown_column_display() {
        let err = Error::UnknownColumn("age_99".to_string());
        assert_eq!(err.to_string(), "unknown column 'age_99'");
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("top_n must be greater than 0");
        assert!(err.to_string().contains("top_n"));
    }

    #[test]
    fn test_dataset_open_display() {
        let err = Error::DatasetOpen {
            path: PathBuf::from("/nonexistent/data.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/data.csv"));
        assert!(msg.contains("not found"));
    }
}

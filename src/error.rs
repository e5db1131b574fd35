//! Error types for flowsight.
//!
//! This module provides error handling following the thiserror pattern.
//! Error types are designed to be informative, actionable, and suitable for
//! both programmatic handling and user-facing display.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for flowsight operations.
#[derive(Error, Debug)]
pub enum FlowsightError {
    /// Event log record could not be parsed.
    ///
    /// The whole ingest is aborted on the first malformed record: a record
    /// with fewer than three fields, or a timestamp that matches none of the
    /// accepted formats.
    #[error("Failed to parse event log at record {record}: {message}")]
    ParseError {
        /// 1-based record number where parsing failed (excluding the header).
        record: usize,
        /// Human-readable error message with the offending field text.
        message: String,
    },

    /// CSV-level read failure (malformed quoting, unequal field counts, ...).
    #[error("CSV error: {context}")]
    CsvError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying csv error.
        #[source]
        source: csv::Error,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid argument.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the invalid argument.
        name: String,
        /// Reason why the argument is invalid.
        reason: String,
    },

    /// HTTP server failure.
    #[error("Server error: {message}")]
    ServerError {
        /// Human-readable error message.
        message: String,
    },
}

impl FlowsightError {
    /// Create a new parse error.
    #[must_use]
    pub fn parse(record: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            record,
            message: message.into(),
        }
    }

    /// Create a new CSV error with context.
    #[must_use]
    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::CsvError {
            context: context.into(),
            source,
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new serialization error with context.
    #[must_use]
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::SerializationError {
            context: context.into(),
            source,
        }
    }

    /// Create a new server error.
    #[must_use]
    pub fn server(message: impl Into<String>) -> Self {
        Self::ServerError {
            message: message.into(),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ParseError { .. } | Self::CsvError { .. } => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidConfig { .. } => 5,
            Self::ServerError { .. } => 6,
            Self::IoError { .. } => 74,
            _ => 1,
        }
    }
}

/// Result type alias for flowsight operations.
pub type Result<T> = std::result::Result<T, FlowsightError>;

impl From<std::io::Error> for FlowsightError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<csv::Error> for FlowsightError {
    fn from(err: csv::Error) -> Self {
        Self::CsvError {
            context: "CSV operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for FlowsightError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Event log parsing failed.
    pub const EXIT_PARSE_ERROR: i32 = 2;
    /// Specified file not found.
    pub const EXIT_FILE_NOT_FOUND: i32 = 3;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Server failed to start or crashed.
    pub const EXIT_SERVER_ERROR: i32 = 6;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
}

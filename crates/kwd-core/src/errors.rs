//! Error types for kwd-core.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific errors for keyword operations.
#[derive(Error, Debug)]
pub enum KeywordError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    /// No sidecar exists for a file-based dataset.
    #[error("No keywords file found for {path}")]
    RecordNotFound {
        /// Sidecar path that was looked up.
        path: PathBuf,
    },

    /// No cache record exists for a remote datasource.
    #[error("No hash found for {hash}")]
    HashNotFound {
        /// Datasource hash that was looked up.
        hash: String,
    },

    /// The record exists but does not contain the requested keyword.
    #[error("Keyword `{keyword}` not found. Available keywords: {}", format_available(.available))]
    KeywordNotFound {
        /// The missing keyword.
        keyword: String,
        /// Keywords present in the record.
        available: Vec<String>,
    },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// The underlying storage failed (I/O, SQLite, corrupt data).
    #[error("Keyword storage error at `{path}` during {operation}: {message}")]
    Storage {
        /// Sidecar or database path.
        path: PathBuf,
        /// Operation that failed.
        operation: String,
        /// Description of the failure.
        message: String,
    },

    /// Writing to the keyword database failed during an update.
    #[error("{message} (keyword database: {})", .db_path.display())]
    KeywordDb {
        /// Description of the failure.
        message: String,
        /// Path of the keyword database.
        db_path: PathBuf,
    },

    /// Writing the destination sidecar failed during a copy.
    #[error("Failed to copy keywords from {source_uri} to {}: {reason}", .destination.display())]
    CopyFailed {
        /// Source datasource.
        source_uri: String,
        /// Destination dataset path.
        destination: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    /// An argument was rejected (non-mapping input, invalid keyword name).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A stored keyword value has the wrong shape.
    #[error("Invalid value for keyword `{keyword}`: {message}")]
    InvalidKeywordValue {
        /// The keyword whose value is invalid.
        keyword: String,
        /// Description of the problem.
        message: String,
    },

    /// Configuration file is unreadable or invalid.
    #[error("Config invalid: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeywordError {
    /// Whether no keyword record exists for the dataset, on either backend.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. } | Self::HashNotFound { .. })
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "(none)".to_string()
    } else {
        available.join(", ")
    }
}

/// Result type alias for kwd-core operations.
pub type KeywordResult<T> = Result<T, KeywordError>;

//! Error types for kwd-db.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kwd-db operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur in kwd-db operations.
#[derive(Debug, Error)]
pub enum DbError {
    // ========================================================================
    // Keyword cache errors
    // ========================================================================
    /// No cache record exists for the hash.
    #[error("No hash found for {hash}")]
    RecordNotFound { hash: String },

    /// SQLite failure while running a cache operation.
    #[error("Keyword cache error at {path} during {operation}: {message}")]
    Sqlite {
        path: PathBuf,
        operation: &'static str,
        message: String,
    },

    /// A stored dictionary blob could not be decoded.
    #[error("Corrupt keyword record {hash} in {path}: {message}")]
    CorruptRecord {
        path: PathBuf,
        hash: String,
        message: String,
    },

    // ========================================================================
    // Sidecar errors
    // ========================================================================
    /// No sidecar file exists at the path.
    #[error("No keywords file found at {path}")]
    SidecarNotFound { path: PathBuf },

    /// Sidecar file I/O error.
    #[error("Keywords file I/O error at {path}: {message}")]
    SidecarIo { path: PathBuf, message: String },

    /// Sidecar file contains a malformed line.
    #[error("Keywords file parse error at {path}:{line}: {message}")]
    SidecarParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A keyword name cannot be stored.
    #[error("Invalid keyword `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },

    // ========================================================================
    // General errors
    // ========================================================================
    /// JSON error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbError {
    /// Create a SQLite error for a cache operation.
    pub fn sqlite(
        path: impl Into<PathBuf>,
        operation: &'static str,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Sqlite {
            path: path.into(),
            operation,
            message: err.to_string(),
        }
    }

    /// Create a sidecar I/O error.
    pub fn sidecar_io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SidecarIo {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error means "no stored dictionary" for either backend.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RecordNotFound { .. } | Self::SidecarNotFound { .. }
        )
    }
}

//! Adapter layer for kwd-db infrastructure.
//!
//! Converts `DbError` into `KeywordError` in one place, so the facade only
//! translates where an operation documents a different error.
//!
//! ## Architecture
//!
//! ```text
//! kwd-core facade (keyword_io)
//!        ↓
//!   db_adapter (this module) - error conversion
//!        ↓
//!     kwd-db implementations (sidecar files, SQLite keyword cache)
//! ```

use crate::errors::KeywordError;

// ============================================================================
// Error Conversion
// ============================================================================

/// Convert a kwd-db error to a kwd-core error.
pub fn from_db_error(err: kwd_db::DbError) -> KeywordError {
    use kwd_db::DbError;

    match err {
        DbError::RecordNotFound { hash } => KeywordError::HashNotFound { hash },

        DbError::SidecarNotFound { path } => KeywordError::RecordNotFound { path },

        DbError::Sqlite {
            path,
            operation,
            message,
        } => KeywordError::Storage {
            path,
            operation: operation.to_string(),
            message,
        },

        DbError::CorruptRecord {
            path,
            hash,
            message,
        } => KeywordError::Storage {
            path,
            operation: "decode".to_string(),
            message: format!("record {}: {}", hash, message),
        },

        DbError::SidecarIo { path, message } => KeywordError::Storage {
            path,
            operation: "sidecar io".to_string(),
            message,
        },

        DbError::SidecarParse {
            path,
            line,
            message,
        } => KeywordError::Storage {
            path,
            operation: "sidecar parse".to_string(),
            message: format!("line {}: {}", line, message),
        },

        DbError::InvalidKey { key, reason } => {
            KeywordError::InvalidParameter(format!("invalid keyword `{}`: {}", key, reason))
        }

        DbError::Json(json_err) => KeywordError::Json(json_err),
    }
}

/// Extension trait to convert DbResult to Result<T, KeywordError>.
pub trait IntoKeywordResult<T> {
    /// Convert a DbResult to a KeywordError result.
    fn into_keyword_result(self) -> Result<T, KeywordError>;
}

impl<T> IntoKeywordResult<T> for kwd_db::DbResult<T> {
    fn into_keyword_result(self) -> Result<T, KeywordError> {
        self.map_err(from_db_error)
    }
}

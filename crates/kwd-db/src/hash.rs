//! Datasource hashing.
//!
//! Remote datasources (database connections, web services) have no file to
//! put a sidecar next to, so their keywords are cached under a digest of the
//! connection string.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of digest bytes kept (128 bits).
const HASH_BYTES: usize = 16;

/// Length of the hex-encoded hash.
pub const HASH_HEX_LEN: usize = HASH_BYTES * 2;

/// Cache key for a remote datasource.
///
/// 32 lowercase hex characters: the first 16 bytes of the SHA-256 digest of
/// the connection string. Used only as a lookup key, never reversed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasourceHash(String);

impl DatasourceHash {
    /// Parse an externally supplied hash.
    ///
    /// Accepts exactly 32 hex characters (case-insensitive) and normalizes to
    /// lowercase. Returns `None` otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() == HASH_HEX_LEN && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Get the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatasourceHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DatasourceHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the cache key for a datasource connection string.
///
/// Pure and deterministic: the same string always yields the same hash, in
/// any process.
pub fn hash_of(connection_string: &str) -> DatasourceHash {
    let digest = Sha256::digest(connection_string.as_bytes());
    let hex: String = digest[..HASH_BYTES]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    DatasourceHash(hex)
}

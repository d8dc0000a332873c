//! # kwd-db
//!
//! Infrastructure layer for kwd - keyword persistence.
//!
//! This crate owns the two places keyword dictionaries are physically kept:
//!
//! - `.keywords` sidecar files next to file-based datasets
//! - a single SQLite index for remote datasources, keyed by a hash of the
//!   connection string
//!
//! Which one a dataset uses is decided in `kwd-core`; nothing here knows about
//! provider types.
//!
//! ## Architecture
//!
//! ```text
//! kwd-cli → kwd-core → kwd-db (sidecar files, SQLite keyword cache)
//! ```
//!
//! ## Modules
//!
//! - `hash`: Datasource hashing
//! - `cache`: SQLite keyword cache
//! - `sidecar`: Sidecar file format and IO
//!
//! ## Usage
//!
//! ```ignore
//! use kwd_db::{hash_of, KeywordCache};
//!
//! let cache = KeywordCache::new("/path/to/keywords.db");
//! let hash = hash_of("dbname='osm' host=localhost");
//! cache.put(&hash, &dict)?;
//! let stored = cache.get(&hash)?;
//! ```

use std::collections::BTreeMap;

pub mod cache;
pub mod error;
pub mod hash;
pub mod sidecar;

pub use cache::{CacheRecordSummary, KeywordCache, PutOutcome};
pub use error::{DbError, DbResult};
pub use hash::{hash_of, DatasourceHash};

/// Raw keyword dictionary as stored by either backend.
pub type KeywordMap = BTreeMap<String, String>;

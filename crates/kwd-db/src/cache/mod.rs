//! Keyword cache for remote datasources.
//!
//! Datasources without a local file (PostGIS tables, WMS layers, ...) keep
//! their keywords in a single SQLite file, one row per datasource hash.
//!
//! ## Usage
//!
//! ```ignore
//! use kwd_db::cache::KeywordCache;
//! use kwd_db::hash_of;
//!
//! let cache = KeywordCache::new("/path/to/keywords.db");
//! let hash = hash_of("dbname='osm' host=localhost");
//!
//! cache.put(&hash, &keywords)?;
//! let keywords = cache.get(&hash)?;
//! ```

mod schema;
mod store;

pub use schema::{ensure_schema, BUSY_TIMEOUT_MS};
pub use store::{CacheRecordSummary, KeywordCache, PutOutcome};

//! # kwd-core
//!
//! **Layer keyword metadata** – core library.
//!
//! Stores semantic keywords (category, subcategory, unit, title, ...) for
//! geospatial datasets. File-based datasets keep them in a `.keywords`
//! sidecar next to the data; remote datasources (databases, web services)
//! keep them in a local SQLite keyword database keyed by a hash of the
//! connection string. Callers do not need to know which.
//!
//! ## Main Types
//!
//! - [`KeywordIo`] – the facade for every keyword operation
//! - [`Keywords`] – a keyword dictionary
//! - [`DatasetRef`] / [`Dataset`] – what a dataset looks like to this crate
//! - [`KeywordError`] – domain-specific error type
//!
//! ## Modules
//!
//! - [`config`] – user configuration (`~/.kwd/config.yaml`)
//! - [`keyword_io`] – the facade
//! - [`selector`] – provider type to storage backend
//! - [`errors`] – error types
//!
//! ## Example
//!
//! ```ignore
//! use kwd_core::{Dataset, KeywordConfig, KeywordIo, Keywords};
//!
//! let config = KeywordConfig::load_default()?;
//! let io = KeywordIo::from_config(&config, None)?;
//!
//! let layer = Dataset::new("dbname='osm' host=localhost", "postgres");
//! let mut update = Keywords::new();
//! update.insert("category", "exposure");
//! let merged = io.update_keywords(&layer, &update)?;
//! ```

// Modules
pub mod config;
pub mod constants;
pub mod dataset;
pub mod db_adapter;
pub mod errors;
pub mod keyword_io;
pub mod keywords;
pub mod selector;

// Re-exports for convenience
pub use config::{DbPathSource, KeywordConfig};
pub use dataset::{Dataset, DatasetRef};
pub use errors::{KeywordError, KeywordResult};
pub use keyword_io::{KeywordIo, KeywordLocation};
pub use keywords::{Keywords, Statistics};
pub use selector::{is_file_based, StorageKind};

pub use kwd_db::{hash_of, CacheRecordSummary, DatasourceHash};

//! Keyword facade.
//!
//! [`KeywordIo`] is the single entry point for reading and writing dataset
//! keywords. Each dataset is resolved once to a [`KeywordLocation`]: a
//! sidecar file for file-based providers, or a record in the keyword cache
//! for everything else.
//!
//! ## Usage
//!
//! ```ignore
//! use kwd_core::{Dataset, KeywordIo, Keywords};
//!
//! let io = KeywordIo::new("/srv/gis/keywords.db");
//! let roads = Dataset::new("/data/roads.shp", "ogr");
//!
//! let mut keywords = Keywords::new();
//! keywords.insert("category", "exposure");
//! io.write_keywords(&roads, &keywords)?;
//!
//! assert_eq!(io.read_keyword(&roads, "category")?, "exposure");
//! ```

use std::path::{Path, PathBuf};

use kwd_db::sidecar::{read_sidecar, remove_sidecar, sidecar_path, write_sidecar};
use kwd_db::{hash_of, DatasourceHash, KeywordCache};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{validate_db_path, KeywordConfig};
use crate::constants::{STATISTICS_CLASSES_KEY, STATISTICS_TYPE_KEY};
use crate::dataset::DatasetRef;
use crate::db_adapter::IntoKeywordResult;
use crate::errors::{KeywordError, KeywordResult};
use crate::keywords::{Keywords, Statistics};
use crate::selector::StorageKind;

// ============================================================================
// KeywordLocation
// ============================================================================

/// Resolved storage location of a dataset's keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "at")]
pub enum KeywordLocation {
    /// Sidecar file path.
    Sidecar(PathBuf),
    /// Keyword cache record.
    Cache(DatasourceHash),
}

impl KeywordLocation {
    pub fn storage_kind(&self) -> StorageKind {
        match self {
            KeywordLocation::Sidecar(_) => StorageKind::FileBased,
            KeywordLocation::Cache(_) => StorageKind::Remote,
        }
    }
}

impl std::fmt::Display for KeywordLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeywordLocation::Sidecar(path) => write!(f, "sidecar {}", path.display()),
            KeywordLocation::Cache(hash) => write!(f, "cache record {}", hash),
        }
    }
}

// ============================================================================
// KeywordIo
// ============================================================================

/// Reads and writes dataset keywords on the right backend.
///
/// Holds only the keyword database location. Calls are independent; there
/// is no locking across calls.
#[derive(Debug, Clone)]
pub struct KeywordIo {
    cache: KeywordCache,
}

impl KeywordIo {
    /// Create a facade using the keyword database at `db_path`.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            cache: KeywordCache::new(db_path),
        }
    }

    /// Create a facade from configuration.
    ///
    /// `override_path` takes precedence over every configured location.
    pub fn from_config(config: &KeywordConfig, override_path: Option<&Path>) -> KeywordResult<Self> {
        let (db_path, source) = config.resolve_db_path(override_path);
        validate_db_path(&db_path)?;
        debug!("Using keyword database {} ({})", db_path.display(), source);
        Ok(Self::new(db_path))
    }

    /// Path of the keyword database used for remote datasources.
    pub fn keyword_db_path(&self) -> &Path {
        self.cache.path()
    }

    /// Point the facade at a different keyword database.
    pub fn set_keyword_db_path(&mut self, db_path: impl Into<PathBuf>) {
        self.cache = KeywordCache::new(db_path);
    }

    /// The underlying keyword cache.
    pub fn cache(&self) -> &KeywordCache {
        &self.cache
    }

    /// Resolve where `dataset` keeps its keywords.
    pub fn location_for(&self, dataset: &dyn DatasetRef) -> KeywordLocation {
        let provider = dataset.provider_type();
        match StorageKind::for_provider(provider) {
            StorageKind::FileBased => {
                let path = file_source_path(dataset.source(), provider);
                KeywordLocation::Sidecar(sidecar_path(path))
            }
            StorageKind::Remote => KeywordLocation::Cache(hash_of(dataset.source())),
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Read the full keyword dictionary of a dataset.
    ///
    /// # Errors
    ///
    /// - [`KeywordError::RecordNotFound`] if a file-based dataset has no sidecar
    /// - [`KeywordError::HashNotFound`] if a remote dataset has no cache record
    pub fn read_keywords(&self, dataset: &dyn DatasetRef) -> KeywordResult<Keywords> {
        let location = self.location_for(dataset);
        self.load(&location)
    }

    /// Read a single keyword.
    ///
    /// # Errors
    ///
    /// As [`KeywordIo::read_keywords`], plus [`KeywordError::KeywordNotFound`]
    /// if the record lacks `key`.
    pub fn read_keyword(&self, dataset: &dyn DatasetRef, key: &str) -> KeywordResult<String> {
        let keywords = self.read_keywords(dataset)?;
        match keywords.get(key) {
            Some(value) => Ok(value.to_string()),
            None => Err(KeywordError::KeywordNotFound {
                keyword: key.to_string(),
                available: keywords.keys().map(str::to_string).collect(),
            }),
        }
    }

    /// Aggregation settings of a dataset.
    ///
    /// Returns `("sum", {})` unless both `statistics_type` and
    /// `statistics_classes` are present. A dataset without any record gets the
    /// same default.
    pub fn get_statistics(&self, dataset: &dyn DatasetRef) -> KeywordResult<Statistics> {
        let keywords = match self.read_keywords(dataset) {
            Ok(keywords) => keywords,
            Err(e) if e.is_not_found() => return Ok(Statistics::default()),
            Err(e) => return Err(e),
        };

        match (
            keywords.get(STATISTICS_TYPE_KEY),
            keywords.get(STATISTICS_CLASSES_KEY),
        ) {
            (Some(kind), Some(classes)) => Ok(Statistics {
                kind: kind.to_string(),
                classes: Statistics::parse_classes(STATISTICS_CLASSES_KEY, classes)?,
            }),
            _ => Ok(Statistics::default()),
        }
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Replace the keyword dictionary of a dataset.
    pub fn write_keywords(&self, dataset: &dyn DatasetRef, keywords: &Keywords) -> KeywordResult<()> {
        let location = self.location_for(dataset);
        self.store(&location, keywords)?;
        info!("Wrote {} keywords to {}", keywords.len(), location);
        Ok(())
    }

    /// Merge `keywords` into the dataset's dictionary and return the result.
    ///
    /// A dataset without a record starts from an empty dictionary. Keys in
    /// `keywords` overwrite existing ones.
    ///
    /// # Errors
    ///
    /// A failed write to the keyword cache is reported as
    /// [`KeywordError::KeywordDb`] with the database path.
    pub fn update_keywords(
        &self,
        dataset: &dyn DatasetRef,
        keywords: &Keywords,
    ) -> KeywordResult<Keywords> {
        let location = self.location_for(dataset);
        let mut merged = self.load_or_empty(&location)?;
        merged.merge(keywords);

        match &location {
            KeywordLocation::Cache(hash) => {
                self.cache
                    .put(hash, merged.as_map())
                    .map_err(|e| KeywordError::KeywordDb {
                        message: e.to_string(),
                        db_path: self.cache.path().to_path_buf(),
                    })?;
            }
            KeywordLocation::Sidecar(_) => self.store(&location, &merged)?,
        }

        info!(
            "Updated {} keywords on {} ({} total)",
            keywords.len(),
            location,
            merged.len()
        );
        Ok(merged)
    }

    /// Write an empty dictionary. The record itself is kept.
    pub fn clear_keywords(&self, dataset: &dyn DatasetRef) -> KeywordResult<()> {
        self.write_keywords(dataset, &Keywords::new())
    }

    /// Remove one keyword. Returns whether it existed.
    ///
    /// A dataset without a record returns `false`.
    pub fn delete_keyword(&self, dataset: &dyn DatasetRef, key: &str) -> KeywordResult<bool> {
        let location = self.location_for(dataset);
        let mut keywords = match self.load(&location) {
            Ok(keywords) => keywords,
            Err(e) if e.is_not_found() => {
                debug!("No keywords stored at {}, nothing to delete", location);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        if keywords.remove(key).is_none() {
            return Ok(false);
        }

        self.store(&location, &keywords)?;
        info!("Deleted keyword `{}` from {}", key, location);
        Ok(true)
    }

    /// Copy a dataset's keywords to a sidecar next to `destination`.
    ///
    /// `extra` is overlaid on the source keywords. The result is always
    /// written as a sidecar, whatever the source backend. Returns the sidecar
    /// path.
    ///
    /// # Errors
    ///
    /// Read errors on the source propagate unchanged. A failed write is
    /// reported as [`KeywordError::CopyFailed`].
    pub fn copy_keywords(
        &self,
        source: &dyn DatasetRef,
        destination: &Path,
        extra: Option<&Keywords>,
    ) -> KeywordResult<PathBuf> {
        let mut keywords = self.read_keywords(source)?;
        if let Some(extra) = extra {
            keywords.merge(extra);
        }

        let written =
            write_sidecar(destination, keywords.as_map()).map_err(|e| KeywordError::CopyFailed {
                source_uri: source.source().to_string(),
                destination: destination.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(
            "Copied {} keywords from {} to {}",
            keywords.len(),
            source.source(),
            written.display()
        );
        Ok(written)
    }

    /// Remove the dataset's whole keyword record. Returns whether one existed.
    pub fn purge_keywords(&self, dataset: &dyn DatasetRef) -> KeywordResult<bool> {
        let location = self.location_for(dataset);
        let removed = match &location {
            KeywordLocation::Sidecar(path) => remove_sidecar(path).into_keyword_result()?,
            KeywordLocation::Cache(hash) => self.cache.delete(hash).into_keyword_result()?,
        };

        if removed {
            info!("Purged keywords at {}", location);
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------------
    // Backend dispatch
    // ------------------------------------------------------------------------

    fn load(&self, location: &KeywordLocation) -> KeywordResult<Keywords> {
        let map = match location {
            KeywordLocation::Sidecar(path) => read_sidecar(path),
            KeywordLocation::Cache(hash) => self.cache.get(hash),
        }
        .into_keyword_result()?;
        Ok(Keywords::from(map))
    }

    fn load_or_empty(&self, location: &KeywordLocation) -> KeywordResult<Keywords> {
        match self.load(location) {
            Ok(keywords) => Ok(keywords),
            Err(e) if e.is_not_found() => Ok(Keywords::new()),
            Err(e) => Err(e),
        }
    }

    fn store(&self, location: &KeywordLocation, keywords: &Keywords) -> KeywordResult<()> {
        match location {
            KeywordLocation::Sidecar(path) => {
                write_sidecar(path, keywords.as_map()).into_keyword_result()?;
            }
            KeywordLocation::Cache(hash) => {
                self.cache.put(hash, keywords.as_map()).into_keyword_result()?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Source normalisation
// ============================================================================

/// File path behind the source string of a file-based dataset.
///
/// Drops a `|layername=...` style suffix and a `file://` scheme, and for
/// delimited text the `?query` options.
fn file_source_path(source: &str, provider_type: &str) -> PathBuf {
    let mut path = source.split('|').next().unwrap_or(source);
    if let Some(stripped) = path.strip_prefix("file://") {
        path = stripped;
    }
    if provider_type == "delimitedtext" {
        path = path.split('?').next().unwrap_or(path);
    }
    PathBuf::from(path.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    #[test]
    fn test_file_source_path() {
        assert_eq!(
            file_source_path("/data/roads.shp", "ogr"),
            PathBuf::from("/data/roads.shp")
        );
        assert_eq!(
            file_source_path("/data/roads.gpkg|layername=roads", "ogr"),
            PathBuf::from("/data/roads.gpkg")
        );
        assert_eq!(
            file_source_path("file:///data/points.csv?delimiter=,&xField=x", "delimitedtext"),
            PathBuf::from("/data/points.csv")
        );
        // Query strings are only options for delimited text.
        assert_eq!(
            file_source_path("/data/odd?name.tif", "gdal"),
            PathBuf::from("/data/odd?name.tif")
        );
    }

    #[test]
    fn test_location_for() {
        let io = KeywordIo::new("/tmp/keywords.db");

        let roads = Dataset::new("/data/roads.shp", "ogr");
        assert_eq!(
            io.location_for(&roads),
            KeywordLocation::Sidecar(PathBuf::from("/data/roads.keywords"))
        );

        let uri = "dbname='osm' host=localhost";
        let buildings = Dataset::new(uri, "postgres");
        assert_eq!(
            io.location_for(&buildings),
            KeywordLocation::Cache(hash_of(uri))
        );
        assert_eq!(
            io.location_for(&buildings).storage_kind(),
            StorageKind::Remote
        );
    }

    #[test]
    fn test_set_keyword_db_path() {
        let mut io = KeywordIo::new("/tmp/a.db");
        io.set_keyword_db_path("/tmp/b.db");
        assert_eq!(io.keyword_db_path(), Path::new("/tmp/b.db"));
    }

    #[test]
    fn test_from_config_rejects_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = KeywordIo::from_config(&KeywordConfig::default(), Some(temp.path())).unwrap_err();
        assert!(matches!(err, KeywordError::InvalidConfig(_)));
    }
}

//! Sidecar keyword files for file-based datasets.
//!
//! A dataset at `/data/flood.tif` keeps its keywords in
//! `/data/flood.keywords`. Sidecars are plain text so they can be hand-edited
//! and versioned alongside the dataset.

mod format;

pub use format::{parse, render, validate_key};

use crate::error::{DbError, DbResult};
use crate::KeywordMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension used for sidecar files.
pub const SIDECAR_EXTENSION: &str = "keywords";

/// Extension of the temporary file written before the atomic rename.
const SIDECAR_TMP_EXTENSION: &str = "keywords.tmp";

/// Sidecar path for a dataset path.
///
/// The dataset extension is replaced with `.keywords` (or appended when the
/// path has none). A path that already ends in `.keywords` maps to itself.
pub fn sidecar_path(dataset_path: impl AsRef<Path>) -> PathBuf {
    dataset_path.as_ref().with_extension(SIDECAR_EXTENSION)
}

/// Read the sidecar for a dataset.
///
/// # Errors
///
/// - [`DbError::SidecarNotFound`] if no sidecar exists
/// - [`DbError::SidecarIo`] / [`DbError::SidecarParse`] on read or format errors
pub fn read_sidecar(dataset_path: impl AsRef<Path>) -> DbResult<KeywordMap> {
    let path = sidecar_path(dataset_path);
    let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DbError::SidecarNotFound { path: path.clone() },
        _ => DbError::sidecar_io(&path, format!("Failed to read: {}", e)),
    })?;

    let dict = parse(&path, &content)?;
    debug!("Read {} keywords from {}", dict.len(), path.display());
    Ok(dict)
}

/// Write the sidecar for a dataset, replacing any existing one.
///
/// The text is written to a temporary file next to the target and renamed
/// over it. Returns the sidecar path.
pub fn write_sidecar(dataset_path: impl AsRef<Path>, dict: &KeywordMap) -> DbResult<PathBuf> {
    let path = sidecar_path(dataset_path);
    let content = render(dict)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                DbError::sidecar_io(parent, format!("Failed to create directory: {}", e))
            })?;
        }
    }

    let temp_file = path.with_extension(SIDECAR_TMP_EXTENSION);
    fs::write(&temp_file, content.as_bytes()).map_err(|e| {
        DbError::sidecar_io(&temp_file, format!("Failed to write temp file: {}", e))
    })?;

    if let Err(e) = fs::rename(&temp_file, &path) {
        let _ = fs::remove_file(&temp_file);
        return Err(DbError::sidecar_io(
            &path,
            format!("Failed to rename temp file: {}", e),
        ));
    }

    debug!("Wrote {} keywords to {}", dict.len(), path.display());
    Ok(path)
}

/// Remove the sidecar for a dataset. Returns whether a file was removed.
pub fn remove_sidecar(dataset_path: impl AsRef<Path>) -> DbResult<bool> {
    let path = sidecar_path(dataset_path);
    match fs::remove_file(&path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DbError::sidecar_io(
            &path,
            format!("Failed to remove: {}", e),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path("/tmp/out.shp"),
            PathBuf::from("/tmp/out.keywords")
        );
        assert_eq!(sidecar_path("/tmp/out"), PathBuf::from("/tmp/out.keywords"));
        assert_eq!(
            sidecar_path("/tmp/out.keywords"),
            PathBuf::from("/tmp/out.keywords")
        );
        assert_eq!(
            sidecar_path("data/dem.tar.gz"),
            PathBuf::from("data/dem.tar.keywords")
        );
    }

    #[test]
    fn test_read_missing() {
        let temp = TempDir::new().unwrap();
        let err = read_sidecar(temp.path().join("nothing.shp")).unwrap_err();
        assert!(matches!(err, DbError::SidecarNotFound { .. }));
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let dataset = temp.path().join("roads.shp");
        let mut dict = KeywordMap::new();
        dict.insert("category".to_string(), "exposure".to_string());
        dict.insert("subcategory".to_string(), "road".to_string());

        let written = write_sidecar(&dataset, &dict).unwrap();
        assert_eq!(written, temp.path().join("roads.keywords"));
        assert!(!temp.path().join("roads.keywords.tmp").exists());
        assert_eq!(read_sidecar(&dataset).unwrap(), dict);
    }

    #[test]
    fn test_write_overwrites_wholesale() {
        let temp = TempDir::new().unwrap();
        let dataset = temp.path().join("roads.shp");
        let mut first = KeywordMap::new();
        first.insert("a".to_string(), "1".to_string());
        write_sidecar(&dataset, &first).unwrap();

        let mut second = KeywordMap::new();
        second.insert("b".to_string(), "2".to_string());
        write_sidecar(&dataset, &second).unwrap();

        assert_eq!(read_sidecar(&dataset).unwrap(), second);
    }

    #[test]
    fn test_write_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let dataset = temp.path().join("out").join("impact.tif");
        write_sidecar(&dataset, &KeywordMap::new()).unwrap();
        assert!(temp.path().join("out").join("impact.keywords").exists());
        assert!(read_sidecar(&dataset).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_key_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let dataset = temp.path().join("roads.shp");
        let mut dict = KeywordMap::new();
        dict.insert("bad:key".to_string(), "v".to_string());

        assert!(matches!(
            write_sidecar(&dataset, &dict).unwrap_err(),
            DbError::InvalidKey { .. }
        ));
        assert!(!sidecar_path(&dataset).exists());
    }

    #[test]
    fn test_remove() {
        let temp = TempDir::new().unwrap();
        let dataset = temp.path().join("roads.shp");
        assert!(!remove_sidecar(&dataset).unwrap());
        write_sidecar(&dataset, &KeywordMap::new()).unwrap();
        assert!(remove_sidecar(&dataset).unwrap());
        assert!(!sidecar_path(&dataset).exists());
    }
}

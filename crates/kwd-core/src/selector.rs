//! Backend selection by provider type.
//!
//! File-based providers keep keywords in a sidecar next to the dataset;
//! everything else goes to the keyword cache.

use serde::Serialize;

/// Provider types whose datasets are plain files.
const FILE_BASED_PROVIDERS: &[&str] = &["ogr", "gdal", "delimitedtext"];

/// Provider types known to be remote. Unknown providers are treated the same
/// way; the list exists for documentation and tests.
const REMOTE_PROVIDERS: &[&str] = &["postgres", "wms", "spatialite", "gpx"];

/// Where a dataset's keywords are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageKind {
    /// Sidecar file next to the dataset.
    FileBased,
    /// Record in the keyword cache.
    Remote,
}

impl StorageKind {
    /// Resolve the storage kind for a provider type.
    ///
    /// Matching is exact and case-sensitive. Unknown provider types are
    /// remote.
    pub fn for_provider(provider_type: &str) -> Self {
        if FILE_BASED_PROVIDERS.contains(&provider_type) {
            StorageKind::FileBased
        } else {
            if !REMOTE_PROVIDERS.contains(&provider_type) {
                tracing::debug!(
                    "Unknown provider type `{}`, using the keyword cache",
                    provider_type
                );
            }
            StorageKind::Remote
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::FileBased => "file-based",
            StorageKind::Remote => "remote",
        }
    }
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether datasets of `provider_type` store keywords in sidecar files.
pub fn is_file_based(provider_type: &str) -> bool {
    StorageKind::for_provider(provider_type) == StorageKind::FileBased
}

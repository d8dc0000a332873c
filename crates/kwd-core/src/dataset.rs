//! Dataset references.
//!
//! The keyword library does not open datasets. Callers describe a dataset by
//! its source string and the provider type of the driver that opened it.

use serde::{Deserialize, Serialize};

/// A dataset whose keywords can be stored.
pub trait DatasetRef {
    /// File path or connection string of the datasource.
    fn source(&self) -> &str;

    /// Provider type, e.g. `ogr`, `gdal` or `postgres`.
    fn provider_type(&self) -> &str;
}

/// Plain dataset reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// File path or connection string.
    pub source: String,

    /// Provider type.
    pub provider_type: String,
}

impl Dataset {
    /// Create a dataset reference.
    pub fn new(source: impl Into<String>, provider_type: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            provider_type: provider_type.into(),
        }
    }
}

impl DatasetRef for Dataset {
    fn source(&self) -> &str {
        &self.source
    }

    fn provider_type(&self) -> &str {
        &self.provider_type
    }
}

impl<T: DatasetRef + ?Sized> DatasetRef for &T {
    fn source(&self) -> &str {
        (**self).source()
    }

    fn provider_type(&self) -> &str {
        (**self).provider_type()
    }
}

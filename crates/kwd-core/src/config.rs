//! Configuration for kwd.
//!
//! User-level configuration lives in `~/.kwd/config.yaml`:
//!
//! ```yaml
//! keywordDbPath: /srv/gis/keywords.db
//! ```
//!
//! Every field is optional; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_FILENAME, DEFAULT_DB_FILENAME, ENV_KEYWORD_DB_PATH, KWD_HOME_DIR};
use crate::errors::{KeywordError, KeywordResult};

// ============================================================================
// DbPathSource
// ============================================================================

/// Where the effective keyword database path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DbPathSource {
    /// Explicit override from the caller (CLI `--db`).
    Override,
    /// The `KWD_KEYWORD_DB_PATH` environment variable.
    Environment,
    /// `keywordDbPath` in the config file.
    ConfigFile,
    /// Built-in default.
    Default,
}

impl std::fmt::Display for DbPathSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DbPathSource::Override => "override",
            DbPathSource::Environment => "environment",
            DbPathSource::ConfigFile => "config file",
            DbPathSource::Default => "default",
        };
        f.write_str(s)
    }
}

// ============================================================================
// KeywordConfig
// ============================================================================

/// User-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordConfig {
    /// Location of the keyword database for remote datasources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_db_path: Option<PathBuf>,
}

impl KeywordConfig {
    /// Load the configuration from the default location (`~/.kwd/config.yaml`).
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::InvalidConfig`] if the file exists but cannot be
    /// read, parsed or validated.
    pub fn load_default() -> KeywordResult<Self> {
        match Self::default_path() {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("Could not determine home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load the configuration from a specific path.
    ///
    /// If the file does not exist, returns the default configuration.
    pub fn from_path(path: &Path) -> KeywordResult<Self> {
        if !path.exists() {
            tracing::debug!("Config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            KeywordError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            KeywordError::InvalidConfig(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        let warnings = config.validate()?;
        for warning in warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// Get the default config directory (`~/.kwd`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(KWD_HOME_DIR))
    }

    /// Get the default config file path (`~/.kwd/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        Self::default_dir().map(|d| d.join(CONFIG_FILENAME))
    }

    /// Default keyword database location.
    ///
    /// `keywords.db` next to the running executable; `~/.kwd/keywords.db` if
    /// the executable location cannot be determined.
    pub fn default_db_path() -> PathBuf {
        let install_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        match install_dir.or_else(Self::default_dir) {
            Some(dir) => dir.join(DEFAULT_DB_FILENAME),
            None => PathBuf::from(DEFAULT_DB_FILENAME),
        }
    }

    /// Resolve the keyword database path.
    ///
    /// Precedence: `override_path`, then `KWD_KEYWORD_DB_PATH`, then
    /// `keywordDbPath`, then [`KeywordConfig::default_db_path`].
    pub fn resolve_db_path(&self, override_path: Option<&Path>) -> (PathBuf, DbPathSource) {
        self.resolve_db_path_with(override_path, std::env::var_os(ENV_KEYWORD_DB_PATH))
    }

    fn resolve_db_path_with(
        &self,
        override_path: Option<&Path>,
        env_value: Option<OsString>,
    ) -> (PathBuf, DbPathSource) {
        if let Some(path) = override_path {
            return (path.to_path_buf(), DbPathSource::Override);
        }
        if let Some(value) = env_value.filter(|v| !v.is_empty()) {
            return (PathBuf::from(value), DbPathSource::Environment);
        }
        if let Some(path) = &self.keyword_db_path {
            return (path.clone(), DbPathSource::ConfigFile);
        }
        (Self::default_db_path(), DbPathSource::Default)
    }

    /// Validate the configuration.
    ///
    /// Returns non-fatal warnings; fatal problems are returned as
    /// [`KeywordError::InvalidConfig`].
    pub fn validate(&self) -> KeywordResult<Vec<String>> {
        let mut warnings = Vec::new();

        if let Some(path) = &self.keyword_db_path {
            validate_db_path(path)?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    warnings.push(format!(
                        "keywordDbPath directory {} does not exist and will be created",
                        parent.display()
                    ));
                }
            }
        }

        Ok(warnings)
    }
}

/// Check that `path` can be used as a keyword database file.
pub fn validate_db_path(path: &Path) -> KeywordResult<()> {
    if path.as_os_str().is_empty() {
        return Err(KeywordError::InvalidConfig(
            "keyword database path must not be empty".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(KeywordError::InvalidConfig(format!(
            "keyword database path {} is a directory",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = KeywordConfig::default();
        assert!(config.keyword_db_path.is_none());
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = "keywordDbPath: /srv/gis/keywords.db\n";
        let config: KeywordConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.keyword_db_path,
            Some(PathBuf::from("/srv/gis/keywords.db"))
        );
    }

    #[test]
    fn test_config_missing_file() {
        let temp = TempDir::new().unwrap();
        let config = KeywordConfig::from_path(&temp.path().join("nonexistent.yaml")).unwrap();
        assert_eq!(config, KeywordConfig::default());
    }

    #[test]
    fn test_config_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(
            KeywordConfig::from_path(&path).unwrap(),
            KeywordConfig::default()
        );
    }

    #[test]
    fn test_config_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "keywordDbPath: [unterminated\n").unwrap();
        let err = KeywordConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, KeywordError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_directory() {
        let temp = TempDir::new().unwrap();
        let config = KeywordConfig {
            keyword_db_path: Some(temp.path().to_path_buf()),
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            KeywordError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        let config = KeywordConfig {
            keyword_db_path: Some(PathBuf::new()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_warns_on_missing_parent() {
        let temp = TempDir::new().unwrap();
        let config = KeywordConfig {
            keyword_db_path: Some(temp.path().join("missing").join("keywords.db")),
        };
        assert_eq!(config.validate().unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_precedence() {
        let config = KeywordConfig {
            keyword_db_path: Some(PathBuf::from("/from/config.db")),
        };
        let env = Some(OsString::from("/from/env.db"));

        let (path, source) =
            config.resolve_db_path_with(Some(Path::new("/from/flag.db")), env.clone());
        assert_eq!(path, PathBuf::from("/from/flag.db"));
        assert_eq!(source, DbPathSource::Override);

        let (path, source) = config.resolve_db_path_with(None, env);
        assert_eq!(path, PathBuf::from("/from/env.db"));
        assert_eq!(source, DbPathSource::Environment);

        let (path, source) = config.resolve_db_path_with(None, Some(OsString::new()));
        assert_eq!(path, PathBuf::from("/from/config.db"));
        assert_eq!(source, DbPathSource::ConfigFile);

        let (path, source) = KeywordConfig::default().resolve_db_path_with(None, None);
        assert_eq!(source, DbPathSource::Default);
        assert!(path.ends_with(DEFAULT_DB_FILENAME));
    }
}

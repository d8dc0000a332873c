//! Shared test utilities for kwd-cli integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Get a Command for the kwd binary.
///
/// # Panics
///
/// Panics if the kwd binary cannot be found. This should not happen
/// in a properly configured test environment.
#[allow(deprecated)]
pub fn kwd_cmd() -> Command {
    Command::cargo_bin("kwd").expect("kwd binary should exist")
}

/// Isolated environment: a scratch directory holding the keyword database
/// and datasets, with no config file and no environment overrides.
pub struct KwdEnv {
    pub temp: TempDir,
}

#[allow(dead_code)]
impl KwdEnv {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.root().join("keywords.db")
    }

    /// Path of a dataset inside the scratch directory.
    pub fn dataset(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// A kwd command wired to this environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = kwd_cmd();
        cmd.env_remove("KWD_KEYWORD_DB_PATH")
            .env_remove("KWD_VERBOSE")
            .env_remove("KWD_COLOR")
            .env_remove("KWD_CONFIG")
            .arg("--db")
            .arg(self.db_path())
            .arg("--config")
            .arg(self.root().join("none.yaml"))
            .arg("--color")
            .arg("never");
        cmd
    }
}

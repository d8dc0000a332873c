//! Common constants used throughout kwd-core.

// ============================================================================
// Paths
// ============================================================================

/// The name of the user-level kwd directory.
///
/// Located at `~/.kwd/` on Unix-like systems.
pub const KWD_HOME_DIR: &str = ".kwd";

/// The name of the configuration file inside [`KWD_HOME_DIR`].
pub const CONFIG_FILENAME: &str = "config.yaml";

/// File name of the keyword database when no path is configured.
pub const DEFAULT_DB_FILENAME: &str = "keywords.db";

// ============================================================================
// Environment
// ============================================================================

/// Environment variable overriding the keyword database path.
pub const ENV_KEYWORD_DB_PATH: &str = "KWD_KEYWORD_DB_PATH";

// ============================================================================
// Statistics Keywords
// ============================================================================

/// Keyword holding the aggregation type of an impact layer.
pub const STATISTICS_TYPE_KEY: &str = "statistics_type";

/// Keyword holding the aggregation classes, as a JSON object.
pub const STATISTICS_CLASSES_KEY: &str = "statistics_classes";

/// Aggregation type reported when a dataset declares none.
pub const DEFAULT_STATISTICS_TYPE: &str = "sum";

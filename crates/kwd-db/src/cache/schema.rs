//! SQLite schema for the keyword cache.

use rusqlite::Connection;
use tracing::trace;

/// Default busy timeout applied to every cache connection.
pub const BUSY_TIMEOUT_MS: u64 = 5_000;

const CREATE_KEYWORD_TABLE: &str = "CREATE TABLE IF NOT EXISTS keyword (
    hash VARCHAR(32) PRIMARY KEY,
    dict TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT ''
)";

/// Create the keyword table if it does not exist yet.
///
/// Idempotent; run on every connection open.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    trace!("Ensuring keyword cache schema");
    conn.execute_batch(CREATE_KEYWORD_TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            ["keyword"],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(table_count(&conn), 1);
    }

    #[test]
    fn test_ensure_schema_keeps_existing_rows() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO keyword (hash, dict, updated_at) VALUES ('h', '{}', '')",
            [],
        )
        .unwrap();
        ensure_schema(&conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM keyword", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}

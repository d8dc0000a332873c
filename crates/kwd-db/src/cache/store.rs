//! SQLite-backed keyword cache.
//!
//! Each operation opens its own connection, ensures the schema, runs, and
//! closes the connection before returning, so a failed write never leaves
//! the index file locked.

use super::schema::{ensure_schema, BUSY_TIMEOUT_MS};
use crate::error::{DbError, DbResult};
use crate::hash::DatasourceHash;
use crate::KeywordMap;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace, warn};

// ============================================================================
// Types
// ============================================================================

/// Result of a [`KeywordCache::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// A new record was created for the hash.
    Inserted,
    /// An existing record was replaced.
    Updated,
}

/// Summary of one cache record, for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecordSummary {
    /// Datasource hash.
    pub hash: String,

    /// Number of keywords, or `None` if the stored dictionary is unreadable.
    pub keyword_count: Option<usize>,

    /// Time of the last write, if recorded.
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// KeywordCache
// ============================================================================

/// Hash-indexed keyword dictionaries in a single SQLite file.
///
/// Holds only the database path. Operations are individually atomic; two
/// writers to the same hash resolve as last-writer-wins.
#[derive(Debug, Clone)]
pub struct KeywordCache {
    db_path: PathBuf,
}

impl KeywordCache {
    /// Create a cache handle for the database at `db_path`.
    ///
    /// Nothing is opened until the first operation. The file does not need
    /// to exist.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Path to the SQLite database.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Create the backing file and keyword table if absent.
    pub fn ensure_schema(&self) -> DbResult<()> {
        self.with_connection("ensure_schema", |_| Ok(()))
    }

    /// Get the dictionary stored for `hash`.
    ///
    /// # Errors
    ///
    /// - [`DbError::RecordNotFound`] if no record exists
    /// - [`DbError::CorruptRecord`] if the stored dictionary cannot be decoded
    pub fn get(&self, hash: &DatasourceHash) -> DbResult<KeywordMap> {
        trace!("Reading keyword record {}", hash);
        let blob = self.with_connection("get", |conn| {
            conn.query_row(
                "SELECT dict FROM keyword WHERE hash = ?1",
                params![hash.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| self.sqlite_err("get", e))
        })?;

        let blob = blob.ok_or_else(|| DbError::RecordNotFound {
            hash: hash.to_string(),
        })?;
        decode_dict(&self.db_path, hash.as_str(), &blob)
    }

    /// Check whether a record exists for `hash`.
    pub fn contains(&self, hash: &DatasourceHash) -> DbResult<bool> {
        self.with_connection("contains", |conn| {
            conn.query_row(
                "SELECT 1 FROM keyword WHERE hash = ?1",
                params![hash.as_str()],
                |_| Ok(()),
            )
            .optional()
            .map(|row| row.is_some())
            .map_err(|e| self.sqlite_err("contains", e))
        })
    }

    /// Store `dict` for `hash`, replacing any existing dictionary wholesale.
    ///
    /// Runs in a single immediate transaction: concurrent writers queue on
    /// the busy timeout and the last one wins. On failure the transaction is
    /// rolled back and the store is left unchanged.
    pub fn put(&self, hash: &DatasourceHash, dict: &KeywordMap) -> DbResult<PutOutcome> {
        let blob = serde_json::to_string(dict)?;
        let now = Utc::now().to_rfc3339();

        let outcome = self.with_connection("put", |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| self.sqlite_err("put", e))?;

            let written = write_record(&tx, hash.as_str(), &blob, &now);
            match written {
                Ok(outcome) => {
                    tx.commit().map_err(|e| self.sqlite_err("put", e))?;
                    Ok(outcome)
                }
                Err(e) => {
                    if let Err(rb) = tx.rollback() {
                        warn!("Rollback failed for keyword record {}: {}", hash, rb);
                    }
                    Err(self.sqlite_err("put", e))
                }
            }
        })?;

        debug!(
            "Wrote {} keywords for {} ({:?}) to {}",
            dict.len(),
            hash,
            outcome,
            self.db_path.display()
        );
        Ok(outcome)
    }

    /// Remove the record for `hash`.
    ///
    /// Returns whether a record was removed. Deleting an absent hash is not
    /// an error.
    pub fn delete(&self, hash: &DatasourceHash) -> DbResult<bool> {
        let removed = self.with_connection("delete", |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| self.sqlite_err("delete", e))?;

            let deleted = tx.execute("DELETE FROM keyword WHERE hash = ?1", params![hash.as_str()]);
            match deleted {
                Ok(rows) => {
                    tx.commit().map_err(|e| self.sqlite_err("delete", e))?;
                    Ok(rows > 0)
                }
                Err(e) => {
                    if let Err(rb) = tx.rollback() {
                        warn!("Rollback failed for keyword record {}: {}", hash, rb);
                    }
                    Err(self.sqlite_err("delete", e))
                }
            }
        })?;

        debug!("Delete keyword record {}: removed={}", hash, removed);
        Ok(removed)
    }

    /// List all records, ordered by hash.
    pub fn list(&self) -> DbResult<Vec<CacheRecordSummary>> {
        let rows = self.with_connection("list", |conn| {
            let mut stmt = conn
                .prepare("SELECT hash, dict, updated_at FROM keyword ORDER BY hash")
                .map_err(|e| self.sqlite_err("list", e))?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .map_err(|e| self.sqlite_err("list", e))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| self.sqlite_err("list", e))?;
            Ok(rows)
        })?;

        let summaries = rows
            .into_iter()
            .map(|(hash, blob, updated_at)| {
                let keyword_count = match decode_dict(&self.db_path, &hash, &blob) {
                    Ok(dict) => Some(dict.len()),
                    Err(e) => {
                        warn!("Skipping keyword count for {}: {}", hash, e);
                        None
                    }
                };
                CacheRecordSummary {
                    hash,
                    keyword_count,
                    updated_at: DateTime::parse_from_rfc3339(&updated_at)
                        .ok()
                        .map(|t| t.with_timezone(&Utc)),
                }
            })
            .collect();

        Ok(summaries)
    }

    /// Number of records in the cache.
    pub fn count(&self) -> DbResult<u64> {
        self.with_connection("count", |conn| {
            conn.query_row("SELECT COUNT(*) FROM keyword", [], |row| row.get::<_, i64>(0))
                .map(|n| n as u64)
                .map_err(|e| self.sqlite_err("count", e))
        })
    }

    // ------------------------------------------------------------------------
    // Connection handling
    // ------------------------------------------------------------------------

    /// Open a connection, run `f`, and close the connection on every path.
    fn with_connection<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut Connection) -> DbResult<T>,
    ) -> DbResult<T> {
        let mut conn = self.open(operation)?;
        let result = f(&mut conn);

        if let Err((_conn, e)) = conn.close() {
            warn!(
                "Failed to close keyword cache {} after {}: {}",
                self.db_path.display(),
                operation,
                e
            );
        }

        result
    }

    fn open(&self, operation: &'static str) -> DbResult<Connection> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating keyword cache directory {}", parent.display());
                std::fs::create_dir_all(parent)
                    .map_err(|e| DbError::sqlite(&self.db_path, operation, e))?;
            }
        }

        let conn =
            Connection::open(&self.db_path).map_err(|e| self.sqlite_err(operation, e))?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))
            .map_err(|e| self.sqlite_err(operation, e))?;
        ensure_schema(&conn).map_err(|e| self.sqlite_err(operation, e))?;
        Ok(conn)
    }

    fn sqlite_err(&self, operation: &'static str, err: rusqlite::Error) -> DbError {
        DbError::sqlite(&self.db_path, operation, err)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Update the record for `hash`, or insert it when absent.
fn write_record(
    conn: &Connection,
    hash: &str,
    blob: &str,
    updated_at: &str,
) -> rusqlite::Result<PutOutcome> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM keyword WHERE hash = ?1",
            params![hash],
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    if exists {
        conn.execute(
            "UPDATE keyword SET dict = ?1, updated_at = ?2 WHERE hash = ?3",
            params![blob, updated_at, hash],
        )?;
        Ok(PutOutcome::Updated)
    } else {
        conn.execute(
            "INSERT INTO keyword (hash, dict, updated_at) VALUES (?1, ?2, ?3)",
            params![hash, blob, updated_at],
        )?;
        Ok(PutOutcome::Inserted)
    }
}

fn decode_dict(db_path: &Path, hash: &str, blob: &str) -> DbResult<KeywordMap> {
    serde_json::from_str(blob).map_err(|e| DbError::CorruptRecord {
        path: db_path.to_path_buf(),
        hash: hash.to_string(),
        message: e.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_of;
    use tempfile::TempDir;

    fn cache_in(temp: &TempDir) -> KeywordCache {
        KeywordCache::new(temp.path().join("keywords.db"))
    }

    fn dict(pairs: &[(&str, &str)]) -> KeywordMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_get_missing_record() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        let err = cache.get(&hash_of("dbname=osm")).unwrap_err();
        assert!(matches!(err, DbError::RecordNotFound { .. }));
    }

    #[test]
    fn test_put_then_get() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        let hash = hash_of("dbname=osm");
        let keywords = dict(&[("category", "exposure"), ("subcategory", "structure")]);

        assert_eq!(cache.put(&hash, &keywords).unwrap(), PutOutcome::Inserted);
        assert_eq!(cache.get(&hash).unwrap(), keywords);
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        let hash = hash_of("dbname=osm");

        cache.put(&hash, &dict(&[("a", "1"), ("b", "2")])).unwrap();
        let outcome = cache.put(&hash, &dict(&[("c", "3")])).unwrap();

        assert_eq!(outcome, PutOutcome::Updated);
        assert_eq!(cache.get(&hash).unwrap(), dict(&[("c", "3")]));
        assert_eq!(cache.count().unwrap(), 1);
    }

    #[test]
    fn test_empty_dict_is_a_record() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        let hash = hash_of("dbname=empty");

        cache.put(&hash, &KeywordMap::new()).unwrap();
        assert!(cache.contains(&hash).unwrap());
        assert!(cache.get(&hash).unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        let hash = hash_of("dbname=osm");

        assert!(!cache.delete(&hash).unwrap());
        cache.put(&hash, &dict(&[("a", "1")])).unwrap();
        assert!(cache.delete(&hash).unwrap());
        assert!(!cache.contains(&hash).unwrap());
        assert!(!cache.delete(&hash).unwrap());
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let temp = TempDir::new().unwrap();
        let cache = KeywordCache::new(temp.path().join("nested").join("dir").join("kw.db"));
        cache.ensure_schema().unwrap();
        assert!(cache.path().exists());
        assert_eq!(cache.count().unwrap(), 0);
    }

    #[test]
    fn test_list_orders_by_hash_and_flags_corrupt_rows() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        let h1 = hash_of("one");
        let h2 = hash_of("two");
        cache.put(&h1, &dict(&[("a", "1")])).unwrap();
        cache.put(&h2, &dict(&[("a", "1"), ("b", "2")])).unwrap();

        let conn = Connection::open(cache.path()).unwrap();
        conn.execute(
            "INSERT INTO keyword (hash, dict, updated_at) VALUES ('zz', 'not json', '')",
            [],
        )
        .unwrap();
        drop(conn);

        let list = cache.list().unwrap();
        assert_eq!(list.len(), 3);
        let hashes: Vec<&str> = list.iter().map(|r| r.hash.as_str()).collect();
        let mut sorted = hashes.clone();
        sorted.sort();
        assert_eq!(hashes, sorted);

        let corrupt = list.iter().find(|r| r.hash == "zz").unwrap();
        assert_eq!(corrupt.keyword_count, None);
        assert!(corrupt.updated_at.is_none());

        let two = list.iter().find(|r| r.hash == h2.as_str()).unwrap();
        assert_eq!(two.keyword_count, Some(2));
        assert!(two.updated_at.is_some());
    }

    #[test]
    fn test_corrupt_record_on_get() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        cache.ensure_schema().unwrap();
        let hash = hash_of("broken");

        let conn = Connection::open(cache.path()).unwrap();
        conn.execute(
            "INSERT INTO keyword (hash, dict, updated_at) VALUES (?1, '[1,2', '')",
            params![hash.as_str()],
        )
        .unwrap();
        drop(conn);

        let err = cache.get(&hash).unwrap_err();
        match err {
            DbError::CorruptRecord { path, hash: bad, .. } => {
                assert_eq!(path, cache.path());
                assert_eq!(bad, hash.as_str());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unopenable_path_is_sqlite_error() {
        let temp = TempDir::new().unwrap();
        // A directory cannot be opened as a database file.
        let cache = KeywordCache::new(temp.path());
        let err = cache.get(&hash_of("x")).unwrap_err();
        assert!(matches!(err, DbError::Sqlite { .. }));
    }
}

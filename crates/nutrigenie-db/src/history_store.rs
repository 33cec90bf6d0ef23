use chrono::{DateTime, NaiveDateTime, Utc};
use nutrigenie_common::{Error, Result};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::migrations::MIGRATIONS;

const DEFAULT_RECENT_LIMIT: usize = 20;
const MAX_RECENT_LIMIT: usize = 500;

/// One saved (query, response) pair. Records are append-only; there is
/// no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: i64,
    pub query: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Persistent log of generation calls, shown to the user as search history.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl HistoryStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        info!("opening history store at {}", db_path.display());
        let conn = Connection::open(db_path)
            .map_err(|e| Error::Database(format!("failed to open database: {e}")))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| Error::Database(format!("failed to set pragmas: {e}")))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Database(format!("failed to open in-memory database: {e}")))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.connection()?;
        for migration in MIGRATIONS {
            conn.execute_batch(migration.sql).map_err(|e| {
                Error::Database(format!("migration {} failed: {e}", migration.name))
            })?;
        }
        Ok(())
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Database("history database lock poisoned".into()))
    }

    /// Append one record. Returns the assigned row id.
    pub fn record(&self, query: &str, response: &str) -> Result<i64> {
        let created_at = Utc::now().to_rfc3339();
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO searches (query, response, created_at) VALUES (?, ?, ?)",
            params![query, response, created_at],
        )
        .map_err(|e| Error::Database(format!("failed to insert search record: {e}")))?;

        Ok(conn.last_insert_rowid())
    }

    /// All records, newest first. Ids break ties within the same timestamp,
    /// so the order is total.
    pub fn list_all(&self) -> Result<Vec<SearchRecord>> {
        self.query_records(None)
    }

    /// The most recent `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<SearchRecord>> {
        let limit = if limit == 0 {
            DEFAULT_RECENT_LIMIT
        } else {
            limit.min(MAX_RECENT_LIMIT)
        };
        self.query_records(Some(limit))
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.connection()?;
        let count: i64 = conn
            .query_row("SELECT count(*) FROM searches", [], |row| row.get(0))
            .map_err(|e| Error::Database(format!("failed to count search records: {e}")))?;
        Ok(count as usize)
    }

    fn query_records(&self, limit: Option<usize>) -> Result<Vec<SearchRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, query, response, created_at
                 FROM searches
                 ORDER BY datetime(created_at) DESC, id DESC
                 LIMIT coalesce(?1, -1)",
            )
            .map_err(|e| Error::Database(format!("failed to prepare history query: {e}")))?;

        let rows = stmt
            .query_map(params![limit.map(|l| l as i64)], row_to_record)
            .map_err(|e| Error::Database(format!("failed to execute history query: {e}")))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Database(format!("failed to collect history rows: {e}")))
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchRecord> {
    let created_at_str: String = row.get(3)?;
    let created_at = parse_timestamp(&created_at_str).map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::other(e.to_string())))
    })?;

    Ok(SearchRecord {
        id: row.get(0)?,
        query: row.get(1)?,
        response: row.get(2)?,
        created_at,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    // datetime('now') default writes this format
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(Error::Database(format!("invalid timestamp format: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::HistoryStore;

    #[test]
    fn in_memory_creates_searches_table() {
        let store = HistoryStore::in_memory().expect("failed to create in-memory history store");
        let conn = store.connection().expect("lock should not be poisoned");
        let exists: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='searches'",
                [],
                |row| row.get(0),
            )
            .expect("failed to query sqlite_master");

        assert_eq!(exists, 1);
    }

    #[test]
    fn open_is_idempotent_for_schema() {
        let store = HistoryStore::in_memory().expect("failed to create in-memory history store");
        store
            .run_migrations()
            .expect("re-running migrations should succeed");
    }

    #[test]
    fn record_assigns_increasing_ids() {
        let store = HistoryStore::in_memory().expect("failed to create in-memory history store");
        let first = store
            .record("diabetes", "eat greens")
            .expect("record should succeed");
        let second = store
            .record("obesity", "walk daily")
            .expect("record should succeed");

        assert!(second > first);
    }

    #[test]
    fn list_all_returns_every_record_newest_first() {
        let store = HistoryStore::in_memory().expect("failed to create in-memory history store");
        for i in 0..5 {
            store
                .record(&format!("query-{i}"), &format!("response-{i}"))
                .expect("record should succeed");
        }

        let records = store.list_all().expect("list_all should succeed");
        assert_eq!(records.len(), 5);

        // Newest first: ids strictly decreasing, timestamps non-increasing.
        for pair in records.windows(2) {
            assert!(pair[0].id > pair[1].id);
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        assert_eq!(records[0].query, "query-4");
        assert_eq!(records[4].query, "query-0");
    }

    #[test]
    fn recent_limits_and_keeps_order() {
        let store = HistoryStore::in_memory().expect("failed to create in-memory history store");
        for i in 0..10 {
            store
                .record(&format!("query-{i}"), "response")
                .expect("record should succeed");
        }

        let records = store.recent(3).expect("recent should succeed");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].query, "query-9");
        assert_eq!(records[2].query, "query-7");
    }

    #[test]
    fn recent_zero_falls_back_to_default_limit() {
        let store = HistoryStore::in_memory().expect("failed to create in-memory history store");
        store
            .record("only-one", "response")
            .expect("record should succeed");

        let records = store.recent(0).expect("recent should succeed");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn count_tracks_inserts() {
        let store = HistoryStore::in_memory().expect("failed to create in-memory history store");
        assert_eq!(store.count().expect("count should succeed"), 0);

        store
            .record("diabetes", "eat greens")
            .expect("record should succeed");
        assert_eq!(store.count().expect("count should succeed"), 1);
    }

    #[test]
    fn sqlite_default_timestamp_format_parses() {
        let store = HistoryStore::in_memory().expect("failed to create in-memory history store");
        {
            let conn = store.connection().expect("lock should not be poisoned");
            conn.execute(
                "INSERT INTO searches (query, response) VALUES ('legacy', 'row')",
                [],
            )
            .expect("insert with default timestamp should succeed");
        }

        let records = store.list_all().expect("list_all should succeed");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query, "legacy");
    }
}

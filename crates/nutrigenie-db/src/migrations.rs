/// Migration system for tracking and applying database schema changes.
///
/// Each migration has a version number and a SQL statement.
/// Statements must be idempotent; they run on every open.
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const SEARCHES_SCHEMA_V1: Migration = Migration {
    version: 1,
    name: "searches_schema",
    sql: "CREATE TABLE IF NOT EXISTS searches (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              query TEXT NOT NULL,
              response TEXT NOT NULL,
              created_at TEXT NOT NULL DEFAULT (datetime('now'))
          );

          CREATE INDEX IF NOT EXISTS idx_searches_created_at
              ON searches(created_at);",
};

pub const MIGRATIONS: &[Migration] = &[SEARCHES_SCHEMA_V1];

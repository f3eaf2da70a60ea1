//! Schema migrations for the history database.
//!
//! Applied versions are tracked in `schema_version`. Each step runs inside its
//! own transaction together with the row that records it, so a failed step
//! leaves the previous version intact.

use log::info;
use rusqlite::{params, Connection};

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "History log",
        sql: "CREATE TABLE IF NOT EXISTS history (
                  id INTEGER PRIMARY KEY AUTOINCREMENT,
                  url TEXT NOT NULL,
                  title TEXT NOT NULL DEFAULT '',
                  visit_time INTEGER NOT NULL
              );
              CREATE INDEX IF NOT EXISTS idx_history_url ON history(url);
              CREATE INDEX IF NOT EXISTS idx_history_visit_time ON history(visit_time);",
    },
    Migration {
        version: 2,
        description: "Saved tab session",
        sql: "CREATE TABLE IF NOT EXISTS sessions (
                  id TEXT PRIMARY KEY,
                  tabs TEXT NOT NULL,
                  active_index INTEGER NOT NULL,
                  saved_at INTEGER NOT NULL
              );",
    },
];

/// Highest applied version, 0 on a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Applies every pending migration. Safe to call on every open.
pub fn run_all(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);
    for step in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.transaction()?;
        tx.execute_batch(step.sql)?;
        tx.execute(
            "INSERT INTO schema_version (version, applied_at, description) \
             VALUES (?1, strftime('%s', 'now'), ?2)",
            params![step.version, step.description],
        )?;
        tx.commit()?;
        info!("history schema migrated to v{} ({})", step.version, step.description);
    }
    Ok(())
}

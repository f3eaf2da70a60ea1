use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::Connection;

use super::migrations;

/// The history database: one `rusqlite::Connection` with the schema brought
/// up to date on open.
pub struct Database {
    conn: Connection,
    /// `None` for in-memory databases.
    path: Option<PathBuf>,
}

impl Database {
    /// Opens or creates the database file at `path` and migrates it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        migrations::run_all(&mut conn)?;
        debug!("history database open at {}", path.display());
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// A private database that lives as long as this value.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let mut conn = Connection::open_in_memory()?;
        migrations::run_all(&mut conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Folds the write-ahead log back into the main file.
    pub fn checkpoint(&self) -> Result<(), rusqlite::Error> {
        if !self.is_persistent() {
            return Ok(());
        }
        self.conn
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
    }
}

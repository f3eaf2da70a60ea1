//! History store for Driftwood.
//!
//! An append-only log of visits in SQLite via `rusqlite`. Every visit is its
//! own row; `cleanup` prunes rows that fell out of the retention window.

use chrono::NaiveDate;
use log::debug;
use rusqlite::{params, Connection};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::errors::HistoryError;
use crate::types::history::HistoryEntry;

/// Default retention window in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

const SECONDS_PER_DAY: i64 = 86_400;

/// History store borrowing a SQLite connection.
pub struct HistoryManager<'a> {
    conn: &'a Connection,
    retention_days: u32,
}

impl<'a> HistoryManager<'a> {
    /// Creates a `HistoryManager` over the given connection with the default retention.
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Returns the current UNIX timestamp in seconds.
    pub fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
        Ok(HistoryEntry {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            visit_time: row.get(3)?,
        })
    }

    fn query_entries<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_entry)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Appends a visit stamped with the current time. Returns the row id.
    pub fn record_visit(&mut self, url: &str, title: &str) -> Result<i64, HistoryError> {
        self.record_visit_at(url, title, Self::now())
    }

    /// Appends a visit with an explicit timestamp.
    pub fn record_visit_at(
        &mut self,
        url: &str,
        title: &str,
        visit_time: i64,
    ) -> Result<i64, HistoryError> {
        self.conn.execute(
            "INSERT INTO history (url, title, visit_time) VALUES (?1, ?2, ?3)",
            params![url, title, visit_time],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Lists entries newest first, optionally capped at `limit`.
    pub fn list_history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>, HistoryError> {
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        self.query_entries(
            "SELECT id, url, title, visit_time FROM history \
             ORDER BY visit_time DESC, id DESC LIMIT ?1",
            params![limit],
        )
    }

    /// Lists the entries of one UTC day given as `YYYY-MM-DD`.
    pub fn list_history_for_date(&self, date: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| HistoryError::InvalidDate(date.to_string()))?;
        let start = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| HistoryError::InvalidDate(date.to_string()))?
            .and_utc()
            .timestamp();
        let end = start + SECONDS_PER_DAY;
        self.query_entries(
            "SELECT id, url, title, visit_time FROM history \
             WHERE visit_time >= ?1 AND visit_time < ?2 \
             ORDER BY visit_time DESC, id DESC",
            params![start, end],
        )
    }

    /// Searches entries whose title or URL contains `query` literally.
    pub fn search_history(&self, query: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let pattern = format!("%{}%", escape_like(query));
        self.query_entries(
            "SELECT id, url, title, visit_time FROM history \
             WHERE title LIKE ?1 ESCAPE '\\' OR url LIKE ?1 ESCAPE '\\' \
             ORDER BY visit_time DESC, id DESC",
            params![pattern],
        )
    }

    /// Replaces the title of an already recorded visit.
    pub fn update_title(&mut self, id: i64, title: &str) -> Result<(), HistoryError> {
        let affected = self.conn.execute(
            "UPDATE history SET title = ?1 WHERE id = ?2",
            params![title, id],
        )?;
        if affected == 0 {
            return Err(HistoryError::NotFound(id));
        }
        Ok(())
    }

    /// Deletes a single entry by id.
    pub fn delete_entry(&mut self, id: i64) -> Result<(), HistoryError> {
        let affected = self
            .conn
            .execute("DELETE FROM history WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(HistoryError::NotFound(id));
        }
        Ok(())
    }

    /// Clears all history entries.
    pub fn clear_all(&mut self) -> Result<(), HistoryError> {
        self.conn.execute("DELETE FROM history", [])?;
        Ok(())
    }

    pub fn count(&self) -> Result<i64, HistoryError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?)
    }

    /// Removes entries older than the retention window. Returns how many went.
    pub fn cleanup(&mut self) -> Result<usize, HistoryError> {
        self.cleanup_at(Self::now())
    }

    /// Removes every entry strictly older than `now - retention`; an entry
    /// exactly at the cutoff stays.
    pub fn cleanup_at(&mut self, now: i64) -> Result<usize, HistoryError> {
        let cutoff = now - i64::from(self.retention_days) * SECONDS_PER_DAY;
        let removed = self
            .conn
            .execute("DELETE FROM history WHERE visit_time < ?1", params![cutoff])?;
        debug!("history cleanup removed {} entries older than {}", removed, cutoff);
        Ok(removed)
    }
}

/// Escapes LIKE wildcards so they match themselves under `ESCAPE '\'`.
fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

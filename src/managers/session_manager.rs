//! Saved tab session.
//!
//! At most one session is kept: saving replaces whatever was stored before.
//! The tab list is a JSON array in the `sessions` table of the history
//! database.

use log::debug;
use rusqlite::{params, Connection};

use crate::types::errors::SessionError;
use crate::types::session::{SessionData, SessionTab};

pub struct SessionManager<'a> {
    conn: &'a Connection,
}

impl<'a> SessionManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Replaces the stored session with `session`.
    pub fn save_session(&mut self, session: &SessionData) -> Result<(), SessionError> {
        let tabs = serde_json::to_string(&session.tabs)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM sessions", [])?;
        tx.execute(
            "INSERT INTO sessions (id, tabs, active_index, saved_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                uuid::Uuid::new_v4().to_string(),
                tabs,
                session.active_index as i64,
                session.saved_at
            ],
        )?;
        tx.commit()?;
        debug!("saved session with {} tab(s)", session.tabs.len());
        Ok(())
    }

    /// The stored session, or `None` when nothing was saved.
    pub fn restore_session(&self) -> Result<Option<SessionData>, SessionError> {
        let row = self.conn.query_row(
            "SELECT tabs, active_index, saved_at FROM sessions ORDER BY saved_at DESC LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        );
        let (tabs, active_index, saved_at) = match row {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let tabs: Vec<SessionTab> = serde_json::from_str(&tabs)?;
        Ok(Some(SessionData {
            tabs,
            active_index: usize::try_from(active_index).unwrap_or(0),
            saved_at,
        }))
    }

    pub fn has_session(&self) -> Result<bool, SessionError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    pub fn clear_session(&mut self) -> Result<(), SessionError> {
        self.conn.execute("DELETE FROM sessions", [])?;
        Ok(())
    }
}

//! SQLite storage for browsing history and the saved tab session.
//!
//! ```no_run
//! use driftwood::database::Database;
//! use driftwood::managers::history_manager::HistoryManager;
//!
//! let db = Database::open("history.db").expect("failed to open history");
//! let mut history = HistoryManager::new(db.connection());
//! history.record_visit("https://example.com", "Example").expect("insert");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;

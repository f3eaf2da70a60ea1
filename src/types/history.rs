use serde::{Deserialize, Serialize};

/// Represents a single recorded visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub visit_time: i64,
}

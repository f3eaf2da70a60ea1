use serde::{Deserialize, Serialize};

/// The tab strip as it stood at shutdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionData {
    pub tabs: Vec<SessionTab>,
    /// Position of the active tab in `tabs`.
    pub active_index: usize,
    pub saved_at: i64,
}

/// One tab as stored in a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionTab {
    pub url: String,
    pub title: String,
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle identifying one tab for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Engine-reported loading state of a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Error(String),
}

/// A browser tab owning one engine view.
#[derive(Debug)]
pub struct Tab<V> {
    pub id: TabId,
    pub view: V,
    pub url: String,
    pub title: String,
    pub load_state: LoadState,
    pub created_at: i64,
}

/// Serializable view of a tab for the chrome tab strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabSummary {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub loading: bool,
    pub active: bool,
}

use thiserror::Error;

// === TabError ===

/// Errors related to tab management operations.
#[derive(Debug, Error, PartialEq)]
pub enum TabError {
    /// Tab with the given ID was not found.
    #[error("Tab not found: {0}")]
    NotFound(String),
    /// The provided tab index is out of bounds.
    #[error("Invalid tab index: {0}")]
    InvalidIndex(usize),
}

// === HistoryError ===

/// Errors related to browsing history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// History entry with the given ID was not found.
    #[error("History entry not found: {0}")]
    NotFound(i64),
    /// A date filter could not be parsed.
    #[error("Invalid history date: {0}")]
    InvalidDate(String),
    /// Database operation failed.
    #[error("History database error: {0}")]
    Database(#[from] rusqlite::Error),
}

// === SessionError ===

/// Errors related to saving and restoring the tab session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Database operation failed.
    #[error("Session database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// The stored tab list could not be encoded or decoded.
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred reading or writing the settings file.
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to serialize settings.
    #[error("Settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The specified settings key does not exist.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided value is invalid for the setting.
    #[error("Invalid settings value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

// === ThemeError ===

/// Errors related to theme management.
#[derive(Debug, Error, PartialEq)]
pub enum ThemeError {
    /// The provided color string is not a valid hex color.
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

// === ShellError ===

/// Errors surfaced while dispatching chrome commands.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Tab(#[from] TabError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The chrome sent a message that is not a known command.
    #[error("Malformed chrome message: {0}")]
    MalformedMessage(String),
}

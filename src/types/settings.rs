use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::NEW_TAB_URL;

/// Allowed zoom levels, in percent.
pub const ZOOM_RANGE: RangeInclusive<u32> = 25..=200;
/// Allowed auto-reload intervals, in seconds.
pub const AUTO_RELOAD_RANGE: RangeInclusive<u32> = 5..=3600;
/// Allowed history retention windows, in days.
pub const RETENTION_RANGE: RangeInclusive<u32> = 1..=3650;

/// Flat browser settings. Every field is one persisted key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub theme: ThemeMode,
    pub accent_color: String,
    pub homepage: String,
    pub search_engine: SearchEngine,
    pub user_agent: UserAgent,
    pub block_trackers: bool,
    pub block_ads: bool,
    pub block_third_party_cookies: bool,
    pub block_fingerprinting: bool,
    pub do_not_track: bool,
    pub https_only: bool,
    pub disable_webrtc: bool,
    pub zoom_level: u32,
    pub auto_reload: bool,
    pub auto_reload_interval: u32,
    pub history_retention_days: u32,
    /// Reopen the previous session's tabs on start.
    pub restore_tabs: bool,
    pub setup_completed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            accent_color: "#3b82f6".to_string(),
            homepage: NEW_TAB_URL.to_string(),
            search_engine: SearchEngine::DuckDuckGo,
            user_agent: UserAgent::Engine,
            block_trackers: true,
            block_ads: true,
            block_third_party_cookies: true,
            block_fingerprinting: true,
            do_not_track: true,
            https_only: false,
            disable_webrtc: false,
            zoom_level: 100,
            auto_reload: false,
            auto_reload_interval: 30,
            history_retention_days: 90,
            restore_tabs: true,
            setup_completed: false,
        }
    }
}

impl Settings {
    /// Returns `(key, reason)` for every field whose value is out of its allowed range.
    pub fn violations(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if !ZOOM_RANGE.contains(&self.zoom_level) {
            out.push(("zoom_level", format!("{} is outside 25..=200", self.zoom_level)));
        }
        if !AUTO_RELOAD_RANGE.contains(&self.auto_reload_interval) {
            out.push((
                "auto_reload_interval",
                format!("{} is outside 5..=3600", self.auto_reload_interval),
            ));
        }
        if !RETENTION_RANGE.contains(&self.history_retention_days) {
            out.push((
                "history_retention_days",
                format!("{} is outside 1..=3650", self.history_retention_days),
            ));
        }
        if !is_valid_hex_color(&self.accent_color) {
            out.push(("accent_color", format!("'{}' is not a hex color", self.accent_color)));
        }
        out
    }

    /// Homepage to open, falling back to the new tab page when unset.
    pub fn effective_homepage(&self) -> &str {
        let trimmed = self.homepage.trim();
        if trimmed.is_empty() {
            NEW_TAB_URL
        } else {
            trimmed
        }
    }
}

/// Validates a hex color string (e.g. "#3b82f6" or "#fff").
pub fn is_valid_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
    System,
}

/// Search engine used for address-bar queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    DuckDuckGo,
    Google,
    Bing,
    Brave,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 4] = [
        SearchEngine::DuckDuckGo,
        SearchEngine::Google,
        SearchEngine::Bing,
        SearchEngine::Brave,
    ];

    /// Prefix onto which the encoded query is appended.
    pub fn query_prefix(self) -> &'static str {
        match self {
            SearchEngine::DuckDuckGo => "https://duckduckgo.com/?q=",
            SearchEngine::Google => "https://www.google.com/search?q=",
            SearchEngine::Bing => "https://www.bing.com/search?q=",
            SearchEngine::Brave => "https://search.brave.com/search?q=",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchEngine::DuckDuckGo => "DuckDuckGo",
            SearchEngine::Google => "Google",
            SearchEngine::Bing => "Bing",
            SearchEngine::Brave => "Brave Search",
        }
    }

    /// Key used in the settings file.
    pub fn key(self) -> &'static str {
        match self {
            SearchEngine::DuckDuckGo => "duckduckgo",
            SearchEngine::Google => "google",
            SearchEngine::Bing => "bing",
            SearchEngine::Brave => "brave",
        }
    }
}

/// User-agent string presented by engine views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserAgent {
    /// Whatever the embedded engine reports by default.
    Engine,
    Chrome,
    Firefox,
    Safari,
}

impl UserAgent {
    pub fn header_value(self) -> Option<&'static str> {
        match self {
            UserAgent::Engine => None,
            UserAgent::Chrome => Some(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
            ),
            UserAgent::Firefox => {
                Some("Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0")
            }
            UserAgent::Safari => Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
            ),
        }
    }
}

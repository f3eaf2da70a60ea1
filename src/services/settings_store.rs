// Driftwood Settings Store
// Loads settings once at startup, mutates them in memory, and writes the full
// snapshot back only on an explicit save. Settings are stored as a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::types::errors::SettingsError;
use crate::types::settings::{SearchEngine, Settings, ThemeMode, UserAgent};

/// File name inside the config directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// What `load` found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file yet; defaults are in effect.
    Missing,
    /// File read. `repaired` lists keys whose stored value was rejected and
    /// replaced by the default.
    Loaded { repaired: Vec<String> },
    /// File unreadable or not a JSON object; defaults are in effect.
    Corrupt(String),
}

/// Boolean privacy toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyFlag {
    BlockTrackers,
    BlockAds,
    BlockThirdPartyCookies,
    BlockFingerprinting,
    DoNotTrack,
    HttpsOnly,
    DisableWebRtc,
}

/// Owns the process-wide [`Settings`] and the file they persist to.
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Creates a store bound to `path`, holding defaults until `load`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            settings: Settings::default(),
        }
    }

    /// Store bound to `settings.json` under `config_dir`.
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file, falling back to defaults for anything missing or bad.
    ///
    /// Never fails: an unreadable file means defaults, a rejected value means
    /// the default for that key alone.
    pub fn load(&mut self) -> LoadOutcome {
        self.settings = Settings::default();

        if !self.path.exists() {
            info!("no settings at {}, using defaults", self.path.display());
            return LoadOutcome::Missing;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to read {}: {}, using defaults", self.path.display(), e);
                return LoadOutcome::Corrupt(e.to_string());
            }
        };

        let stored = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!("{} is not a JSON object, using defaults", self.path.display());
                return LoadOutcome::Corrupt("not a JSON object".to_string());
            }
            Err(e) => {
                warn!("failed to parse {}: {}, using defaults", self.path.display(), e);
                return LoadOutcome::Corrupt(e.to_string());
            }
        };

        let (settings, repaired) = merge_with_defaults(&stored);
        for key in &repaired {
            warn!("settings key '{}' had an invalid value, reset to default", key);
        }
        self.settings = settings;
        LoadOutcome::Loaded { repaired }
    }

    /// Writes the full snapshot, creating parent directories as needed.
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.path, json)?;
        debug!("settings saved to {}", self.path.display());
        Ok(())
    }

    /// Restores defaults in memory. Call `save` to persist them.
    pub fn reset(&mut self) {
        self.settings = Settings::default();
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Sets one key from a JSON value, as sent by the settings page.
    pub fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }
        let mut map = to_map(&self.settings)?;
        if !map.contains_key(key) {
            return Err(SettingsError::InvalidKey(key.to_string()));
        }
        map.insert(key.to_string(), value);
        let candidate: Settings =
            serde_json::from_value(Value::Object(map)).map_err(|e| SettingsError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        if let Some((_, reason)) = candidate.violations().into_iter().find(|(k, _)| *k == key) {
            return Err(SettingsError::InvalidValue {
                key: key.to_string(),
                reason,
            });
        }
        self.settings = candidate;
        Ok(())
    }

    // Typed setters.

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.settings.theme = theme;
    }

    pub fn set_search_engine(&mut self, engine: SearchEngine) {
        self.settings.search_engine = engine;
    }

    pub fn set_user_agent(&mut self, user_agent: UserAgent) {
        self.settings.user_agent = user_agent;
    }

    pub fn set_homepage(&mut self, homepage: &str) {
        self.settings.homepage = homepage.trim().to_string();
    }

    pub fn set_accent_color(&mut self, color: &str) -> Result<(), SettingsError> {
        self.set_value("accent_color", Value::from(color))
    }

    pub fn set_zoom_level(&mut self, percent: u32) -> Result<(), SettingsError> {
        self.set_value("zoom_level", Value::from(percent))
    }

    pub fn set_auto_reload(&mut self, enabled: bool) {
        self.settings.auto_reload = enabled;
    }

    pub fn set_auto_reload_interval(&mut self, seconds: u32) -> Result<(), SettingsError> {
        self.set_value("auto_reload_interval", Value::from(seconds))
    }

    pub fn set_history_retention_days(&mut self, days: u32) -> Result<(), SettingsError> {
        self.set_value("history_retention_days", Value::from(days))
    }

    pub fn set_restore_tabs(&mut self, enabled: bool) {
        self.settings.restore_tabs = enabled;
    }

    pub fn set_setup_completed(&mut self, done: bool) {
        self.settings.setup_completed = done;
    }

    pub fn set_privacy(&mut self, flag: PrivacyFlag, enabled: bool) {
        let s = &mut self.settings;
        let slot = match flag {
            PrivacyFlag::BlockTrackers => &mut s.block_trackers,
            PrivacyFlag::BlockAds => &mut s.block_ads,
            PrivacyFlag::BlockThirdPartyCookies => &mut s.block_third_party_cookies,
            PrivacyFlag::BlockFingerprinting => &mut s.block_fingerprinting,
            PrivacyFlag::DoNotTrack => &mut s.do_not_track,
            PrivacyFlag::HttpsOnly => &mut s.https_only,
            PrivacyFlag::DisableWebRtc => &mut s.disable_webrtc,
        };
        *slot = enabled;
    }
}

fn to_map(settings: &Settings) -> Result<Map<String, Value>, SettingsError> {
    match serde_json::to_value(settings)? {
        Value::Object(map) => Ok(map),
        _ => Err(SettingsError::InvalidKey("settings are not an object".to_string())),
    }
}

/// Overlays stored keys onto the defaults one at a time, keeping each stored
/// value only if it deserializes and passes range checks.
fn merge_with_defaults(stored: &Map<String, Value>) -> (Settings, Vec<String>) {
    let defaults = Settings::default();
    let mut merged = match to_map(&defaults) {
        Ok(map) => map,
        Err(_) => return (defaults, Vec::new()),
    };
    let mut repaired = Vec::new();

    for (key, value) in stored {
        if !merged.contains_key(key) {
            debug!("ignoring unknown settings key '{}'", key);
            continue;
        }
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value.clone());
        let accepted = serde_json::from_value::<Settings>(Value::Object(candidate.clone()))
            .map(|s| !s.violations().iter().any(|(k, _)| k == key))
            .unwrap_or(false);
        if accepted {
            merged = candidate;
        } else {
            repaired.push(key.clone());
        }
    }

    let settings = serde_json::from_value(Value::Object(merged)).unwrap_or(defaults);
    (settings, repaired)
}

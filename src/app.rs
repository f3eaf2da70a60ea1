//! App Core for Driftwood.
//!
//! Central struct holding the process-wide services. Constructed once at
//! startup and handed by ownership to the [`Shell`](crate::shell::Shell).

use log::{error, info, warn};

use crate::database::connection::Database;
use crate::managers::history_manager::HistoryManager;
use crate::managers::session_manager::SessionManager;
use crate::platform::ProfilePaths;
use crate::resources::{self, Stylesheet};
use crate::services::settings_store::{LoadOutcome, SettingsStore};
use crate::services::theme_engine::{ThemeEngine, ThemeEngineTrait};
use crate::types::errors::HistoryError;
use crate::types::settings::{Settings, ThemeMode};

/// Central application struct holding all services.
///
/// `HistoryManager` is created on demand via [`App::history`] because it
/// borrows the connection with a lifetime.
pub struct App {
    pub paths: ProfilePaths,
    pub settings: SettingsStore,
    pub db: Database,
    pub theme: ThemeEngine,
    pub stylesheet: Stylesheet,
    /// True until the first window has shown the setup page.
    pub first_run: bool,
    theme_override: Option<ThemeMode>,
}

impl App {
    /// Loads settings, opens the history database and resolves the theme.
    ///
    /// A history database that cannot be opened is replaced by an in-memory
    /// one for this process. Only failing to create that one is an error.
    pub fn new(paths: ProfilePaths, theme_override: Option<ThemeMode>) -> Result<Self, HistoryError> {
        if let Err(e) = paths.ensure() {
            warn!("could not create profile directories: {}", e);
        }

        let mut settings = SettingsStore::in_dir(&paths.config_dir);
        match settings.load() {
            LoadOutcome::Missing => info!("first launch, settings start at defaults"),
            LoadOutcome::Loaded { repaired } if !repaired.is_empty() => {
                info!("settings loaded, {} key(s) reset to defaults", repaired.len())
            }
            LoadOutcome::Loaded { .. } => info!("settings loaded from {}", settings.path().display()),
            LoadOutcome::Corrupt(reason) => warn!("settings file unusable ({}), using defaults", reason),
        }
        let first_run = !settings.get().setup_completed;

        let db_path = paths.history_db();
        let db = match Database::open(&db_path) {
            Ok(db) => db,
            Err(e) => {
                error!(
                    "failed to open history at {}: {}; history will not persist",
                    db_path.display(),
                    e
                );
                Database::open_in_memory()?
            }
        };

        let current = settings.get();
        let theme = ThemeEngine::new(theme_override.unwrap_or(current.theme), &current.accent_color);
        let stylesheet = resources::load_stylesheet(&resources::search_dirs(&paths.data_dir));

        Ok(Self {
            paths,
            settings,
            db,
            theme,
            stylesheet,
            first_run,
            theme_override,
        })
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn theme_override(&self) -> Option<ThemeMode> {
        self.theme_override
    }

    /// History store honouring the configured retention window.
    pub fn history(&self) -> HistoryManager<'_> {
        HistoryManager::new(self.db.connection())
            .with_retention_days(self.settings.get().history_retention_days)
    }

    /// Store for the tab session kept across restarts.
    pub fn session(&self) -> SessionManager<'_> {
        SessionManager::new(self.db.connection())
    }

    /// Prunes expired history. Failures are logged and reported as zero.
    pub fn cleanup_history(&self) -> usize {
        match self.history().cleanup() {
            Ok(removed) => {
                if removed > 0 {
                    info!("removed {} expired history entries", removed);
                }
                removed
            }
            Err(e) => {
                error!("history cleanup failed: {}", e);
                0
            }
        }
    }

    /// Re-reads theme mode and accent from settings; `--theme` still wins.
    pub fn apply_theme(&mut self) {
        let settings = self.settings.get();
        self.theme
            .set_theme(self.theme_override.unwrap_or(settings.theme));
        if let Err(e) = self.theme.set_accent_color(&settings.accent_color) {
            warn!("{}", e);
        }
    }

    /// Flushes the write-ahead log so the history file is self-contained.
    pub fn shutdown(&self) {
        if let Err(e) = self.db.checkpoint() {
            warn!("history checkpoint failed: {}", e);
        }
        info!("shutting down");
    }
}

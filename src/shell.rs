//! Window/chrome shell.
//!
//! Toolkit-independent half of the browser window: turns chrome commands
//! into tab and settings operations, and engine callbacks into tab state and
//! history. The wry front end (or the console front end) only moves messages
//! in and out.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::App;
use crate::engine::{EngineEvent, EngineView, ViewFactory};
use crate::managers::history_manager::HistoryManager;
use crate::managers::tab_manager::TabManager;
use crate::services::internal_pages::{self, InternalPage, PageContext};
use crate::services::url_classifier;
use crate::types::errors::{HistoryError, ShellError};
use crate::types::history::HistoryEntry;
use crate::types::session::{SessionData, SessionTab};
use crate::types::tab::{LoadState, TabId, TabSummary};
use crate::{INTERNAL_PREFIX, NEW_TAB_URL};

/// Most entries the history page shows.
pub const HISTORY_PAGE_LIMIT: usize = 500;

/// A message from the chrome or a built-in page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ChromeCommand {
    /// Text typed into the address bar.
    Navigate { input: String },
    Back,
    Forward,
    Reload,
    Stop,
    Home,
    NewTab,
    /// Closes `id`, or the active tab when absent.
    CloseTab {
        #[serde(default)]
        id: Option<TabId>,
    },
    SwitchTab { id: TabId },
    OpenSettings,
    OpenHistory,
    SetSetting { key: String, value: Value },
    SaveSettings,
    ResetSettings,
    CompleteSetup,
    ClearHistory,
    /// The chrome finished loading and wants a state push.
    Ready,
}

impl ChromeCommand {
    pub fn parse(raw: &str) -> Result<Self, ShellError> {
        serde_json::from_str(raw).map_err(|e| ShellError::MalformedMessage(e.to_string()))
    }
}

/// Snapshot the chrome renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromeState {
    pub tabs: Vec<TabSummary>,
    pub active_id: Option<TabId>,
    /// Address bar text; empty on the new tab page.
    pub address: String,
    pub title: String,
    pub loading: bool,
    pub error: Option<String>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// `:root{...}` rule with the current theme variables.
    pub theme_css: String,
}

/// Rewrites `http://` to `https://` when `https_only` is on.
pub fn enforce_https(url: &str, https_only: bool) -> String {
    match url.strip_prefix("http://") {
        Some(rest) if https_only => format!("https://{}", rest),
        _ => url.to_string(),
    }
}

/// Only web pages go into history.
fn is_recordable(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Engines may report built-in pages under their own URL form.
fn canonical_event(event: EngineEvent) -> EngineEvent {
    match event {
        EngineEvent::LoadStarted { url } => EngineEvent::LoadStarted {
            url: internal_pages::canonicalize(&url),
        },
        EngineEvent::LoadFinished { url } => EngineEvent::LoadFinished {
            url: internal_pages::canonicalize(&url),
        },
        EngineEvent::LoadFailed { url, reason } => EngineEvent::LoadFailed {
            url: internal_pages::canonicalize(&url),
            reason,
        },
        other => other,
    }
}

pub struct Shell<F: ViewFactory> {
    app: App,
    tabs: TabManager<F>,
    /// History row written for each tab's current page, so a title that
    /// arrives after the load finished can still be applied.
    recorded: HashMap<TabId, i64>,
    reload_period: Option<Duration>,
    reload_anchor: Instant,
}

impl<F: ViewFactory> Shell<F> {
    pub fn new(app: App, mut factory: F) -> Self {
        factory.apply_settings(app.settings());
        let reload_period = Self::auto_reload_period(&app);
        Self {
            app,
            tabs: TabManager::new(factory),
            recorded: HashMap::new(),
            reload_period,
            reload_anchor: Instant::now(),
        }
    }

    fn auto_reload_period(app: &App) -> Option<Duration> {
        let settings = app.settings();
        settings
            .auto_reload
            .then(|| Duration::from_secs(u64::from(settings.auto_reload_interval)))
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn tabs(&self) -> &TabManager<F> {
        &self.tabs
    }

    pub fn views_mut(&mut self) -> impl Iterator<Item = (bool, &mut F::View)> {
        self.tabs.views_mut()
    }

    /// Window creation: prunes history and opens the first tabs. First run
    /// shows the setup page; later runs reopen the saved session when
    /// `restore_tabs` is on, and the homepage otherwise. Returns the active
    /// tab.
    pub fn open_window(&mut self) -> TabId {
        self.app.cleanup_history();
        if self.app.first_run {
            self.app.first_run = false;
            self.app.settings.set_setup_completed(true);
            if let Err(e) = self.app.settings.save() {
                warn!("could not record setup completion: {}", e);
            }
            info!("first run, showing setup");
            return self.open_tab(&InternalPage::Setup.url());
        }
        if self.app.settings().restore_tabs {
            if let Some(id) = self.restore_session() {
                return id;
            }
        }
        let url = self.home_url();
        self.open_tab(&url)
    }

    /// Reopens the saved tabs. `None` when there was nothing to restore.
    fn restore_session(&mut self) -> Option<TabId> {
        let session = match self.app.session().restore_session() {
            Ok(Some(session)) if !session.tabs.is_empty() => session,
            Ok(_) => return None,
            Err(e) => {
                warn!("could not restore session: {}", e);
                return None;
            }
        };
        let ids: Vec<TabId> = session
            .tabs
            .iter()
            .map(|tab| self.tabs.create_tab(&tab.url))
            .collect();
        let active = ids[session.active_index.min(ids.len() - 1)].clone();
        // Every id was just created.
        let _ = self.tabs.switch_tab(&active);
        self.sync_visibility();
        info!("restored {} tab(s) from last session", ids.len());
        Some(active)
    }

    /// The open tabs as a session. The setup page is left out.
    pub fn snapshot_session(&self) -> SessionData {
        let setup = InternalPage::Setup.url();
        let active = self.tabs.active_tab_id();
        let mut tabs = Vec::new();
        let mut active_index = 0;
        for tab in self.tabs.get_all_tabs().filter(|t| t.url != setup) {
            if Some(&tab.id) == active {
                active_index = tabs.len();
            }
            tabs.push(SessionTab {
                url: tab.url.clone(),
                title: tab.title.clone(),
            });
        }
        SessionData {
            tabs,
            active_index,
            saved_at: HistoryManager::now(),
        }
    }

    /// Resolved homepage.
    pub fn home_url(&self) -> String {
        let settings = self.app.settings();
        self.resolve_input(settings.effective_homepage())
    }

    /// Address-bar text to the URL that will be loaded.
    pub fn resolve_input(&self, input: &str) -> String {
        let settings = self.app.settings();
        let url = url_classifier::resolve(input, settings.search_engine);
        enforce_https(&url, settings.https_only)
    }

    /// Opens address-bar input in a new active tab.
    pub fn open_in_new_tab(&mut self, input: &str) -> TabId {
        let url = self.resolve_input(input);
        self.open_tab(&url)
    }

    fn open_tab(&mut self, url: &str) -> TabId {
        let id = self.tabs.create_tab(url);
        self.sync_visibility();
        id
    }

    /// Shows the active view and hides the rest.
    pub fn sync_visibility(&mut self) {
        for (active, view) in self.tabs.views_mut() {
            view.set_visible(active);
        }
    }

    /// Parses and dispatches a raw chrome message.
    pub fn dispatch_message(&mut self, raw: &str) -> Result<(), ShellError> {
        let command = ChromeCommand::parse(raw)?;
        self.dispatch(command)
    }

    pub fn dispatch(&mut self, command: ChromeCommand) -> Result<(), ShellError> {
        debug!("chrome command {:?}", command);
        match command {
            ChromeCommand::Navigate { input } => {
                let url = self.resolve_input(&input);
                if self.tabs.tab_count() == 0 {
                    self.open_tab(&url);
                } else {
                    self.tabs.navigate(&url);
                }
            }
            ChromeCommand::Back => self.tabs.go_back(),
            ChromeCommand::Forward => self.tabs.go_forward(),
            ChromeCommand::Reload => self.tabs.reload(),
            ChromeCommand::Stop => self.tabs.stop(),
            ChromeCommand::Home => {
                let url = self.home_url();
                self.tabs.go_home(&url);
            }
            ChromeCommand::NewTab => {
                self.open_tab(NEW_TAB_URL);
            }
            ChromeCommand::CloseTab { id } => {
                let target = id.or_else(|| self.tabs.active_tab_id().cloned());
                if let Some(id) = target {
                    self.tabs.close_tab(&id)?;
                    self.recorded.remove(&id);
                    self.sync_visibility();
                }
            }
            ChromeCommand::SwitchTab { id } => {
                self.tabs.switch_tab(&id)?;
                self.sync_visibility();
            }
            ChromeCommand::OpenSettings => self.show_page(InternalPage::Settings),
            ChromeCommand::OpenHistory => self.show_page(InternalPage::History),
            ChromeCommand::SetSetting { key, value } => {
                self.app.settings.set_value(&key, value)?;
                self.settings_changed();
            }
            ChromeCommand::SaveSettings => self.app.settings.save()?,
            ChromeCommand::ResetSettings => {
                self.app.settings.reset();
                self.settings_changed();
                self.refresh_if_showing(InternalPage::Settings);
            }
            ChromeCommand::CompleteSetup => {
                self.app.settings.set_setup_completed(true);
                self.app.settings.save()?;
                let url = self.home_url();
                let setup = InternalPage::Setup.url();
                let target = self
                    .tabs
                    .get_all_tabs()
                    .find(|t| t.url == setup)
                    .map(|t| t.id.clone());
                match target {
                    Some(id) => self.tabs.navigate_tab(&id, &url)?,
                    None => self.tabs.navigate(&url),
                }
            }
            ChromeCommand::ClearHistory => {
                self.app.history().clear_all()?;
                self.recorded.clear();
                self.refresh_if_showing(InternalPage::History);
            }
            ChromeCommand::Ready => {}
        }
        Ok(())
    }

    /// Switches to a tab already showing `page`, or opens one.
    fn show_page(&mut self, page: InternalPage) {
        let url = page.url();
        let existing = self
            .tabs
            .get_all_tabs()
            .find(|t| t.url == url)
            .map(|t| t.id.clone());
        match existing {
            Some(id) => {
                // The id came from the open set.
                let _ = self.tabs.switch_tab(&id);
                self.sync_visibility();
            }
            None => {
                self.open_tab(&url);
            }
        }
    }

    fn refresh_if_showing(&mut self, page: InternalPage) {
        let showing = self
            .tabs
            .get_active_tab()
            .map(|t| InternalPage::from_url(&t.url) == Some(page))
            .unwrap_or(false);
        if showing {
            self.tabs.reload();
        }
    }

    /// Pushes the current settings into the theme, the factory and every view.
    fn settings_changed(&mut self) {
        self.app.apply_theme();
        let settings = self.app.settings().clone();
        self.tabs.factory_mut().apply_settings(&settings);
        for (_, view) in self.tabs.views_mut() {
            view.set_zoom(settings.zoom_level);
        }
        let period = Self::auto_reload_period(&self.app);
        if period != self.reload_period {
            self.reload_period = period;
            self.reload_anchor = Instant::now();
        }
    }

    /// Mirrors an engine callback into tab state. Finished web loads are
    /// recorded in history under the tab's title, and a title reported later
    /// for the same page rewrites that row.
    pub fn handle_engine_event(&mut self, tab_id: &TabId, event: EngineEvent) -> Result<(), ShellError> {
        let event = canonical_event(event);
        self.tabs.apply_event(tab_id, &event)?;
        let title = self
            .tabs
            .get_tab(tab_id)
            .map(|t| t.title.clone())
            .unwrap_or_default();
        match &event {
            EngineEvent::LoadStarted { .. } => {
                self.recorded.remove(tab_id);
            }
            EngineEvent::LoadFinished { url } if is_recordable(url) => {
                let row = self.app.history().record_visit(url, &title)?;
                self.recorded.insert(tab_id.clone(), row);
            }
            EngineEvent::TitleChanged { .. } => {
                if let Some(&row) = self.recorded.get(tab_id) {
                    match self.app.history().update_title(row, &title) {
                        Ok(()) => {}
                        Err(HistoryError::NotFound(_)) => {
                            self.recorded.remove(tab_id);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
            EngineEvent::LoadFailed { url, reason } => {
                warn!("load of {} failed: {}", url, reason);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn chrome_state(&self) -> ChromeState {
        let active = self.tabs.get_active_tab();
        let url = active.map(|t| t.url.as_str()).unwrap_or("");
        ChromeState {
            tabs: self.tabs.summaries(),
            active_id: self.tabs.active_tab_id().cloned(),
            address: if url == NEW_TAB_URL { String::new() } else { url.to_string() },
            title: active.map(|t| t.title.clone()).unwrap_or_default(),
            loading: active.map(|t| t.load_state == LoadState::Loading).unwrap_or(false),
            error: active.and_then(|t| match &t.load_state {
                LoadState::Error(reason) => Some(reason.clone()),
                _ => None,
            }),
            can_go_back: active.map(|t| t.view.can_go_back()).unwrap_or(false),
            can_go_forward: active.map(|t| t.view.can_go_forward()).unwrap_or(false),
            theme_css: self.app.theme.css_root_rule(),
        }
    }

    /// HTML for a built-in page.
    pub fn render_page(&self, page: InternalPage) -> String {
        let history: Vec<HistoryEntry> = if page == InternalPage::History {
            self.app
                .history()
                .list_history(Some(HISTORY_PAGE_LIMIT))
                .unwrap_or_else(|e| {
                    warn!("could not list history: {}", e);
                    Vec::new()
                })
        } else {
            Vec::new()
        };
        let theme_css = self.app.theme.css_root_rule();
        let ctx = PageContext {
            settings: self.app.settings(),
            theme_css: &theme_css,
            stylesheet: &self.app.stylesheet.css,
            history: &history,
        };
        internal_pages::render(page, &ctx)
    }

    /// HTML for a request path under the internal scheme. Unknown paths get
    /// the new tab page.
    pub fn render_path(&self, path: &str) -> String {
        let page = InternalPage::from_path(path).unwrap_or_else(|| {
            debug!("unknown internal path {}", path);
            InternalPage::NewTab
        });
        self.render_page(page)
    }

    /// When the next auto-reload is due, if enabled.
    pub fn next_auto_reload(&self) -> Option<Instant> {
        self.reload_period.map(|period| self.reload_anchor + period)
    }

    /// Reloads the active web page if the auto-reload deadline has passed.
    /// Built-in pages are never auto-reloaded. Returns whether a reload ran.
    pub fn on_timer(&mut self, now: Instant) -> bool {
        let due = match self.next_auto_reload() {
            Some(deadline) => now >= deadline,
            None => false,
        };
        if !due {
            return false;
        }
        self.reload_anchor = now;
        let web_page = self
            .tabs
            .get_active_tab()
            .map(|t| !t.url.starts_with(INTERNAL_PREFIX))
            .unwrap_or(false);
        if web_page {
            debug!("auto-reloading active tab");
            self.tabs.reload();
        }
        web_page
    }

    /// Saves the tab session (or forgets it when `restore_tabs` is off),
    /// then closes down the app.
    pub fn shutdown(&self) {
        let mut store = self.app.session();
        let result = if self.app.settings().restore_tabs {
            store.save_session(&self.snapshot_session())
        } else {
            store.clear_session()
        };
        if let Err(e) = result {
            warn!("could not save session: {}", e);
        }
        self.app.shutdown();
    }
}

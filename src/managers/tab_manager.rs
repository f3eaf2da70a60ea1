use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::engine::{EngineEvent, EngineView, ViewFactory};
use crate::services::url_classifier::display_title;
use crate::types::errors::TabError;
use crate::types::tab::{LoadState, Tab, TabId, TabSummary};
use crate::NEW_TAB_URL;

/// Owns the open tabs, the active pointer and the factory that creates views.
///
/// After the first `create_tab` there is always at least one tab: closing the
/// last one opens a fresh new tab page in its place.
pub struct TabManager<F: ViewFactory> {
    factory: F,
    tabs: Vec<Tab<F::View>>,
    active_tab_id: Option<TabId>,
}

impl<F: ViewFactory> TabManager<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn find_tab_index(&self, tab_id: &TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == *tab_id)
    }

    fn index_or_not_found(&self, tab_id: &TabId) -> Result<usize, TabError> {
        self.find_tab_index(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    /// Opens a new tab on `url`, appends it and makes it active.
    pub fn create_tab(&mut self, url: &str) -> TabId {
        let id = TabId::new();
        let mut view = self.factory.create_view(&id);
        view.load(url);
        debug!("created tab {} on {}", id, url);
        self.tabs.push(Tab {
            id: id.clone(),
            view,
            url: url.to_string(),
            title: display_title(url),
            load_state: LoadState::Loading,
            created_at: Self::now(),
        });
        self.active_tab_id = Some(id.clone());
        id
    }

    /// Closes a tab, dropping its view.
    ///
    /// A closed active tab hands focus to its left neighbour, or to the tab
    /// that slid into its position when it was leftmost.
    pub fn close_tab(&mut self, tab_id: &TabId) -> Result<(), TabError> {
        let idx = self.index_or_not_found(tab_id)?;
        let was_active = self.active_tab_id.as_ref() == Some(tab_id);

        let closed = self.tabs.remove(idx);
        debug!("closed tab {}", closed.id);
        drop(closed);

        if self.tabs.is_empty() {
            self.active_tab_id = None;
            self.create_tab(NEW_TAB_URL);
            return Ok(());
        }

        if was_active {
            let next = if idx > 0 { idx - 1 } else { 0 };
            self.active_tab_id = Some(self.tabs[next].id.clone());
        }
        Ok(())
    }

    /// Changes the active pointer. Other tabs are untouched.
    pub fn switch_tab(&mut self, tab_id: &TabId) -> Result<(), TabError> {
        self.index_or_not_found(tab_id)?;
        self.active_tab_id = Some(tab_id.clone());
        Ok(())
    }

    /// Moves a tab to a new position in the strip.
    pub fn reorder_tab(&mut self, tab_id: &TabId, new_index: usize) -> Result<(), TabError> {
        let idx = self.index_or_not_found(tab_id)?;
        if new_index >= self.tabs.len() {
            return Err(TabError::InvalidIndex(new_index));
        }
        let tab = self.tabs.remove(idx);
        self.tabs.insert(new_index, tab);
        Ok(())
    }

    /// Closes every tab except `tab_id`, which becomes active.
    pub fn close_other_tabs(&mut self, tab_id: &TabId) -> Result<(), TabError> {
        self.index_or_not_found(tab_id)?;
        self.tabs.retain(|t| t.id == *tab_id);
        self.active_tab_id = Some(tab_id.clone());
        Ok(())
    }

    pub fn get_tab(&self, tab_id: &TabId) -> Option<&Tab<F::View>> {
        self.tabs.iter().find(|t| t.id == *tab_id)
    }

    /// Tabs in strip order.
    pub fn get_all_tabs(&self) -> impl Iterator<Item = &Tab<F::View>> {
        self.tabs.iter()
    }

    pub fn get_active_tab(&self) -> Option<&Tab<F::View>> {
        self.active_tab_id.as_ref().and_then(|id| self.get_tab(id))
    }

    pub fn active_tab_id(&self) -> Option<&TabId> {
        self.active_tab_id.as_ref()
    }

    pub fn get_active_view(&self) -> Option<&F::View> {
        self.get_active_tab().map(|t| &t.view)
    }

    pub fn get_active_view_mut(&mut self) -> Option<&mut F::View> {
        let id = self.active_tab_id.clone()?;
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .map(|t| &mut t.view)
    }

    /// Every view paired with whether it is the active one.
    pub fn views_mut(&mut self) -> impl Iterator<Item = (bool, &mut F::View)> {
        let active = self.active_tab_id.clone();
        self.tabs
            .iter_mut()
            .map(move |t| (Some(&t.id) == active.as_ref(), &mut t.view))
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn get_tab_order(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id.clone()).collect()
    }

    pub fn summaries(&self) -> Vec<TabSummary> {
        self.tabs
            .iter()
            .map(|t| TabSummary {
                id: t.id.clone(),
                url: t.url.clone(),
                title: t.title.clone(),
                loading: t.load_state == LoadState::Loading,
                active: self.active_tab_id.as_ref() == Some(&t.id),
            })
            .collect()
    }

    // Navigation on the active view. Without tabs these do nothing.

    pub fn navigate(&mut self, url: &str) {
        if let Some(view) = self.get_active_view_mut() {
            view.load(url);
        }
    }

    /// Loads `url` in a specific tab, active or not.
    pub fn navigate_tab(&mut self, tab_id: &TabId, url: &str) -> Result<(), TabError> {
        let idx = self.index_or_not_found(tab_id)?;
        self.tabs[idx].view.load(url);
        Ok(())
    }

    pub fn go_home(&mut self, homepage: &str) {
        self.navigate(homepage);
    }

    pub fn go_back(&mut self) {
        if let Some(view) = self.get_active_view_mut() {
            if view.can_go_back() {
                view.go_back();
            }
        }
    }

    pub fn go_forward(&mut self) {
        if let Some(view) = self.get_active_view_mut() {
            if view.can_go_forward() {
                view.go_forward();
            }
        }
    }

    pub fn reload(&mut self) {
        if let Some(view) = self.get_active_view_mut() {
            view.reload();
        }
    }

    pub fn stop(&mut self) {
        if let Some(view) = self.get_active_view_mut() {
            view.stop();
        }
    }

    /// Mirrors an engine callback into the tab's URL, title and load state.
    pub fn apply_event(&mut self, tab_id: &TabId, event: &EngineEvent) -> Result<(), TabError> {
        let tab = self
            .tabs
            .iter_mut()
            .find(|t| t.id == *tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        match event {
            EngineEvent::LoadStarted { url } => {
                // The previous page's title must not outlive it.
                tab.url = url.clone();
                tab.title = display_title(url);
                tab.load_state = LoadState::Loading;
            }
            EngineEvent::LoadFinished { url } => {
                tab.url = url.clone();
                tab.load_state = LoadState::Idle;
                if tab.title.is_empty() {
                    tab.title = display_title(url);
                }
            }
            EngineEvent::LoadFailed { url, reason } => {
                tab.url = url.clone();
                tab.load_state = LoadState::Error(reason.clone());
            }
            EngineEvent::TitleChanged { title } => {
                if !title.trim().is_empty() {
                    tab.title = title.clone();
                }
            }
        }
        Ok(())
    }
}

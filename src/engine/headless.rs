//! Engine implementation without a window.
//!
//! Each view keeps its own back/forward stacks and reports load and title
//! events into a queue shared with its factory. Used by the console binary
//! and as the view double in tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{EngineEvent, EngineView, ViewFactory};
use crate::services::url_classifier::display_title;
use crate::types::settings::Settings;
use crate::types::tab::TabId;

/// A call made on a headless view, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    Load(String),
    Back,
    Forward,
    Reload,
    Stop,
    Visible(bool),
    Zoom(u32),
}

/// State shared between a factory and every view it created.
#[derive(Debug, Default)]
pub struct EngineLog {
    pub events: VecDeque<(TabId, EngineEvent)>,
    pub calls: Vec<(TabId, ViewCall)>,
    pub destroyed: Vec<TabId>,
}

pub type SharedLog = Rc<RefCell<EngineLog>>;

/// Hosts under this reserved suffix never resolve.
const UNRESOLVABLE_SUFFIX: &str = ".invalid";

pub struct HeadlessView {
    tab_id: TabId,
    log: SharedLog,
    back: Vec<String>,
    forward: Vec<String>,
    url: String,
    title: String,
}

impl HeadlessView {
    fn record(&self, call: ViewCall) {
        self.log.borrow_mut().calls.push((self.tab_id.clone(), call));
    }

    fn emit(&self, event: EngineEvent) {
        self.log
            .borrow_mut()
            .events
            .push_back((self.tab_id.clone(), event));
    }

    /// Simulates the engine fetching `url` and reporting back.
    fn commit(&mut self, url: String) {
        self.emit(EngineEvent::LoadStarted { url: url.clone() });
        let host = display_title(&url);
        if host.ends_with(UNRESOLVABLE_SUFFIX) {
            self.url = url.clone();
            self.emit(EngineEvent::LoadFailed {
                url,
                reason: format!("could not resolve host {}", host),
            });
            return;
        }
        self.title = host;
        self.url = url.clone();
        self.emit(EngineEvent::TitleChanged {
            title: self.title.clone(),
        });
        self.emit(EngineEvent::LoadFinished { url });
    }
}

impl EngineView for HeadlessView {
    fn load(&mut self, url: &str) {
        self.record(ViewCall::Load(url.to_string()));
        if !self.url.is_empty() {
            self.back.push(std::mem::take(&mut self.url));
        }
        self.forward.clear();
        self.commit(url.to_string());
    }

    fn go_back(&mut self) {
        self.record(ViewCall::Back);
        if let Some(prev) = self.back.pop() {
            self.forward.push(std::mem::take(&mut self.url));
            self.commit(prev);
        }
    }

    fn go_forward(&mut self) {
        self.record(ViewCall::Forward);
        if let Some(next) = self.forward.pop() {
            self.back.push(std::mem::take(&mut self.url));
            self.commit(next);
        }
    }

    fn reload(&mut self) {
        self.record(ViewCall::Reload);
        if !self.url.is_empty() {
            let url = self.url.clone();
            self.commit(url);
        }
    }

    fn stop(&mut self) {
        self.record(ViewCall::Stop);
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn current_title(&self) -> String {
        self.title.clone()
    }

    fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    fn set_visible(&mut self, visible: bool) {
        self.record(ViewCall::Visible(visible));
    }

    fn set_zoom(&mut self, percent: u32) {
        self.record(ViewCall::Zoom(percent));
    }
}

impl Drop for HeadlessView {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.try_borrow_mut() {
            log.destroyed.push(self.tab_id.clone());
        }
    }
}

/// Factory for [`HeadlessView`]s sharing one [`EngineLog`].
pub struct HeadlessFactory {
    log: SharedLog,
    zoom: u32,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self {
            log: SharedLog::default(),
            zoom: 100,
        }
    }

    /// Handle onto the shared log; stays valid after the factory moves.
    pub fn log(&self) -> SharedLog {
        Rc::clone(&self.log)
    }

    pub fn drain_events(&self) -> Vec<(TabId, EngineEvent)> {
        self.log.borrow_mut().events.drain(..).collect()
    }
}

impl Default for HeadlessFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewFactory for HeadlessFactory {
    type View = HeadlessView;

    fn create_view(&mut self, tab_id: &TabId) -> HeadlessView {
        let mut view = HeadlessView {
            tab_id: tab_id.clone(),
            log: Rc::clone(&self.log),
            back: Vec::new(),
            forward: Vec::new(),
            url: String::new(),
            title: String::new(),
        };
        view.set_zoom(self.zoom);
        view
    }

    fn apply_settings(&mut self, settings: &Settings) {
        self.zoom = settings.zoom_level;
    }
}

/// Calls recorded for one tab, in order.
pub fn calls_for(log: &SharedLog, tab_id: &TabId) -> Vec<ViewCall> {
    log.borrow()
        .calls
        .iter()
        .filter(|(id, _)| id == tab_id)
        .map(|(_, call)| call.clone())
        .collect()
}

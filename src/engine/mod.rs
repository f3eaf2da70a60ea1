//! Contract between the shell and the embedded web engine.
//!
//! The engine itself (rendering, scripts, network) is an opaque collaborator.
//! The shell only ever sees an [`EngineView`] per tab and receives the
//! engine's callbacks as [`EngineEvent`] messages on the UI thread.

pub mod headless;

use crate::types::settings::Settings;
use crate::types::tab::TabId;

/// Navigation surface of one engine view instance.
pub trait EngineView {
    /// Starts loading `url`. Returns immediately; progress arrives as events.
    fn load(&mut self, url: &str);
    fn go_back(&mut self);
    fn go_forward(&mut self);
    fn reload(&mut self);
    fn stop(&mut self);
    fn current_url(&self) -> String;
    fn current_title(&self) -> String;

    fn can_go_back(&self) -> bool {
        true
    }

    fn can_go_forward(&self) -> bool {
        true
    }

    fn set_visible(&mut self, _visible: bool) {}

    /// Page zoom in percent.
    fn set_zoom(&mut self, _percent: u32) {}
}

/// Callbacks raised by an engine view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    LoadStarted { url: String },
    LoadFinished { url: String },
    LoadFailed { url: String, reason: String },
    TitleChanged { title: String },
}

/// Creates engine views and wires their callbacks back to the event loop.
pub trait ViewFactory {
    type View: EngineView;

    fn create_view(&mut self, tab_id: &TabId) -> Self::View;

    /// Called whenever settings change so new views pick them up.
    fn apply_settings(&mut self, _settings: &Settings) {}
}

//! Driftwood UI layer.
//!
//! Uses `wry` for the engine views and `tao` for the window:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! The chrome (tab strip and toolbar) is its own webview above the tab
//! views. Every wry callback only forwards a [`UserEvent`] through the event
//! loop proxy; all state lives in the event loop closure.

pub mod webview_app;
pub mod wry_view;

use wry::RequestAsyncResponder;

use crate::engine::EngineEvent;
use crate::types::tab::TabId;

pub enum UserEvent {
    /// JSON command posted by the chrome or a built-in page.
    Ipc(String),
    /// Callback from the engine view of a tab.
    Engine(TabId, EngineEvent),
    /// Request for a page under the internal scheme.
    ServePage {
        path: String,
        responder: RequestAsyncResponder,
    },
    /// A page asked for a new window.
    OpenInNewTab(String),
}

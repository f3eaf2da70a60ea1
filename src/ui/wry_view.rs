//! `EngineView` over a wry child webview.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, warn};
use tao::event_loop::EventLoopProxy;
use tao::window::Window;
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::http::Request;
use wry::{NewWindowResponse, PageLoadEvent, Rect, WebView, WebViewBuilder};

use super::UserEvent;
use crate::engine::{EngineEvent, EngineView, ViewFactory};
use crate::services::internal_pages::{self, engine_url, InternalPage};
use crate::types::settings::{Settings, UserAgent};
use crate::types::tab::TabId;
use crate::INTERNAL_SCHEME;

/// Height of the chrome strip above the tab views, in logical pixels.
pub const CHROME_HEIGHT: f64 = 76.0;

const DNT_SCRIPT: &str =
    "Object.defineProperty(navigator,'doNotTrack',{get:function(){return '1'}});";

// Hides the peer connection constructors and refuses media capture.
const WEBRTC_SCRIPT: &str = "['RTCPeerConnection','webkitRTCPeerConnection',\
'RTCDataChannel','RTCSessionDescription','RTCIceCandidate'].forEach(function(n){\
try{delete window[n]}catch(e){}window[n]=undefined});\
if(navigator.mediaDevices){navigator.mediaDevices.getUserMedia=function(){\
return Promise.reject(new DOMException('WebRTC is disabled','NotAllowedError'))}}";

fn logical_size(window: &Window) -> (f64, f64) {
    let scale = window.scale_factor();
    let size = window.inner_size();
    (size.width as f64 / scale, size.height as f64 / scale)
}

pub fn chrome_bounds(window: &Window) -> Rect {
    let (width, _) = logical_size(window);
    Rect {
        position: LogicalPosition::new(0.0, 0.0).into(),
        size: LogicalSize::new(width, CHROME_HEIGHT).into(),
    }
}

pub fn content_bounds(window: &Window) -> Rect {
    let (width, height) = logical_size(window);
    Rect {
        position: LogicalPosition::new(0.0, CHROME_HEIGHT).into(),
        size: LogicalSize::new(width, (height - CHROME_HEIGHT).max(0.0)).into(),
    }
}

/// Registers the internal scheme; requests are answered from the event loop.
pub fn with_internal_protocol<'a>(
    builder: WebViewBuilder<'a>,
    proxy: EventLoopProxy<UserEvent>,
) -> WebViewBuilder<'a> {
    builder.with_asynchronous_custom_protocol(INTERNAL_SCHEME.into(), move |_id, request, responder| {
        let path = request.uri().path().to_string();
        if proxy
            .send_event(UserEvent::ServePage { path, responder })
            .is_err()
        {
            debug!("event loop closed, dropping internal page request");
        }
    })
}

pub struct WryView {
    webview: Option<WebView>,
    title: Rc<RefCell<String>>,
}

impl WryView {
    fn eval(&self, js: &str) {
        if let Some(webview) = &self.webview {
            if let Err(e) = webview.evaluate_script(js) {
                warn!("script failed: {}", e);
            }
        }
    }

    pub fn set_bounds(&self, bounds: Rect) {
        if let Some(webview) = &self.webview {
            if let Err(e) = webview.set_bounds(bounds) {
                warn!("could not resize view: {}", e);
            }
        }
    }
}

impl EngineView for WryView {
    fn load(&mut self, url: &str) {
        if let Some(webview) = &self.webview {
            if let Err(e) = webview.load_url(&engine_url(url)) {
                warn!("could not load {}: {}", url, e);
            }
        }
    }

    fn go_back(&mut self) {
        self.eval("history.back();");
    }

    fn go_forward(&mut self) {
        self.eval("history.forward();");
    }

    fn reload(&mut self) {
        self.eval("location.reload();");
    }

    fn stop(&mut self) {
        self.eval("window.stop();");
    }

    fn current_url(&self) -> String {
        self.webview
            .as_ref()
            .and_then(|w| w.url().ok())
            .map(|url| internal_pages::canonicalize(&url))
            .unwrap_or_default()
    }

    fn current_title(&self) -> String {
        self.title.borrow().clone()
    }

    fn set_visible(&mut self, visible: bool) {
        if let Some(webview) = &self.webview {
            if let Err(e) = webview.set_visible(visible) {
                warn!("could not change view visibility: {}", e);
            }
        }
    }

    fn set_zoom(&mut self, percent: u32) {
        if let Some(webview) = &self.webview {
            if let Err(e) = webview.zoom(f64::from(percent) / 100.0) {
                warn!("could not zoom view: {}", e);
            }
        }
    }
}

/// Builds one child webview per tab below the chrome.
pub struct WryFactory {
    window: Rc<Window>,
    proxy: EventLoopProxy<UserEvent>,
    user_agent: UserAgent,
    zoom: u32,
    do_not_track: bool,
    disable_webrtc: bool,
}

impl WryFactory {
    pub fn new(window: Rc<Window>, proxy: EventLoopProxy<UserEvent>) -> Self {
        let defaults = Settings::default();
        Self {
            window,
            proxy,
            user_agent: defaults.user_agent,
            zoom: defaults.zoom_level,
            do_not_track: defaults.do_not_track,
            disable_webrtc: defaults.disable_webrtc,
        }
    }
}

impl ViewFactory for WryFactory {
    type View = WryView;

    fn create_view(&mut self, tab_id: &TabId) -> WryView {
        let title = Rc::new(RefCell::new(String::new()));

        let load_proxy = self.proxy.clone();
        let load_tab = tab_id.clone();
        let title_proxy = self.proxy.clone();
        let title_tab = tab_id.clone();
        let title_cell = Rc::clone(&title);
        let ipc_proxy = self.proxy.clone();
        let window_proxy = self.proxy.clone();

        let mut builder = WebViewBuilder::new()
            .with_bounds(content_bounds(&self.window))
            .with_visible(false)
            .with_devtools(cfg!(debug_assertions))
            .with_on_page_load_handler(move |event, url| {
                let event = match event {
                    PageLoadEvent::Started => EngineEvent::LoadStarted { url },
                    PageLoadEvent::Finished => EngineEvent::LoadFinished { url },
                };
                let _ = load_proxy.send_event(UserEvent::Engine(load_tab.clone(), event));
            })
            .with_document_title_changed_handler(move |new_title| {
                *title_cell.borrow_mut() = new_title.clone();
                let _ = title_proxy.send_event(UserEvent::Engine(
                    title_tab.clone(),
                    EngineEvent::TitleChanged { title: new_title },
                ));
            })
            .with_ipc_handler(move |request: Request<String>| {
                // Only built-in pages may drive the shell.
                let origin = request.uri().to_string();
                if InternalPage::from_engine_url(&origin).is_none() {
                    warn!("ignoring message from {}", origin);
                    return;
                }
                let _ = ipc_proxy.send_event(UserEvent::Ipc(request.into_body()));
            })
            .with_new_window_req_handler(move |url, _features| {
                if url.starts_with("http://") || url.starts_with("https://") {
                    let _ = window_proxy.send_event(UserEvent::OpenInNewTab(url));
                }
                NewWindowResponse::Deny
            });
        builder = with_internal_protocol(builder, self.proxy.clone());
        if let Some(agent) = self.user_agent.header_value() {
            builder = builder.with_user_agent(agent);
        }
        if self.do_not_track {
            builder = builder.with_initialization_script(DNT_SCRIPT);
        }
        if self.disable_webrtc {
            builder = builder.with_initialization_script(WEBRTC_SCRIPT);
        }

        let webview = match builder.build_as_child(&*self.window) {
            Ok(webview) => Some(webview),
            Err(e) => {
                error!("could not create view for tab {}: {}", tab_id, e);
                None
            }
        };
        let mut view = WryView { webview, title };
        view.set_zoom(self.zoom);
        view
    }

    fn apply_settings(&mut self, settings: &Settings) {
        self.user_agent = settings.user_agent;
        self.zoom = settings.zoom_level;
        self.do_not_track = settings.do_not_track;
        self.disable_webrtc = settings.disable_webrtc;
    }
}

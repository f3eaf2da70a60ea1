//! WebView-based browser window using `wry` + `tao`.
//!
//! Architecture:
//! - The chrome webview (tab strip, toolbar, address bar) spans the top of
//!   the window; each tab owns a child webview below it.
//! - Built-in pages are served via the `drift://` custom protocol, rendered
//!   by the shell on the event loop thread.
//! - IPC from JS → Rust via `window.ipc.postMessage()`; the chrome renders
//!   whatever `ChromeState` the shell pushes back.

use std::borrow::Cow;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, error, info, warn};
use tao::dpi::LogicalSize;
use tao::event::{Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::{Window, WindowBuilder};
use wry::http::header::{HeaderValue, CONTENT_TYPE};
use wry::http::{Request, Response};
use wry::{WebView, WebViewBuilder};

use super::wry_view::{chrome_bounds, content_bounds, WryFactory};
use super::UserEvent;
use crate::app::App;
use crate::cli::Cli;
use crate::shell::Shell;

const APP_NAME: &str = "Driftwood";

const CHROME_BODY: &str = r#"<div class="chrome">
<div class="tabs" id="tabs"></div>
<div class="toolbar">
<button id="back" title="Back">&#8592;</button>
<button id="forward" title="Forward">&#8594;</button>
<button id="reload" title="Reload">&#8635;</button>
<button id="home" title="Home">&#8962;</button>
<input id="addr" type="text" placeholder="Search or enter address" spellcheck="false">
<button id="history" title="History">&#9776;</button>
<button id="settings" title="Settings">&#9881;</button>
</div>
</div>"#;

const CHROME_JS: &str = r#"
function send(m){window.ipc.postMessage(JSON.stringify(m))}
var loading=false;
var tabs=document.getElementById('tabs'),addr=document.getElementById('addr'),theme=document.getElementById('theme');
function bind(id,cmd){document.getElementById(id).addEventListener('click',function(){send({cmd:cmd})})}
bind('back','back');bind('forward','forward');bind('home','home');
bind('history','open_history');bind('settings','open_settings');
document.getElementById('reload').addEventListener('click',function(){send({cmd:loading?'stop':'reload'})});
addr.addEventListener('keydown',function(e){
  if(e.key==='Enter'){send({cmd:'navigate',input:addr.value});addr.blur();}
});
window.__driftUpdate=function(s){
  theme.textContent=s.theme_css;
  loading=s.loading;
  tabs.innerHTML='';
  s.tabs.forEach(function(t){
    var el=document.createElement('div');
    el.className='tab'+(t.active?' active':'');
    var label=document.createElement('span');
    label.textContent=(t.loading?'◌ ':'')+(t.title||t.url);
    el.appendChild(label);
    var x=document.createElement('button');
    x.className='close';x.textContent='×';
    x.addEventListener('click',function(e){e.stopPropagation();send({cmd:'close_tab',id:t.id})});
    el.appendChild(x);
    el.addEventListener('click',function(){send({cmd:'switch_tab',id:t.id})});
    tabs.appendChild(el);
  });
  var plus=document.createElement('button');
  plus.textContent='+';plus.title='New tab';
  plus.addEventListener('click',function(){send({cmd:'new_tab'})});
  tabs.appendChild(plus);
  if(document.activeElement!==addr)addr.value=s.address;
  addr.title=s.error||'';
  document.getElementById('back').disabled=!s.can_go_back;
  document.getElementById('forward').disabled=!s.can_go_forward;
  document.getElementById('reload').innerHTML=s.loading?'&#10005;':'&#8635;';
};
send({cmd:'ready'});
"#;

fn chrome_html(shell: &Shell<WryFactory>) -> String {
    let app = shell.app();
    let mut html = String::with_capacity(app.stylesheet.css.len() + CHROME_BODY.len() + CHROME_JS.len() + 512);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>");
    html.push_str(APP_NAME);
    html.push_str("</title><style id=\"theme\">");
    html.push_str(&app.theme.css_root_rule());
    html.push_str("</style><style>");
    html.push_str(&app.stylesheet.css);
    html.push_str("</style></head><body>");
    html.push_str(CHROME_BODY);
    html.push_str("<script>");
    html.push_str(CHROME_JS);
    html.push_str("</script></body></html>");
    html
}

fn html_response(html: String) -> Response<Cow<'static, [u8]>> {
    let mut response = Response::new(Cow::Owned(html.into_bytes()));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    response
}

fn build_chrome(
    window: &Window,
    shell: &Shell<WryFactory>,
    proxy: EventLoopProxy<UserEvent>,
) -> wry::Result<WebView> {
    WebViewBuilder::new()
        .with_html(chrome_html(shell))
        .with_bounds(chrome_bounds(window))
        .with_devtools(cfg!(debug_assertions))
        .with_ipc_handler(move |request: Request<String>| {
            let _ = proxy.send_event(UserEvent::Ipc(request.into_body()));
        })
        .build_as_child(window)
}

/// Sends the current state to the chrome and retitles the window.
fn push_state(window: &Window, chrome: &WebView, shell: &Shell<WryFactory>) {
    let state = shell.chrome_state();
    if state.title.is_empty() {
        window.set_title(APP_NAME);
    } else {
        window.set_title(&format!("{} - {}", state.title, APP_NAME));
    }
    match serde_json::to_string(&state) {
        Ok(json) => {
            let script = format!("window.__driftUpdate&&window.__driftUpdate({})", json);
            if let Err(e) = chrome.evaluate_script(&script) {
                warn!("chrome update failed: {}", e);
            }
        }
        Err(e) => error!("could not serialize chrome state: {}", e),
    }
}

fn layout(window: &Window, chrome: &WebView, shell: &mut Shell<WryFactory>) {
    if let Err(e) = chrome.set_bounds(chrome_bounds(window)) {
        warn!("could not resize chrome: {}", e);
    }
    for (_, view) in shell.views_mut() {
        view.set_bounds(content_bounds(window));
    }
}

// ─── Main entry point ───

pub fn run(cli: Cli) {
    let app = match App::new(cli.profile_paths(), cli.theme) {
        Ok(app) => app,
        Err(e) => {
            error!("failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = Rc::new(
        WindowBuilder::new()
            .with_title(APP_NAME)
            .with_inner_size(LogicalSize::new(1280.0, 800.0))
            .build(&event_loop)
            .expect("Failed to create window"),
    );

    let mut shell = Shell::new(app, WryFactory::new(Rc::clone(&window), proxy.clone()));
    shell.open_window();

    let chrome = build_chrome(&window, &shell, proxy).expect("Failed to create chrome view");
    info!("window ready");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                if shell.on_timer(Instant::now()) {
                    push_state(&window, &chrome, &shell);
                }
            }

            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                shell.shutdown();
                *control_flow = ControlFlow::Exit;
                return;
            }

            Event::WindowEvent {
                event: WindowEvent::Resized(_),
                ..
            } => layout(&window, &chrome, &mut shell),

            Event::UserEvent(user_event) => match user_event {
                UserEvent::Ipc(raw) => {
                    if let Err(e) = shell.dispatch_message(&raw) {
                        warn!("{}", e);
                    }
                    push_state(&window, &chrome, &shell);
                }
                UserEvent::Engine(tab_id, engine_event) => {
                    // Views of closed tabs may still report in.
                    if let Err(e) = shell.handle_engine_event(&tab_id, engine_event) {
                        debug!("{}", e);
                    }
                    push_state(&window, &chrome, &shell);
                }
                UserEvent::ServePage { path, responder } => {
                    responder.respond(html_response(shell.render_path(&path)));
                }
                UserEvent::OpenInNewTab(url) => {
                    shell.open_in_new_tab(&url);
                    push_state(&window, &chrome, &shell);
                }
            },

            _ => {}
        }

        if let Some(deadline) = shell.next_auto_reload() {
            *control_flow = ControlFlow::WaitUntil(deadline);
        }
    });
}

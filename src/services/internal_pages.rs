//! Built-in pages served under the `drift://` scheme.
//!
//! Pages are plain HTML rendered from current settings and history. They talk
//! back to the shell by posting the same JSON commands as the chrome.

use chrono::DateTime;

use crate::types::history::HistoryEntry;
use crate::types::settings::{SearchEngine, Settings, ThemeMode, UserAgent};
use crate::INTERNAL_PREFIX;

/// Origin the engine serves built-in pages from. WebView2 maps custom
/// schemes onto a synthetic http host.
#[cfg(windows)]
pub const ENGINE_ORIGIN: &str = "http://drift.localhost/";
#[cfg(not(windows))]
pub const ENGINE_ORIGIN: &str = "drift://localhost/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalPage {
    NewTab,
    Settings,
    History,
    Setup,
}

impl InternalPage {
    pub const ALL: [InternalPage; 4] = [
        InternalPage::NewTab,
        InternalPage::Settings,
        InternalPage::History,
        InternalPage::Setup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InternalPage::NewTab => "newtab",
            InternalPage::Settings => "settings",
            InternalPage::History => "history",
            InternalPage::Setup => "setup",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            InternalPage::NewTab => "New Tab",
            InternalPage::Settings => "Settings",
            InternalPage::History => "History",
            InternalPage::Setup => "Welcome",
        }
    }

    /// Canonical address, e.g. `drift://settings`.
    pub fn url(self) -> String {
        format!("{}{}", INTERNAL_PREFIX, self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Recognizes the canonical form and the forms engines report for custom
    /// schemes (`drift://localhost/settings`, `http://drift.localhost/settings`).
    pub fn from_url(url: &str) -> Option<Self> {
        let rest = url
            .strip_prefix(INTERNAL_PREFIX)
            .map(|r| r.strip_prefix("localhost/").unwrap_or(r))
            .or_else(|| url.strip_prefix("http://drift.localhost/"))
            .or_else(|| url.strip_prefix("https://drift.localhost/"))?;
        let name = rest.split(['/', '?', '#']).next().unwrap_or("");
        Self::from_name(name)
    }

    /// Like [`from_url`](Self::from_url) but only for this platform's
    /// [`ENGINE_ORIGIN`]. Messages are trusted only from such URLs.
    pub fn from_engine_url(url: &str) -> Option<Self> {
        if !url.starts_with(ENGINE_ORIGIN) {
            return None;
        }
        Self::from_url(url)
    }

    /// Resolves a request path such as `/settings` (empty path means new tab).
    pub fn from_path(path: &str) -> Option<Self> {
        let name = path.trim_matches('/');
        if name.is_empty() {
            return Some(InternalPage::NewTab);
        }
        Self::from_name(name)
    }
}

/// Maps engine-reported internal URLs back to the canonical form; other URLs
/// are returned unchanged.
pub fn canonicalize(url: &str) -> String {
    match InternalPage::from_url(url) {
        Some(page) => page.url(),
        None => url.to_string(),
    }
}

/// Maps a canonical internal URL to the form the engine can load.
pub fn engine_url(url: &str) -> String {
    match InternalPage::from_url(url) {
        Some(page) => format!("{}{}", ENGINE_ORIGIN, page.name()),
        None => url.to_string(),
    }
}

/// Everything a page needs to render.
pub struct PageContext<'a> {
    pub settings: &'a Settings,
    /// `:root{...}` rule from the theme engine.
    pub theme_css: &'a str,
    pub stylesheet: &'a str,
    pub history: &'a [HistoryEntry],
}

/// Escapes text for HTML element and attribute content.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const IPC_JS: &str = "function send(m){if(window.ipc)window.ipc.postMessage(JSON.stringify(m))}";

fn document(title: &str, ctx: &PageContext<'_>, body: &str, script: &str) -> String {
    let mut html = String::with_capacity(body.len() + ctx.stylesheet.len() + 1024);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>");
    html.push_str(&escape_html(title));
    html.push_str("</title><style>");
    html.push_str(ctx.theme_css);
    html.push_str(ctx.stylesheet);
    html.push_str("</style></head><body>");
    html.push_str(body);
    html.push_str("<script>");
    html.push_str(IPC_JS);
    html.push_str(script);
    html.push_str("</script></body></html>");
    html
}

pub fn render(page: InternalPage, ctx: &PageContext<'_>) -> String {
    match page {
        InternalPage::NewTab => render_newtab(ctx),
        InternalPage::Settings => render_settings(ctx),
        InternalPage::History => render_history(ctx),
        InternalPage::Setup => render_setup(ctx),
    }
}

fn render_newtab(ctx: &PageContext<'_>) -> String {
    let body = format!(
        "<div class=\"newtab\"><h1>Driftwood</h1>\
         <input id=\"q\" type=\"text\" placeholder=\"Search with {} or enter URL\" autofocus>\
         <div class=\"muted\">\
         <a href=\"#\" onclick=\"send({{cmd:'open_history'}})\">History</a> · \
         <a href=\"#\" onclick=\"send({{cmd:'open_settings'}})\">Settings</a></div></div>",
        escape_html(ctx.settings.search_engine.label())
    );
    let js = "var q=document.getElementById('q');\
        q.addEventListener('keydown',function(e){if(e.key==='Enter')send({cmd:'navigate',input:q.value})});";
    document(InternalPage::NewTab.title(), ctx, &body, js)
}

fn select<T: Copy + PartialEq>(
    key: &str,
    current: T,
    options: &[(T, &str, &str)],
) -> String {
    let mut html = format!("<select data-key=\"{}\" data-kind=\"text\">", key);
    for (value, id, label) in options {
        let selected = if *value == current { " selected" } else { "" };
        html.push_str(&format!("<option value=\"{}\"{}>{}</option>", id, selected, label));
    }
    html.push_str("</select>");
    html
}

fn theme_options() -> [(ThemeMode, &'static str, &'static str); 3] {
    [
        (ThemeMode::Dark, "dark", "Dark"),
        (ThemeMode::Light, "light", "Light"),
        (ThemeMode::System, "system", "System"),
    ]
}

fn engine_options() -> Vec<(SearchEngine, &'static str, &'static str)> {
    SearchEngine::ALL
        .iter()
        .map(|e| (*e, e.key(), e.label()))
        .collect()
}

fn checkbox(key: &str, label: &str, checked: bool) -> String {
    format!(
        "<div class=\"row\"><label>{}</label><input type=\"checkbox\" data-key=\"{}\" data-kind=\"bool\"{}></div>",
        label,
        key,
        if checked { " checked" } else { "" }
    )
}

fn number(key: &str, label: &str, value: u32, min: u32, max: u32) -> String {
    format!(
        "<div class=\"row\"><label>{}</label><input type=\"number\" data-key=\"{}\" data-kind=\"number\" value=\"{}\" min=\"{}\" max=\"{}\"></div>",
        label, key, value, min, max
    )
}

/// Wires every `[data-key]` control to `set_setting`.
const SETTINGS_JS: &str = "document.querySelectorAll('[data-key]').forEach(function(el){\
    el.addEventListener('change',function(){\
      var k=el.dataset.kind,v=k==='bool'?el.checked:(k==='number'?Number(el.value):el.value);\
      send({cmd:'set_setting',key:el.dataset.key,value:v});});});";

fn render_settings(ctx: &PageContext<'_>) -> String {
    let s = ctx.settings;
    let mut body = String::from("<div class=\"page\"><h1>Settings</h1>");

    body.push_str("<div class=\"row\"><label>Theme</label>");
    body.push_str(&select("theme", s.theme, &theme_options()));
    body.push_str("</div>");
    body.push_str(&format!(
        "<div class=\"row\"><label>Accent color</label><input type=\"text\" data-key=\"accent_color\" data-kind=\"text\" value=\"{}\"></div>",
        escape_html(&s.accent_color)
    ));
    body.push_str(&format!(
        "<div class=\"row\"><label>Homepage</label><input type=\"text\" data-key=\"homepage\" data-kind=\"text\" value=\"{}\"></div>",
        escape_html(&s.homepage)
    ));
    body.push_str("<div class=\"row\"><label>Search engine</label>");
    body.push_str(&select("search_engine", s.search_engine, &engine_options()));
    body.push_str("</div>");
    body.push_str("<div class=\"row\"><label>User agent</label>");
    body.push_str(&select(
        "user_agent",
        s.user_agent,
        &[
            (UserAgent::Engine, "engine", "Engine default"),
            (UserAgent::Chrome, "chrome", "Chrome"),
            (UserAgent::Firefox, "firefox", "Firefox"),
            (UserAgent::Safari, "safari", "Safari"),
        ],
    ));
    body.push_str("</div>");

    body.push_str("<h1>Privacy</h1>");
    body.push_str(&checkbox("block_trackers", "Block trackers", s.block_trackers));
    body.push_str(&checkbox("block_ads", "Block ads", s.block_ads));
    body.push_str(&checkbox(
        "block_third_party_cookies",
        "Block third-party cookies",
        s.block_third_party_cookies,
    ));
    body.push_str(&checkbox("block_fingerprinting", "Block fingerprinting", s.block_fingerprinting));
    body.push_str(&checkbox("do_not_track", "Send Do Not Track", s.do_not_track));
    body.push_str(&checkbox("https_only", "HTTPS only", s.https_only));
    body.push_str(&checkbox("disable_webrtc", "Disable WebRTC", s.disable_webrtc));

    body.push_str("<h1>Pages</h1>");
    body.push_str(&number("zoom_level", "Zoom (%)", s.zoom_level, 25, 200));
    body.push_str(&checkbox("auto_reload", "Auto-reload pages", s.auto_reload));
    body.push_str(&number(
        "auto_reload_interval",
        "Auto-reload interval (s)",
        s.auto_reload_interval,
        5,
        3600,
    ));
    body.push_str(&number(
        "history_retention_days",
        "Keep history (days)",
        s.history_retention_days,
        1,
        3650,
    ));
    body.push_str(&checkbox(
        "restore_tabs",
        "Restore tabs from last session",
        s.restore_tabs,
    ));

    body.push_str(
        "<div class=\"row\"><button class=\"primary\" onclick=\"send({cmd:'save_settings'})\">Save</button>\
         <button onclick=\"if(confirm('Reset all settings to defaults?'))send({cmd:'reset_settings'})\">Reset</button></div></div>",
    );
    document(InternalPage::Settings.title(), ctx, &body, SETTINGS_JS)
}

fn format_time(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn render_history(ctx: &PageContext<'_>) -> String {
    let mut body = String::from(
        "<div class=\"page\"><h1>History</h1>\
         <div class=\"row\"><button onclick=\"send({cmd:'clear_history'})\">Clear history</button></div>",
    );
    if ctx.history.is_empty() {
        body.push_str("<p class=\"muted\">No pages visited yet.</p>");
    }
    for entry in ctx.history {
        let title = if entry.title.is_empty() {
            &entry.url
        } else {
            &entry.title
        };
        body.push_str(&format!(
            "<div class=\"entry\"><span class=\"muted\">{}</span><a href=\"{}\">{}</a></div>",
            format_time(entry.visit_time),
            escape_html(&entry.url),
            escape_html(title)
        ));
    }
    body.push_str("</div>");
    document(InternalPage::History.title(), ctx, &body, "")
}

fn render_setup(ctx: &PageContext<'_>) -> String {
    let s = ctx.settings;
    let mut body = String::from(
        "<div class=\"page\"><h1>Welcome to Driftwood</h1>\
         <p class=\"muted\">Pick a look and a search engine. Everything can be changed later in Settings.</p>",
    );
    body.push_str("<div class=\"row\"><label>Theme</label>");
    body.push_str(&select("theme", s.theme, &theme_options()));
    body.push_str("</div><div class=\"row\"><label>Search engine</label>");
    body.push_str(&select("search_engine", s.search_engine, &engine_options()));
    body.push_str(
        "</div><div class=\"row\"><button class=\"primary\" onclick=\"send({cmd:'complete_setup'})\">Start browsing</button></div></div>",
    );
    document(InternalPage::Setup.title(), ctx, &body, SETTINGS_JS)
}

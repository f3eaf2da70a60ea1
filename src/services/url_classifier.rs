//! Address-bar input classification.
//!
//! Turns whatever the user typed into one URL the engine can load: the text
//! itself, the text completed with `https://`, or a search-engine query.

use crate::types::settings::SearchEngine;
use crate::{INTERNAL_PREFIX, NEW_TAB_URL};

/// Scheme prefixes accepted verbatim.
pub const PASS_THROUGH_PREFIXES: [&str; 3] = [INTERNAL_PREFIX, "http://", "https://"];

/// Suffixes that make bare input look like a host name.
pub const COMPLETION_SUFFIXES: [&str; 9] = [
    ".com", ".org", ".net", ".io", ".co", ".dev", ".app", ".gov", ".edu",
];

/// Outcome of classifying address-bar input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Empty input: open the new tab page.
    NewTab,
    /// Input already carries a recognized scheme.
    PassThrough(String),
    /// Bare host completed with `https://`.
    Completed(String),
    /// Everything else becomes a search query URL.
    Search(String),
}

impl Classified {
    pub fn url(&self) -> &str {
        match self {
            Classified::NewTab => NEW_TAB_URL,
            Classified::PassThrough(url)
            | Classified::Completed(url)
            | Classified::Search(url) => url,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            Classified::NewTab => NEW_TAB_URL.to_string(),
            Classified::PassThrough(url)
            | Classified::Completed(url)
            | Classified::Search(url) => url,
        }
    }
}

/// Classifies raw address-bar text. The first matching rule wins.
pub fn classify(input: &str, engine: SearchEngine) -> Classified {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Classified::NewTab;
    }
    if has_known_scheme(trimmed) {
        return Classified::PassThrough(trimmed.to_string());
    }
    if looks_like_host(trimmed) {
        return Classified::Completed(format!("https://{}", trimmed));
    }
    Classified::Search(search_url(trimmed, engine))
}

/// Shorthand for `classify(input, engine).into_url()`.
pub fn resolve(input: &str, engine: SearchEngine) -> String {
    classify(input, engine).into_url()
}

pub fn has_known_scheme(input: &str) -> bool {
    PASS_THROUGH_PREFIXES.iter().any(|p| input.starts_with(p))
}

/// True when the input has no whitespace and ends in an allow-listed suffix
/// with at least one character before it.
pub fn looks_like_host(input: &str) -> bool {
    if input.chars().any(char::is_whitespace) {
        return false;
    }
    COMPLETION_SUFFIXES
        .iter()
        .any(|tld| input.len() > tld.len() && input.ends_with(tld))
}

/// Builds the query URL for `query` on the given engine.
pub fn search_url(query: &str, engine: SearchEngine) -> String {
    let mut url = String::from(engine.query_prefix());
    url.push_str(&encode_query(query));
    url
}

/// Form-style encoding: ASCII alphanumerics pass through, space becomes `+`,
/// every other byte becomes `%XX`.
pub fn encode_query(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(b as char),
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0xf) as usize]));
            }
        }
    }
    out
}

/// Provisional tab title for a URL until the engine reports the real one.
pub fn display_title(url: &str) -> String {
    if let Some(page) = url.strip_prefix(INTERNAL_PREFIX) {
        return match page.trim_end_matches('/') {
            "newtab" => "New Tab".to_string(),
            "settings" => "Settings".to_string(),
            "history" => "History".to_string(),
            "setup" => "Welcome".to_string(),
            other => other.to_string(),
        };
    }
    let host = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(url);
    if host.is_empty() {
        url.to_string()
    } else {
        host.to_string()
    }
}

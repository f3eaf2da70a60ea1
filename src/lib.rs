//! Driftwood, a desktop browser shell around the system web engine.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod cli;
pub mod database;
pub mod engine;
pub mod managers;
pub mod platform;
pub mod resources;
pub mod services;
pub mod shell;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;

/// Reserved scheme for built-in pages.
pub const INTERNAL_SCHEME: &str = "drift";

/// Prefix shared by every built-in page URL.
pub const INTERNAL_PREFIX: &str = "drift://";

/// URL of the built-in new tab page.
pub const NEW_TAB_URL: &str = "drift://newtab";

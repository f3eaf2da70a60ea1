// Driftwood services
// Services provide stateless or self-contained functionality: address-bar
// classification, settings persistence, theming and the built-in pages.

pub mod internal_pages;
pub mod settings_store;
pub mod theme_engine;
pub mod url_classifier;

//! Theme engine: resolves dark/light/system themes into CSS variables for
//! the chrome and the built-in pages.

use std::collections::BTreeMap;

use crate::types::errors::ThemeError;
use crate::types::settings::{is_valid_hex_color, ThemeMode};

/// Trait defining the theme engine interface.
pub trait ThemeEngineTrait {
    fn set_theme(&mut self, mode: ThemeMode);
    fn get_theme(&self) -> ThemeMode;
    fn set_accent_color(&mut self, color: &str) -> Result<(), ThemeError>;
    fn get_accent_color(&self) -> &str;
    fn detect_system_theme(&self) -> ThemeMode;
    fn get_css_variables(&self) -> BTreeMap<&'static str, String>;
}

struct Palette {
    bg_primary: &'static str,
    bg_secondary: &'static str,
    bg_input: &'static str,
    text_primary: &'static str,
    text_secondary: &'static str,
    border: &'static str,
    hover_bg: &'static str,
    danger: &'static str,
}

const DARK: Palette = Palette {
    bg_primary: "#0f172a",
    bg_secondary: "#1e293b",
    bg_input: "#0b1222",
    text_primary: "#e2e8f0",
    text_secondary: "#94a3b8",
    border: "#334155",
    hover_bg: "#273449",
    danger: "#ef4444",
};

const LIGHT: Palette = Palette {
    bg_primary: "#ffffff",
    bg_secondary: "#f1f5f9",
    bg_input: "#ffffff",
    text_primary: "#1e293b",
    text_secondary: "#64748b",
    border: "#cbd5e1",
    hover_bg: "#e2e8f0",
    danger: "#dc2626",
};

/// The theme engine implementation.
pub struct ThemeEngine {
    current_theme: ThemeMode,
    accent_color: String,
}

impl ThemeEngine {
    pub fn new(mode: ThemeMode, accent_color: &str) -> Self {
        let accent_color = if is_valid_hex_color(accent_color) {
            accent_color.to_string()
        } else {
            crate::types::settings::Settings::default().accent_color
        };
        Self {
            current_theme: mode,
            accent_color,
        }
    }

    /// Returns the effective theme, resolving `System` to a concrete mode.
    pub fn effective_theme(&self) -> ThemeMode {
        match self.current_theme {
            ThemeMode::System => self.detect_system_theme(),
            other => other,
        }
    }

    /// The variables as a `:root { ... }` rule.
    pub fn css_root_rule(&self) -> String {
        let mut css = String::from(":root{");
        for (name, value) in self.get_css_variables() {
            css.push_str(name);
            css.push(':');
            css.push_str(&value);
            css.push(';');
        }
        css.push('}');
        css
    }
}

impl ThemeEngineTrait for ThemeEngine {
    fn set_theme(&mut self, mode: ThemeMode) {
        self.current_theme = mode;
    }

    fn get_theme(&self) -> ThemeMode {
        self.current_theme
    }

    fn set_accent_color(&mut self, color: &str) -> Result<(), ThemeError> {
        if !is_valid_hex_color(color) {
            return Err(ThemeError::InvalidColor(color.to_string()));
        }
        self.accent_color = color.to_string();
        Ok(())
    }

    fn get_accent_color(&self) -> &str {
        &self.accent_color
    }

    fn detect_system_theme(&self) -> ThemeMode {
        // Without toolkit access the GTK_THEME variable is the only hint.
        match std::env::var("GTK_THEME") {
            Ok(name) if !name.to_lowercase().contains("dark") => ThemeMode::Light,
            _ => ThemeMode::Dark,
        }
    }

    fn get_css_variables(&self) -> BTreeMap<&'static str, String> {
        let p = match self.effective_theme() {
            ThemeMode::Light => &LIGHT,
            _ => &DARK,
        };
        let mut vars = BTreeMap::new();
        vars.insert("--bg-primary", p.bg_primary.to_string());
        vars.insert("--bg-secondary", p.bg_secondary.to_string());
        vars.insert("--input-bg", p.bg_input.to_string());
        vars.insert("--text-primary", p.text_primary.to_string());
        vars.insert("--text-secondary", p.text_secondary.to_string());
        vars.insert("--border-color", p.border.to_string());
        vars.insert("--hover-bg", p.hover_bg.to_string());
        vars.insert("--danger-color", p.danger.to_string());
        vars.insert("--accent-color", self.accent_color.clone());
        vars.insert(
            "--font-family",
            "-apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif".to_string(),
        );
        vars
    }
}

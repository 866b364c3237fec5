//! Display settings owned by the host: the persisted theme flag and the
//! periodic contrast toggle. Neither ever feeds back into the simulation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage key holding the selected theme name.
pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored / DOM attribute value. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Theme> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Flat string key-value storage (browser local storage in the web shell).
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str);
}

/// In-memory store, used natively and as a fallback when local storage is
/// unavailable (private browsing, sandboxed iframes).
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_owned(), value.to_owned());
    }
}

/// Theme persistence on top of any [`KeyValueStore`].
pub struct ThemeSettings<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ThemeSettings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Previously chosen theme; `None` means the player has not picked one yet
    /// (the shell then shows the theme-choice overlay).
    pub fn load(&self) -> Option<Theme> {
        let raw = self.store.get_item(THEME_KEY)?;
        let theme = Theme::parse(&raw);
        if theme.is_none() {
            log::warn!("ignoring unknown stored theme {raw:?}");
        }
        theme
    }

    pub fn save(&mut self, theme: Theme) {
        self.store.set_item(THEME_KEY, theme.as_str());
        log::info!("theme set to {}", theme.as_str());
    }
}

/// Flips the contrast flag every `period_s` seconds of accumulated play time.
#[derive(Clone, Debug)]
pub struct ContrastCycle {
    period_s: f64,
    elapsed_s: f64,
    enabled: bool,
}

impl ContrastCycle {
    pub fn new(period_s: f64) -> Self {
        Self {
            period_s,
            elapsed_s: 0.0,
            enabled: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Advance by `dt_s`. Returns the new flag when it toggled this call.
    pub fn advance(&mut self, dt_s: f64) -> Option<bool> {
        self.elapsed_s += dt_s;
        if self.elapsed_s >= self.period_s {
            self.enabled = !self.enabled;
            self.elapsed_s = 0.0;
            Some(self.enabled)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_s = 0.0;
        self.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse_roundtrips_names() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse(" Light "), Some(Theme::Light));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::Dark.as_str(), "dark");
    }

    #[test]
    fn test_missing_theme_loads_none() {
        let settings = ThemeSettings::new(MemoryStore::default());
        assert_eq!(settings.load(), None);
    }

    #[test]
    fn test_saved_theme_is_loaded() {
        let mut settings = ThemeSettings::new(MemoryStore::default());
        settings.save(Theme::Dark);
        assert_eq!(settings.load(), Some(Theme::Dark));
    }

    #[test]
    fn test_garbage_theme_is_ignored() {
        let mut store = MemoryStore::default();
        store.set_item(THEME_KEY, "neon");
        let settings = ThemeSettings::new(store);
        assert_eq!(settings.load(), None);
    }

    #[test]
    fn test_contrast_cycle_toggles_each_period() {
        let mut cycle = ContrastCycle::new(15.0);
        assert_eq!(cycle.advance(10.0), None);
        assert_eq!(cycle.advance(5.0), Some(true));
        assert!(cycle.enabled());
        assert_eq!(cycle.advance(14.9), None);
        assert_eq!(cycle.advance(0.2), Some(false));
        cycle.advance(20.0);
        cycle.reset();
        assert!(!cycle.enabled());
    }
}

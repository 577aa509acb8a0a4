//! Game settings and preferences
//!
//! Persisted separately from the player save.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    pub fn filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === HUD ===
    /// Health bars over damaged enemies and plants
    pub show_health_bars: bool,
    /// Level badge on placed plants
    pub show_plant_levels: bool,
    /// Range circle around every placed plant
    pub show_ranges: bool,

    // === Simulation ===
    /// Longest frame delta fed to the simulation (ms). Long stalls such as
    /// a backgrounded tab are clamped to this.
    pub max_frame_ms: f32,

    // === Accessibility ===
    /// Reduced motion (no attack jitter, no floating coins)
    pub reduced_motion: bool,

    // === Diagnostics ===
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_health_bars: true,
            show_plant_levels: true,
            show_ranges: false,

            max_frame_ms: 100.0,

            reduced_motion: false,

            log_level: LogLevel::Info,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "symbiosis_settings";

    /// Frame delta after clamping
    pub fn clamp_frame(&self, dt_ms: f32) -> f32 {
        dt_ms.clamp(0.0, self.max_frame_ms.max(1.0))
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Ok(Some(json)) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {}", e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            reduced_motion: true,
            log_level: LogLevel::Debug,
            ..Default::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, r#"{"show_ranges": true}"#);
        let settings = Settings::load(&store);
        assert!(settings.show_ranges);
        assert!(settings.show_health_bars);
        assert_eq!(settings.max_frame_ms, 100.0);
    }

    #[test]
    fn test_malformed_settings_use_defaults() {
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, "{{{");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_frame_clamp() {
        let settings = Settings::default();
        assert_eq!(settings.clamp_frame(16.0), 16.0);
        assert_eq!(settings.clamp_frame(5000.0), 100.0);
        assert_eq!(settings.clamp_frame(-3.0), 0.0);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::from_str("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("trace"), None);
        assert_eq!(LogLevel::Debug.filter(), log::LevelFilter::Debug);
    }
}

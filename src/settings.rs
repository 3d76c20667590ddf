//! Game settings and preferences
//!
//! Persisted separately from tuning in LocalStorage.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Next preset, wrapping from High back to Low
    pub fn next(&self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 400,
            QualityPreset::Medium => 2000,
            QualityPreset::High => 6000,
        }
    }

    /// Fraction of each body trail that gets drawn (1.0 = full)
    pub fn trail_quality(&self) -> f64 {
        match self {
            QualityPreset::Low => 0.25,
            QualityPreset::Medium => 0.6,
            QualityPreset::High => 1.0,
        }
    }

    /// Whether bodies get a glow (shadow blur)
    pub fn glow_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on eliminations and match end
    pub screen_shake: bool,
    /// Body trails
    pub trails: bool,
    /// Particle effects (exhaust, bursts)
    pub particles: bool,
    /// Color flash overlay
    pub flash: bool,
    /// Lines between bodies that pull on each other
    pub gravity_lines: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            trails: true,
            particles: true,
            flash: true,
            gravity_lines: true,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset drops the costliest overlay
        if preset == QualityPreset::Low {
            self.gravity_lines = false;
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "grav_arena_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        match storage {
            Some(storage) => {
                self.write_with(|key, json| storage.set_item(key, json));
            }
            None => log::warn!("LocalStorage unavailable; settings not saved"),
        }
    }

    /// Serialize and hand the JSON to `write`. Returns whether it stuck.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn write_with<E: std::fmt::Debug>(&self, write: impl FnOnce(&str, &str) -> Result<(), E>) -> bool {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not serialize settings: {}", e);
                return false;
            }
        };
        match write(Self::STORAGE_KEY, &json) {
            Ok(()) => {
                log::info!("Settings saved");
                true
            }
            Err(err) => {
                log::warn!("Saving settings failed: {:?}", err);
                false
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::parse("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::Low.as_str(), "Low");
        assert_eq!(QualityPreset::High.next(), QualityPreset::Low);
        assert_eq!(QualityPreset::Low.next(), QualityPreset::Medium);
    }

    #[test]
    fn test_particles_toggle_zeroes_cap() {
        let mut settings = Settings::from_preset(QualityPreset::Low);
        assert!(!settings.gravity_lines);
        assert_eq!(settings.max_particles(), 400);
        settings.particles = false;
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_partial_json() {
        let settings = Settings::from_json(r#"{ "quality": "High" }"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert!(settings.screen_shake);
    }

    #[test]
    fn test_failed_write_is_reported() {
        let settings = Settings::from_preset(QualityPreset::High);
        assert!(!settings.write_with(|_, _| Err("QuotaExceededError")));

        let mut stored = None;
        assert!(settings.write_with(|key, json| {
            stored = Some((key.to_string(), json.to_string()));
            Ok::<(), ()>(())
        }));
        let (key, json) = stored.unwrap();
        assert_eq!(key, "grav_arena_settings");
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}

//! Game settings and preferences
//!
//! Persisted in LocalStorage separately from level documents. Settings only
//! change presentation; gameplay never reads them.

use serde::{Deserialize, Serialize};

use crate::sim::EffectsConfig;

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

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particles per death burst for this preset
    pub fn death_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 40,
            QualityPreset::High => 80,
        }
    }

    /// Whether background grid lines are drawn
    pub fn grid_lines(&self) -> bool {
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
    /// Death burst particles
    pub particles: bool,
    /// White flash on death
    pub screen_flash: bool,
    /// Expanding ring on death
    pub shockwave: bool,

    // === HUD ===
    pub show_progress: bool,
    pub show_attempts: bool,

    // === Accessibility ===
    /// Reduced motion (no flash or shockwave)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            screen_flash: true,
            shockwave: true,

            show_progress: true,
            show_attempts: true,

            reduced_motion: false,
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

        // Low preset skips the ring for performance
        if preset == QualityPreset::Low {
            self.shockwave = false;
        }
    }

    /// Effective screen flash (respects reduced_motion)
    pub fn effective_screen_flash(&self) -> bool {
        self.screen_flash && !self.reduced_motion
    }

    /// Effective shockwave (respects reduced_motion)
    pub fn effective_shockwave(&self) -> bool {
        self.shockwave && !self.reduced_motion
    }

    /// Effective death particle count
    pub fn death_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.death_particles()
        }
    }

    /// Death visuals to hand to the attempt controller
    pub fn effects(&self) -> EffectsConfig {
        EffectsConfig {
            particles: self.death_particles(),
            shockwave: self.effective_shockwave(),
            flash: self.effective_screen_flash(),
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "dash_runner_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
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

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
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

//! Game settings and preferences
//!
//! Persisted separately from player progress. Orthogonal to the simulation
//! apart from the difficulty multiplier lookup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::StoreError;
use crate::sim::Difficulty;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    // === Feedback ===
    pub sound_enabled: bool,
    pub haptic_enabled: bool,

    // === Gameplay ===
    /// Preferred difficulty for newly offered levels
    pub difficulty: Difficulty,

    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    /// Tutorial already shown
    #[serde(default)]
    pub onboarding_completed: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            haptic_enabled: true,
            difficulty: Difficulty::Normal,
            music_volume: 0.7,
            sfx_volume: 0.8,
            onboarding_completed: false,
        }
    }
}

impl GameSettings {
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Multiplier for the preferred difficulty
    pub fn difficulty_multiplier(&self) -> f64 {
        self.difficulty.multiplier()
    }

    /// Clamp fields a hand-edited file may have pushed out of range
    fn sanitized(mut self) -> Self {
        self.set_music_volume(self.music_volume);
        self.set_sfx_volume(self.sfx_volume);
        self
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<GameSettings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Malformed settings at {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

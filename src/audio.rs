//! Audio/haptics collaborator interface
//!
//! The simulation only notifies; playback success never feeds back into
//! game state.

use crate::settings::GameSettings;
use crate::sim::{GameEvent, LevelType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Tap landed on the beat
    TapOnBeat,
    /// Tap missed the beat window
    TapOffBeat,
    /// Energy pickup collected
    Collect,
    /// Ship hit an obstacle
    Hit,
    /// Session ended
    GameOver,
}

impl SoundEffect {
    /// Map a simulation event to its cue
    pub fn for_event(event: &GameEvent) -> Self {
        match event {
            GameEvent::TapOnBeat => SoundEffect::TapOnBeat,
            GameEvent::TapOffBeat => SoundEffect::TapOffBeat,
            GameEvent::Collected { .. } => SoundEffect::Collect,
            GameEvent::Hit { .. } => SoundEffect::Hit,
            GameEvent::GameOver => SoundEffect::GameOver,
        }
    }
}

/// Haptic feedback strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPulse {
    Light,
    Heavy,
}

impl HapticPulse {
    /// Events that buzz the device; taps and collections stay silent
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Hit { .. } => Some(HapticPulse::Heavy),
            GameEvent::GameOver => Some(HapticPulse::Light),
            _ => None,
        }
    }
}

/// Background music per level theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTheme {
    Menu,
    Hourglass,
    Sundial,
    Calendar,
}

impl From<LevelType> for MusicTheme {
    fn from(level_type: LevelType) -> Self {
        match level_type {
            LevelType::Hourglass => MusicTheme::Hourglass,
            LevelType::Sundial => MusicTheme::Sundial,
            LevelType::Calendar => MusicTheme::Calendar,
        }
    }
}

/// Playback capability injected into the simulator
pub trait AudioSink {
    fn play_effect(&mut self, effect: SoundEffect);
    fn play_music(&mut self, theme: MusicTheme, volume: f32);
    fn stop(&mut self);

    /// Devices without a vibration motor ignore this
    fn haptic(&mut self, _pulse: HapticPulse) {}
}

/// Discards everything (headless runs, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_effect(&mut self, _effect: SoundEffect) {}
    fn play_music(&mut self, _theme: MusicTheme, _volume: f32) {}
    fn stop(&mut self) {}
}

/// Applies the player's sound and haptic preferences before forwarding to a backend
#[derive(Debug, Clone)]
pub struct SettingsAudio<A> {
    inner: A,
    sound_enabled: bool,
    haptic_enabled: bool,
    music_volume: f32,
    sfx_volume: f32,
}

impl<A: AudioSink> SettingsAudio<A> {
    pub fn new(inner: A, settings: &GameSettings) -> Self {
        let mut audio = Self {
            inner,
            sound_enabled: true,
            haptic_enabled: true,
            music_volume: 1.0,
            sfx_volume: 1.0,
        };
        audio.apply(settings);
        audio
    }

    /// Re-read preferences (after the settings screen changes them)
    pub fn apply(&mut self, settings: &GameSettings) {
        self.sound_enabled = settings.sound_enabled;
        self.haptic_enabled = settings.haptic_enabled;
        self.music_volume = settings.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        if !self.sound_enabled {
            self.inner.stop();
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: AudioSink> AudioSink for SettingsAudio<A> {
    fn play_effect(&mut self, effect: SoundEffect) {
        if !self.sound_enabled || self.sfx_volume <= 0.0 {
            return;
        }
        self.inner.play_effect(effect);
    }

    fn play_music(&mut self, theme: MusicTheme, volume: f32) {
        if !self.sound_enabled {
            return;
        }
        self.inner.play_music(theme, volume * self.music_volume);
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn haptic(&mut self, pulse: HapticPulse) {
        if self.haptic_enabled {
            self.inner.haptic(pulse);
        }
    }
}

/// Records calls, for asserting collaborator traffic in tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingAudio {
    pub effects: Vec<SoundEffect>,
    pub music: Vec<(MusicTheme, f32)>,
    pub stops: u32,
    pub haptics: Vec<HapticPulse>,
}

#[cfg(test)]
impl AudioSink for RecordingAudio {
    fn play_effect(&mut self, effect: SoundEffect) {
        self.effects.push(effect);
    }

    fn play_music(&mut self, theme: MusicTheme, volume: f32) {
        self.music.push((theme, volume));
    }

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn haptic(&mut self, pulse: HapticPulse) {
        self.haptics.push(pulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_settings_drop_effects() {
        let settings = GameSettings {
            sound_enabled: false,
            ..Default::default()
        };
        let mut audio = SettingsAudio::new(RecordingAudio::default(), &settings);
        audio.play_effect(SoundEffect::Hit);
        audio.play_music(MusicTheme::Sundial, 1.0);
        assert!(audio.inner().effects.is_empty());
        assert!(audio.inner().music.is_empty());
        assert_eq!(audio.inner().stops, 1);
    }

    #[test]
    fn test_haptics_follow_preference() {
        let mut settings = GameSettings::default();
        let mut audio = SettingsAudio::new(RecordingAudio::default(), &settings);
        audio.haptic(HapticPulse::Heavy);
        assert_eq!(audio.inner().haptics, vec![HapticPulse::Heavy]);

        settings.haptic_enabled = false;
        audio.apply(&settings);
        audio.haptic(HapticPulse::Light);
        assert_eq!(audio.inner().haptics, vec![HapticPulse::Heavy]);

        // Sound mute does not silence haptics
        let muted = GameSettings {
            sound_enabled: false,
            ..Default::default()
        };
        let mut audio = SettingsAudio::new(RecordingAudio::default(), &muted);
        audio.haptic(HapticPulse::Heavy);
        assert_eq!(audio.inner().haptics.len(), 1);
    }

    #[test]
    fn test_music_volume_scaled() {
        let mut settings = GameSettings::default();
        settings.set_music_volume(0.5);
        let mut audio = SettingsAudio::new(RecordingAudio::default(), &settings);
        audio.play_music(MusicTheme::Calendar, 0.8);
        let (theme, volume) = audio.inner().music[0];
        assert_eq!(theme, MusicTheme::Calendar);
        assert!((volume - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Collected {
                pickup_id: 1,
                value: 10
            }),
            SoundEffect::Collect
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::GameOver), SoundEffect::GameOver);
        assert_eq!(
            HapticPulse::for_event(&GameEvent::Hit { obstacle_id: 3 }),
            Some(HapticPulse::Heavy)
        );
        assert_eq!(HapticPulse::for_event(&GameEvent::TapOnBeat), None);
    }
}

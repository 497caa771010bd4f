//! Chrono Pulse - A rhythm lane runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rhythm clock, spawning, collisions, session tick)
//! - `scoring`: Action scoring rules
//! - `progression`: Cross-session progress, unlocks and adaptive difficulty
//! - `persistence`: Progress store abstraction (memory / JSON file)
//! - `settings`: Player preferences
//! - `audio`: Audio/haptics collaborator interface

pub mod audio;
pub mod persistence;
pub mod progression;
pub mod scoring;
pub mod settings;
pub mod sim;

pub use audio::{AudioSink, HapticPulse, MusicTheme, NullAudio, SoundEffect};
pub use progression::{PlayerProgress, ProgressionTracker};
pub use settings::GameSettings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz reference cadence)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Base tempo before level and difficulty multipliers
    pub const BASE_BPM: f32 = 120.0;
    /// Default on-beat tolerance (seconds either side of the beat)
    pub const BEAT_TOLERANCE: f32 = 0.1;

    // Lane bounds in reference UI coordinates
    pub const LANE_SPAWN_X: f32 = 450.0;
    pub const LANE_EXIT_X: f32 = -50.0;
    pub const LANE_MIN_Y: f32 = 50.0;
    pub const LANE_MAX_Y: f32 = 350.0;

    // Ship defaults
    pub const SHIP_START_X: f32 = 100.0;
    pub const SHIP_START_Y: f32 = 200.0;
    /// Half extent of the ship's collision box (40x40)
    pub const SHIP_HALF_EXTENT: f32 = 20.0;
    pub const SHIP_MAX_ENERGY: f32 = 100.0;

    // Obstacle defaults
    pub const OBSTACLE_SIZE: f32 = 40.0;
    pub const OBSTACLE_SPEED: f32 = -150.0;
    /// Energy drained by an obstacle hit
    pub const OBSTACLE_DAMAGE: f32 = 20.0;
    /// Invincibility window after a hit (seconds)
    pub const INVINCIBILITY_DURATION: f32 = 1.0;

    // Pickup defaults
    pub const PICKUP_SPEED: f32 = -100.0;
    pub const PICKUP_VALUE: u32 = 10;
    pub const COLLECTION_RADIUS: f32 = 30.0;

    /// Per-tick spawn probabilities before difficulty scaling
    pub const OBSTACLE_SPAWN_CHANCE: f64 = 0.02;
    pub const PICKUP_SPAWN_CHANCE: f64 = 0.015;

    // Tap scoring
    pub const TAP_POINTS_ON_BEAT: f64 = 50.0;
    pub const TAP_POINTS_OFF_BEAT: f64 = 25.0;
}

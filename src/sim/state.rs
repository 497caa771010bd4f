//! Game state and core simulation types
//!
//! Everything a running session mutates lives here. The session is the single
//! authoritative copy; the presentation layer only reads it between ticks.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rhythm::RhythmClock;
use crate::consts::*;

/// Level themes, in unlock order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelType {
    Hourglass,
    Sundial,
    Calendar,
}

impl LevelType {
    pub const ALL: [LevelType; 3] = [LevelType::Hourglass, LevelType::Sundial, LevelType::Calendar];

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelType::Hourglass => "hourglass",
            LevelType::Sundial => "sundial",
            LevelType::Calendar => "calendar",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hourglass" => Some(LevelType::Hourglass),
            "sundial" => Some(LevelType::Sundial),
            "calendar" => Some(LevelType::Calendar),
            _ => None,
        }
    }

    /// Tempo multiplier applied on top of the base BPM
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            LevelType::Hourglass => 1.0,
            LevelType::Sundial => 1.2,
            LevelType::Calendar => 1.5,
        }
    }

    /// Next theme in unlock order (None after the last one)
    pub fn next(&self) -> Option<Self> {
        match self {
            LevelType::Hourglass => Some(LevelType::Sundial),
            LevelType::Sundial => Some(LevelType::Calendar),
            LevelType::Calendar => None,
        }
    }

    /// Default session length in seconds
    pub fn duration(&self) -> f32 {
        match self {
            LevelType::Hourglass => 60.0,
            LevelType::Sundial => 90.0,
            LevelType::Calendar => 120.0,
        }
    }

    fn base_target(&self) -> u64 {
        match self {
            LevelType::Hourglass => 500,
            LevelType::Sundial => 800,
            LevelType::Calendar => 1200,
        }
    }
}

/// Difficulty tiers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Scales tempo, spawn rates and points
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.3,
        }
    }

    /// One notch up, capped at Hard
    pub fn harder(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One notch down, capped at Easy
    pub fn easier(&self) -> Self {
        match self {
            Difficulty::Easy | Difficulty::Normal => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Normal,
        }
    }

    fn target_factor(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Normal => 1.5,
            Difficulty::Hard => 2.0,
        }
    }
}

/// Composite unlock key, rendered as `"<type>_<difficulty>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelKey {
    pub level_type: LevelType,
    pub difficulty: Difficulty,
}

impl LevelKey {
    /// Always unlocked, even with no stored progress
    pub const DEFAULT: LevelKey = LevelKey {
        level_type: LevelType::Hourglass,
        difficulty: Difficulty::Easy,
    };

    pub fn new(level_type: LevelType, difficulty: Difficulty) -> Self {
        Self {
            level_type,
            difficulty,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (ty, diff) = s.trim().split_once('_')?;
        Some(Self::new(LevelType::from_str(ty)?, Difficulty::from_str(diff)?))
    }

    /// The level unlocked by completing this one
    ///
    /// Easy -> Normal -> Hard within a theme, then Hard -> Easy of the next theme.
    pub fn follow_on(&self) -> Option<Self> {
        match self.difficulty {
            Difficulty::Easy => Some(Self::new(self.level_type, Difficulty::Normal)),
            Difficulty::Normal => Some(Self::new(self.level_type, Difficulty::Hard)),
            Difficulty::Hard => self
                .level_type
                .next()
                .map(|next| Self::new(next, Difficulty::Easy)),
        }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.level_type.as_str(), self.difficulty.as_str())
    }
}

/// A playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub level_type: LevelType,
    pub difficulty: Difficulty,
    /// Session length (seconds)
    pub duration: f32,
    pub target_score: u64,
    pub best_score: u64,
    pub unlocked: bool,
    pub completed: bool,
}

impl Level {
    /// Create a level with its default duration and target score
    pub fn new(level_type: LevelType, difficulty: Difficulty) -> Self {
        let target = (level_type.base_target() as f32 * difficulty.target_factor()).round() as u64;
        Self {
            level_type,
            difficulty,
            duration: level_type.duration(),
            target_score: target,
            best_score: 0,
            unlocked: LevelKey::new(level_type, difficulty) == LevelKey::DEFAULT,
            completed: false,
        }
    }

    pub fn key(&self) -> LevelKey {
        LevelKey::new(self.level_type, self.difficulty)
    }

    /// Session tempo: base BPM x theme speed x difficulty
    pub fn bpm(&self) -> f32 {
        BASE_BPM * self.level_type.speed_multiplier() * self.difficulty.multiplier() as f32
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    pub energy: f32,
    pub max_energy: f32,
    pub invincible: bool,
    /// Seconds left in the invincibility window
    pub invincibility_remaining: f32,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            pos: Vec2::new(SHIP_START_X, SHIP_START_Y),
            vel: Vec2::ZERO,
            energy: SHIP_MAX_ENERGY,
            max_energy: SHIP_MAX_ENERGY,
            invincible: false,
            invincibility_remaining: 0.0,
        }
    }
}

impl Ship {
    pub fn drain_energy(&mut self, amount: f32) {
        self.energy = (self.energy - amount).clamp(0.0, self.max_energy);
    }

    pub fn add_energy(&mut self, amount: f32) {
        self.energy = (self.energy + amount).clamp(0.0, self.max_energy);
    }

    pub fn is_depleted(&self) -> bool {
        self.energy <= 0.0
    }

    pub fn activate_invincibility(&mut self, duration: f32) {
        self.invincible = true;
        self.invincibility_remaining = duration;
    }

    /// Count down the invincibility window
    pub fn update_invincibility(&mut self, dt: f32) {
        if !self.invincible {
            return;
        }
        self.invincibility_remaining -= dt;
        if self.invincibility_remaining <= 0.0 {
            self.invincibility_remaining = 0.0;
            self.invincible = false;
        }
    }
}

/// An obstacle drifting down the lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
}

/// An energy pickup drifting down the lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyPickup {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Energy restored and points awarded on collection
    pub value: u32,
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Active gameplay
    Playing,
    /// Frozen; ticks and taps are ignored
    Paused,
    /// Run ended
    GameOver,
}

/// Discrete events for audio/haptics collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TapOnBeat,
    TapOffBeat,
    Collected { pickup_id: u32, value: u32 },
    Hit { obstacle_id: u32 },
    GameOver,
}

/// One playthrough of a level
#[derive(Debug, Clone)]
pub struct GameSession {
    pub level: Level,
    /// Run seed for reproducibility
    pub seed: u64,
    pub ship: Ship,
    /// Active obstacles, in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Active pickups, in spawn order
    pub pickups: Vec<EnergyPickup>,
    pub score: u64,
    pub time_remaining: f32,
    /// Seconds of simulated play
    pub clock: f32,
    pub phase: SessionPhase,
    pub rhythm: RhythmClock,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameSession {
    /// Create a new session for `level` with the given seed
    pub fn new(level: Level, seed: u64) -> Self {
        let rhythm = RhythmClock::new(level.bpm());
        Self {
            time_remaining: level.duration,
            level,
            seed,
            ship: Ship::default(),
            obstacles: Vec::new(),
            pickups: Vec::new(),
            score: 0,
            clock: 0.0,
            phase: SessionPhase::Playing,
            rhythm,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn difficulty_multiplier(&self) -> f64 {
        self.level.difficulty.multiplier()
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bpm() {
        let level = Level::new(LevelType::Calendar, Difficulty::Hard);
        assert!((level.bpm() - 120.0 * 1.5 * 1.3).abs() < 0.001);

        let level = Level::new(LevelType::Hourglass, Difficulty::Normal);
        assert!((level.bpm() - 120.0).abs() < 0.001);
    }

    #[test]
    fn test_level_defaults() {
        let level = Level::new(LevelType::Sundial, Difficulty::Hard);
        assert_eq!(level.duration, 90.0);
        assert_eq!(level.target_score, 1600);
        assert!(!level.unlocked);
        assert!(Level::new(LevelType::Hourglass, Difficulty::Easy).unlocked);
    }

    #[test]
    fn test_level_key_format() {
        let key = LevelKey::new(LevelType::Sundial, Difficulty::Normal);
        assert_eq!(key.to_string(), "sundial_normal");
        assert_eq!(LevelKey::parse("sundial_normal"), Some(key));
        assert_eq!(LevelKey::parse("Sundial_Normal"), Some(key));
        assert_eq!(LevelKey::parse("sundial"), None);
        assert_eq!(LevelKey::parse("moon_easy"), None);
        assert_eq!(LevelKey::parse(""), None);
    }

    #[test]
    fn test_follow_on() {
        let k = |t, d| LevelKey::new(t, d);
        use Difficulty::*;
        use LevelType::*;
        assert_eq!(k(Hourglass, Easy).follow_on(), Some(k(Hourglass, Normal)));
        assert_eq!(k(Hourglass, Normal).follow_on(), Some(k(Hourglass, Hard)));
        assert_eq!(k(Hourglass, Hard).follow_on(), Some(k(Sundial, Easy)));
        assert_eq!(k(Sundial, Hard).follow_on(), Some(k(Calendar, Easy)));
        assert_eq!(k(Calendar, Hard).follow_on(), None);
    }

    #[test]
    fn test_difficulty_steps_are_capped() {
        assert_eq!(Difficulty::Hard.harder(), Difficulty::Hard);
        assert_eq!(Difficulty::Easy.easier(), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.harder(), Difficulty::Normal);
        assert_eq!(Difficulty::Hard.easier(), Difficulty::Normal);
    }

    #[test]
    fn test_ship_energy_clamps() {
        let mut ship = Ship::default();
        ship.drain_energy(250.0);
        assert_eq!(ship.energy, 0.0);
        assert!(ship.is_depleted());

        ship.add_energy(500.0);
        assert_eq!(ship.energy, ship.max_energy);
    }

    #[test]
    fn test_drain_clamps_before_add() {
        let mut ship = Ship {
            energy: 15.0,
            ..Ship::default()
        };
        ship.drain_energy(20.0);
        assert_eq!(ship.energy, 0.0);
        ship.add_energy(10.0);
        assert_eq!(ship.energy, 10.0);
    }

    #[test]
    fn test_invincibility_countdown() {
        let mut ship = Ship::default();
        ship.activate_invincibility(1.0);
        ship.update_invincibility(0.6);
        assert!(ship.invincible);
        ship.update_invincibility(0.4);
        assert!(!ship.invincible);
        assert_eq!(ship.invincibility_remaining, 0.0);
    }

    #[test]
    fn test_session_starts_playing() {
        let level = Level::new(LevelType::Hourglass, Difficulty::Easy);
        let session = GameSession::new(level.clone(), 7);
        assert_eq!(session.phase, SessionPhase::Playing);
        assert_eq!(session.time_remaining, level.duration);
        assert_eq!(session.score, 0);
        assert!(session.obstacles.is_empty());
        assert!(session.pickups.is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn drain_then_add_matches_single_clamp(
                start in 0.0f32..=100.0,
                a in 0.0f32..=200.0,
                b in 0.0f32..=200.0,
            ) {
                let mut ship = Ship { energy: start, ..Ship::default() };
                ship.drain_energy(a);
                ship.add_energy(b);
                prop_assert!(ship.energy >= 0.0 && ship.energy <= ship.max_energy);

                // Each step clamps on its own
                let expected = ((start - a).clamp(0.0, ship.max_energy) + b).min(ship.max_energy);
                prop_assert!((ship.energy - expected).abs() < 1e-3);

                // Matches a single net clamp when neither bound was crossed
                if start - a >= 0.0 && start - a + b <= ship.max_energy {
                    prop_assert!((ship.energy - (start - a + b)).abs() < 1e-3);
                }
            }
        }
    }
}

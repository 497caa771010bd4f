//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host-driven fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod rhythm;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionReport, resolve, ship_obstacle_collision, ship_pickup_collision};
pub use rhythm::{BeatStatus, RhythmClock, calculate_rhythm_accuracy};
pub use spawn::{LaneBounds, SpawnResult, try_spawn};
pub use state::{
    Difficulty, EnergyPickup, GameEvent, GameSession, Level, LevelKey, LevelType, Obstacle,
    SessionPhase, Ship,
};
pub use tick::{SessionSimulator, SessionSummary, TapOutcome, TickOutcome, handle_tap, pause, resume, tick};

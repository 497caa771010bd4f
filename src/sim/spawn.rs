//! Probabilistic spawning of obstacles and pickups
//!
//! Rolled once per tick against the session RNG. Spawn chance scales
//! linearly with the difficulty multiplier.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Lane geometry in reference UI coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneBounds {
    /// Far edge where entities appear
    pub spawn_x: f32,
    /// Entities left of this are dropped
    pub exit_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for LaneBounds {
    fn default() -> Self {
        Self {
            spawn_x: LANE_SPAWN_X,
            exit_x: LANE_EXIT_X,
            min_y: LANE_MIN_Y,
            max_y: LANE_MAX_Y,
        }
    }
}

impl LaneBounds {
    /// True once an entity has left the lane
    #[inline]
    pub fn has_exited(&self, pos: Vec2) -> bool {
        pos.x < self.exit_x
    }
}

/// Spawn parameters for a new obstacle (ID assigned by the session)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSpawn {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
}

/// Spawn parameters for a new pickup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupSpawn {
    pub pos: Vec2,
    pub vel: Vec2,
    pub value: u32,
}

/// Outcome of one spawn roll
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnResult {
    pub obstacle: Option<ObstacleSpawn>,
    pub pickup: Option<PickupSpawn>,
}

/// Roll for obstacle and pickup spawns
pub fn try_spawn<R: Rng>(
    rng: &mut R,
    difficulty_multiplier: f64,
    lane: &LaneBounds,
) -> SpawnResult {
    let scale = difficulty_multiplier;
    let mut result = SpawnResult::default();

    if rng.random::<f64>() < OBSTACLE_SPAWN_CHANCE * scale {
        result.obstacle = Some(ObstacleSpawn {
            pos: Vec2::new(lane.spawn_x, spawn_y(rng, lane)),
            size: Vec2::splat(OBSTACLE_SIZE),
            vel: Vec2::new(OBSTACLE_SPEED, 0.0),
        });
    }

    if rng.random::<f64>() < PICKUP_SPAWN_CHANCE * scale {
        result.pickup = Some(PickupSpawn {
            pos: Vec2::new(lane.spawn_x, spawn_y(rng, lane)),
            vel: Vec2::new(PICKUP_SPEED, 0.0),
            value: PICKUP_VALUE,
        });
    }

    result
}

fn spawn_y<R: Rng>(rng: &mut R, lane: &LaneBounds) -> f32 {
    if lane.max_y > lane.min_y {
        rng.random_range(lane.min_y..=lane.max_y)
    } else {
        lane.min_y
    }
}

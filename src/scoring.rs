//! Action scoring rules
//!
//! Live taps are scored directly by the tick module (50/25 points scaled by
//! difficulty). [`calculate_score`] is the richer per-action formula with
//! rhythm and streak bonuses; the live loop does not call it.

use serde::{Deserialize, Serialize};

/// Accuracy above which the rhythm bonus applies
pub const RHYTHM_BONUS_THRESHOLD: f32 = 0.8;
pub const RHYTHM_BONUS: f64 = 1.5;
/// Streak length at which the streak bonus applies
pub const STREAK_BONUS_THRESHOLD: u32 = 10;
pub const STREAK_BONUS: f64 = 1.2;

/// Scoreable action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    CollectEnergy,
    /// Reserved: the tick loop never awards avoidance
    AvoidObstacle,
    PerfectTiming,
}

impl ActionKind {
    pub fn base_points(&self) -> u32 {
        match self {
            ActionKind::CollectEnergy => 10,
            ActionKind::AvoidObstacle => 75,
            ActionKind::PerfectTiming => 100,
        }
    }
}

/// Points for an action
///
/// `base x rhythm bonus (1.5 when accuracy > 0.8) x streak bonus (1.2 when
/// streak >= 10) x difficulty multiplier`, rounded to the nearest point.
pub fn calculate_score(
    action: ActionKind,
    rhythm_accuracy: f32,
    streak: u32,
    difficulty_multiplier: f64,
) -> u64 {
    let mut points = f64::from(action.base_points());
    if rhythm_accuracy > RHYTHM_BONUS_THRESHOLD {
        points *= RHYTHM_BONUS;
    }
    if streak >= STREAK_BONUS_THRESHOLD {
        points *= STREAK_BONUS;
    }
    (points * difficulty_multiplier).round().max(0.0) as u64
}

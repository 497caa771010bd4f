//! Cross-session player progress
//!
//! Tracks totals, streaks, unlocked levels and achievements. The tracker owns
//! the in-memory progress and writes it through an injected [`ProgressStore`]
//! after every change; store failures are logged and never surface to the game.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::persistence::ProgressStore;
use crate::sim::{Difficulty, Level, LevelKey, LevelType};

/// Success rate above which the next level is offered one notch harder
pub const STEP_UP_RATE: f64 = 0.8;
/// Success rate below which the next level is offered one notch easier
pub const STEP_DOWN_RATE: f64 = 0.3;

/// Persistent player progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub total_score: u64,
    pub games_played: u32,
    pub levels_completed: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    /// Unlocked levels; always holds the default unlock
    pub unlocked: BTreeSet<LevelKey>,
    /// Levels passed at least once
    pub completed: BTreeSet<LevelKey>,
    /// Best final score per level played
    pub best_scores: BTreeMap<LevelKey, u64>,
    pub achievements: BTreeSet<String>,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            total_score: 0,
            games_played: 0,
            levels_completed: 0,
            current_streak: 0,
            best_streak: 0,
            unlocked: BTreeSet::from([LevelKey::DEFAULT]),
            completed: BTreeSet::new(),
            best_scores: BTreeMap::new(),
            achievements: BTreeSet::new(),
        }
    }
}

impl PlayerProgress {
    pub fn is_unlocked(&self, key: LevelKey) -> bool {
        key == LevelKey::DEFAULT || self.unlocked.contains(&key)
    }

    pub fn best_score(&self, key: LevelKey) -> u64 {
        self.best_scores.get(&key).copied().unwrap_or(0)
    }

    pub fn has_achievement(&self, achievement: Achievement) -> bool {
        self.achievements.contains(achievement.id())
    }

    /// Completed games over games played (0 with no games)
    pub fn success_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            f64::from(self.levels_completed) / f64::from(self.games_played)
        }
    }
}

/// Achievements awarded on level completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    /// First level passed
    FirstClear,
    Streak3,
    Streak10,
    /// 10,000 lifetime points
    Score10k,
    /// Calendar on Hard passed
    FinalLevel,
}

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::FirstClear,
        Achievement::Streak3,
        Achievement::Streak10,
        Achievement::Score10k,
        Achievement::FinalLevel,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstClear => "first_clear",
            Achievement::Streak3 => "streak_3",
            Achievement::Streak10 => "streak_10",
            Achievement::Score10k => "score_10k",
            Achievement::FinalLevel => "final_level",
        }
    }

    fn earned(&self, progress: &PlayerProgress, key: LevelKey, passed: bool) -> bool {
        match self {
            Achievement::FirstClear => progress.levels_completed >= 1,
            Achievement::Streak3 => progress.current_streak >= 3,
            Achievement::Streak10 => progress.current_streak >= 10,
            Achievement::Score10k => progress.total_score >= 10_000,
            Achievement::FinalLevel => {
                passed && key == LevelKey::new(LevelType::Calendar, Difficulty::Hard)
            }
        }
    }
}

/// Report of one `complete_level` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCompletion {
    /// Final score met the target
    pub passed: bool,
    /// Follow-on level unlocked by this completion (None if already unlocked)
    pub newly_unlocked: Option<LevelKey>,
    pub new_achievements: Vec<&'static str>,
    /// Progress after the update
    pub progress: PlayerProgress,
}

/// Apply a finished session to progress and to the level record
pub fn complete_level(
    progress: &mut PlayerProgress,
    level: &mut Level,
    final_score: u64,
) -> LevelCompletion {
    let key = level.key();
    progress.games_played += 1;
    progress.total_score += final_score;
    let best = progress.best_scores.entry(key).or_insert(0);
    *best = (*best).max(final_score);
    level.best_score = level.best_score.max(*best);

    let passed = final_score >= level.target_score;
    let mut newly_unlocked = None;
    if passed {
        progress.levels_completed += 1;
        progress.current_streak += 1;
        progress.best_streak = progress.best_streak.max(progress.current_streak);
        progress.completed.insert(key);
        level.completed = true;

        if let Some(next) = key.follow_on() {
            if progress.unlocked.insert(next) {
                log::info!("Unlocked {next}");
                newly_unlocked = Some(next);
            }
        }
    } else {
        progress.current_streak = 0;
    }

    let mut new_achievements = Vec::new();
    for achievement in Achievement::ALL {
        if !progress.has_achievement(achievement) && achievement.earned(progress, key, passed) {
            progress.achievements.insert(achievement.id().to_string());
            log::info!("Achievement earned: {}", achievement.id());
            new_achievements.push(achievement.id());
        }
    }

    LevelCompletion {
        passed,
        newly_unlocked,
        new_achievements,
        progress: progress.clone(),
    }
}

/// Suggested difficulty for the next level offered
///
/// Advisory only; the caller decides whether to use it.
pub fn adaptive_difficulty(progress: &PlayerProgress, current: Difficulty) -> Difficulty {
    let rate = progress.success_rate();
    if rate > STEP_UP_RATE {
        current.harder()
    } else if rate < STEP_DOWN_RATE {
        current.easier()
    } else {
        current
    }
}

/// All levels in unlock order, with per-level records taken from progress
pub fn level_catalog(progress: &PlayerProgress) -> Vec<Level> {
    LevelType::ALL
        .iter()
        .flat_map(|&ty| Difficulty::ALL.iter().map(move |&d| Level::new(ty, d)))
        .map(|mut level| {
            let key = level.key();
            level.unlocked = progress.is_unlocked(key);
            level.completed = progress.completed.contains(&key);
            level.best_score = progress.best_score(key);
            level
        })
        .collect()
}

/// Owns player progress and its store
pub struct ProgressionTracker<S: ProgressStore> {
    store: S,
    progress: PlayerProgress,
}

impl<S: ProgressStore> ProgressionTracker<S> {
    /// Load progress from the store, starting fresh if it cannot be read
    pub fn new(store: S) -> Self {
        let progress = store.load().unwrap_or_else(|e| {
            log::warn!("Failed to load progress ({e}), starting fresh");
            PlayerProgress::default()
        });
        log::info!(
            "Progress: {} games, {} completed, {} unlocked",
            progress.games_played,
            progress.levels_completed,
            progress.unlocked.len()
        );
        Self { store, progress }
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a finished session and persist the result
    ///
    /// Updates both `level` and the tracker's own record for its key.
    pub fn complete_level(&mut self, level: &mut Level, final_score: u64) -> LevelCompletion {
        let completion = complete_level(&mut self.progress, level, final_score);
        log::info!(
            "{} finished with {final_score}/{} ({})",
            level.key(),
            level.target_score,
            if completion.passed { "passed" } else { "missed" }
        );
        self.persist();
        completion
    }

    pub fn adaptive_difficulty(&self, current: Difficulty) -> Difficulty {
        adaptive_difficulty(&self.progress, current)
    }

    pub fn levels(&self) -> Vec<Level> {
        level_catalog(&self.progress)
    }

    /// Current record for one level
    pub fn level(&self, key: LevelKey) -> Level {
        let mut level = Level::new(key.level_type, key.difficulty);
        level.unlocked = self.progress.is_unlocked(key);
        level.completed = self.progress.completed.contains(&key);
        level.best_score = self.progress.best_score(key);
        level
    }

    /// Wipe all progress, including unlocks
    pub fn reset(&mut self) {
        log::info!("Resetting player progress");
        self.progress = PlayerProgress::default();
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.progress) {
            log::warn!("Failed to save progress: {e}");
        }
    }
}

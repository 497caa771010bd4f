//! Progress persistence
//!
//! Features:
//! - Key/value style record: scalar counters plus comma-joined key sets
//! - In-memory store for tests and embedding hosts
//! - JSON file store with tmp-then-rename writes
//! - Malformed unlock lists degrade to the default unlocks

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progression::PlayerProgress;
use crate::sim::LevelKey;

/// Failures reading or writing persisted progress or settings
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be encoded or decoded
    #[error("stored record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load/save capability injected into the progression tracker
pub trait ProgressStore {
    fn load(&self) -> Result<PlayerProgress, StoreError>;
    fn save(&mut self, progress: &PlayerProgress) -> Result<(), StoreError>;
}

/// Persisted shape of [`PlayerProgress`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProgress {
    #[serde(default)]
    pub total_score: u64,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub levels_completed: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub current_streak: u32,
    /// Comma-joined unlock keys, e.g. `"hourglass_easy,hourglass_normal"`
    #[serde(default)]
    pub unlocked_levels: String,
    /// Comma-joined keys of levels passed at least once
    #[serde(default)]
    pub completed_levels: String,
    /// Comma-joined `key:score` pairs, e.g. `"hourglass_easy:1200"`
    #[serde(default)]
    pub best_scores: String,
    /// Comma-joined achievement IDs
    #[serde(default)]
    pub achievements: String,
}

impl From<&PlayerProgress> for StoredProgress {
    fn from(progress: &PlayerProgress) -> Self {
        Self {
            total_score: progress.total_score,
            games_played: progress.games_played,
            levels_completed: progress.levels_completed,
            best_streak: progress.best_streak,
            current_streak: progress.current_streak,
            unlocked_levels: encode_unlocked(&progress.unlocked),
            completed_levels: encode_unlocked(&progress.completed),
            best_scores: encode_best_scores(&progress.best_scores),
            achievements: progress
                .achievements
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<StoredProgress> for PlayerProgress {
    fn from(stored: StoredProgress) -> Self {
        Self {
            total_score: stored.total_score,
            games_played: stored.games_played,
            levels_completed: stored.levels_completed,
            current_streak: stored.current_streak,
            best_streak: stored.best_streak.max(stored.current_streak),
            unlocked: decode_unlocked(&stored.unlocked_levels),
            completed: decode_completed(&stored.completed_levels),
            best_scores: decode_best_scores(&stored.best_scores),
            achievements: stored
                .achievements
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Join unlock keys with commas (order is not significant)
pub fn encode_unlocked(keys: &BTreeSet<LevelKey>) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_keys(encoded: &str) -> Option<Vec<LevelKey>> {
    encoded
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(LevelKey::parse)
        .collect()
}

/// Parse a comma-joined unlock list, always including the default unlock
///
/// Empty entries are skipped. Any unparseable entry discards the whole list.
pub fn decode_unlocked(encoded: &str) -> BTreeSet<LevelKey> {
    let mut keys = BTreeSet::from([LevelKey::DEFAULT]);
    match parse_keys(encoded) {
        Some(parsed) => keys.extend(parsed),
        None => log::warn!("Malformed unlocked levels {encoded:?}, using defaults"),
    }
    keys
}

/// Parse a comma-joined completed list; malformed lists decode as empty
pub fn decode_completed(encoded: &str) -> BTreeSet<LevelKey> {
    match parse_keys(encoded) {
        Some(parsed) => parsed.into_iter().collect(),
        None => {
            log::warn!("Malformed completed levels {encoded:?}, ignoring");
            BTreeSet::new()
        }
    }
}

pub fn encode_best_scores(scores: &BTreeMap<LevelKey, u64>) -> String {
    scores
        .iter()
        .map(|(key, score)| format!("{key}:{score}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse `key:score` pairs, skipping malformed entries
pub fn decode_best_scores(encoded: &str) -> BTreeMap<LevelKey, u64> {
    let mut scores = BTreeMap::new();
    for entry in encoded.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let parsed = entry
            .split_once(':')
            .and_then(|(key, score)| Some((LevelKey::parse(key)?, score.trim().parse().ok()?)));
        match parsed {
            Some((key, score)) => {
                let best = scores.entry(key).or_insert(0);
                *best = (*best).max(score);
            }
            None => log::warn!("Skipping malformed best score {entry:?}"),
        }
    }
    scores
}

/// Keeps the encoded record in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Option<StoredProgress>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record
    pub fn with_record(record: StoredProgress) -> Self {
        Self {
            record: Some(record),
        }
    }

    pub fn record(&self) -> Option<&StoredProgress> {
        self.record.as_ref()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<PlayerProgress, StoreError> {
        Ok(self
            .record
            .clone()
            .map(PlayerProgress::from)
            .unwrap_or_default())
    }

    fn save(&mut self, progress: &PlayerProgress) -> Result<(), StoreError> {
        self.record = Some(StoredProgress::from(progress));
        Ok(())
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self) -> Result<PlayerProgress, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No progress at {}, starting fresh", self.path.display());
                return Ok(PlayerProgress::default());
            }
            Err(e) => return Err(e.into()),
        };
        let stored: StoredProgress = serde_json::from_str(&json)?;
        Ok(stored.into())
    }

    fn save(&mut self, progress: &PlayerProgress) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&StoredProgress::from(progress))?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Progress saved to {}", self.path.display());
        Ok(())
    }
}

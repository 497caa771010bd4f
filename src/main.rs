//! Chrono Pulse entry point
//!
//! Headless driver: loads preferences and progress, autoplays one session at
//! the fixed cadence, and records the result. The presentation layer drives
//! the same `SessionSimulator` API from its frame loop.

use std::error::Error;
use std::path::PathBuf;

use chrono_pulse::audio::SettingsAudio;
use chrono_pulse::consts::*;
use chrono_pulse::persistence::JsonFileStore;
use chrono_pulse::sim::{GameSession, SessionSimulator, TickOutcome};
use chrono_pulse::{GameSettings, NullAudio, ProgressionTracker};
use glam::Vec2;

/// Longest run we are willing to simulate before giving up
const MAX_TICKS: u32 = 60 * 60 * 10;

fn data_dir() -> PathBuf {
    std::env::var_os("CHRONO_PULSE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn seed() -> u64 {
    std::env::var("CHRONO_PULSE_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5EED)
}

/// Tap just ahead of the next beat, steering toward the nearest pickup
fn autopilot(session: &GameSession) -> Option<Vec2> {
    let until_beat = session.rhythm.next_beat_time - session.clock;
    if !(0.0..SIM_DT).contains(&until_beat) {
        return None;
    }
    let target_y = session
        .pickups
        .iter()
        .filter(|p| p.pos.x > session.ship.pos.x)
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x))
        .map(|p| p.pos.y)
        .unwrap_or(session.ship.pos.y);
    Some(Vec2::new(SHIP_START_X, target_y))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    log::info!("Chrono Pulse (headless) starting...");

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let settings_path = dir.join("settings.json");
    let settings = GameSettings::load(&settings_path);

    let mut tracker = ProgressionTracker::new(JsonFileStore::new(dir.join("progress.json")));

    // Highest unlocked level at or below the preferred difficulty
    let mut level = tracker
        .levels()
        .into_iter()
        .rfind(|l| l.unlocked && l.difficulty <= settings.difficulty)
        .or_else(|| tracker.levels().into_iter().find(|l| l.unlocked))
        .ok_or("no unlocked level")?;

    let mut sim = SessionSimulator::new(SettingsAudio::new(NullAudio, &settings));
    sim.start(level.clone(), seed());

    let mut summary = None;
    for _ in 0..MAX_TICKS {
        let tap = sim.session().and_then(|s| autopilot(s).map(|pos| (pos, s.clock)));
        if let Some((pos, clock)) = tap {
            sim.handle_tap(pos, clock);
        }
        if let TickOutcome::GameOver(result) = sim.tick(SIM_DT) {
            summary = Some(result);
            break;
        }
    }
    sim.end_session();

    let summary = summary.ok_or("session did not finish")?;
    let completion = tracker.complete_level(&mut level, summary.final_score);
    log::info!(
        "Final score {} on {} ({})",
        summary.final_score,
        level.key(),
        if completion.passed { "passed" } else { "missed" }
    );
    log::info!("Best on {}: {}", level.key(), tracker.level(level.key()).best_score);
    if let Some(next) = completion.newly_unlocked {
        log::info!("New level available: {next}");
    }
    let suggested = tracker.adaptive_difficulty(level.difficulty);
    if suggested != level.difficulty {
        log::info!("Suggested difficulty for next run: {}", suggested.as_str());
    }

    if !settings_path.exists() {
        settings.save(&settings_path)?;
    }
    Ok(())
}

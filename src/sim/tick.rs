//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session. The host owns the cadence and
//! calls [`tick`] once per frame; taps arrive between ticks on the same
//! thread.

use glam::Vec2;

use super::collision;
use super::spawn::{LaneBounds, try_spawn};
use super::state::{EnergyPickup, GameEvent, GameSession, Level, Obstacle, SessionPhase};
use crate::audio::{AudioSink, HapticPulse, MusicTheme, SoundEffect};
use crate::consts::*;

/// Final result of a finished session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub final_score: u64,
    pub level: Level,
}

/// What a tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session, or the session is paused or already over
    Skipped,
    /// Still playing; points gained this tick
    Continue { score_delta: u64 },
    /// The session ended this tick
    GameOver(SessionSummary),
}

/// Result of a handled tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapOutcome {
    pub on_beat: bool,
    pub points: u64,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, lane: &LaneBounds, dt: f32) -> TickOutcome {
    if session.phase != SessionPhase::Playing {
        return TickOutcome::Skipped;
    }
    let score_before = session.score;

    session.clock += dt;
    session.time_remaining -= dt;

    session.rhythm.advance(session.clock);

    session.ship.update_invincibility(dt);

    for obstacle in &mut session.obstacles {
        obstacle.pos += obstacle.vel * dt;
    }
    for pickup in &mut session.pickups {
        pickup.pos += pickup.vel * dt;
    }
    session.obstacles.retain(|o| !lane.has_exited(o.pos));
    session.pickups.retain(|p| !lane.has_exited(p.pos));

    collision::resolve(session);

    let multiplier = session.difficulty_multiplier();
    let spawned = try_spawn(&mut session.rng, multiplier, lane);
    if let Some(spawn) = spawned.obstacle {
        let id = session.next_entity_id();
        session.obstacles.push(Obstacle {
            id,
            pos: spawn.pos,
            size: spawn.size,
            vel: spawn.vel,
        });
    }
    if let Some(spawn) = spawned.pickup {
        let id = session.next_entity_id();
        session.pickups.push(EnergyPickup {
            id,
            pos: spawn.pos,
            vel: spawn.vel,
            value: spawn.value,
        });
    }

    if session.time_remaining <= 0.0 || session.ship.is_depleted() {
        session.phase = SessionPhase::GameOver;
        session.events.push(GameEvent::GameOver);
        log::info!(
            "Session over on {}: score {} (time left {:.2}s, energy {:.1})",
            session.level.key(),
            session.score,
            session.time_remaining,
            session.ship.energy
        );
        return TickOutcome::GameOver(SessionSummary {
            final_score: session.score,
            level: session.level.clone(),
        });
    }

    TickOutcome::Continue {
        score_delta: session.score - score_before,
    }
}

/// Handle a tap: teleport the ship and score the timing
///
/// Ignored unless playing.
pub fn handle_tap(session: &mut GameSession, location: Vec2, sim_time: f32) -> Option<TapOutcome> {
    if session.phase != SessionPhase::Playing {
        return None;
    }

    session.ship.pos = location;

    let on_beat = session.rhythm.is_player_on_beat(sim_time);
    let base = if on_beat {
        TAP_POINTS_ON_BEAT
    } else {
        TAP_POINTS_OFF_BEAT
    };
    let points = (base * session.difficulty_multiplier()).round() as u64;
    session.score += points;
    session.events.push(if on_beat {
        GameEvent::TapOnBeat
    } else {
        GameEvent::TapOffBeat
    });

    Some(TapOutcome { on_beat, points })
}

/// Freeze a playing session
pub fn pause(session: &mut GameSession) -> bool {
    if session.phase == SessionPhase::Playing {
        session.phase = SessionPhase::Paused;
        true
    } else {
        false
    }
}

/// Resume a paused session
pub fn resume(session: &mut GameSession) -> bool {
    if session.phase == SessionPhase::Paused {
        session.phase = SessionPhase::Playing;
        true
    } else {
        false
    }
}

/// Sole owner of the active session
///
/// At most one session exists at a time. Every mutation goes through
/// `&mut self`, so a multi-threaded host wraps the simulator in a single
/// owner (task or mutex) rather than sharing the session.
pub struct SessionSimulator<A: AudioSink> {
    session: Option<GameSession>,
    lane: LaneBounds,
    audio: A,
}

impl<A: AudioSink> SessionSimulator<A> {
    pub fn new(audio: A) -> Self {
        Self::with_lane(audio, LaneBounds::default())
    }

    pub fn with_lane(audio: A, lane: LaneBounds) -> Self {
        Self {
            session: None,
            lane,
            audio,
        }
    }

    /// Start a session, discarding any previous one
    pub fn start(&mut self, level: Level, seed: u64) -> &GameSession {
        log::info!(
            "Starting {} (seed {seed}, {:.0} bpm, {:.0}s)",
            level.key(),
            level.bpm(),
            level.duration
        );
        self.audio.play_music(MusicTheme::from(level.level_type), 1.0);
        self.session.insert(GameSession::new(level, seed))
    }

    /// Return to menu: drop the session entirely
    pub fn end_session(&mut self) -> Option<GameSession> {
        let session = self.session.take();
        if session.is_some() {
            self.audio.stop();
        }
        session
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn lane(&self) -> &LaneBounds {
        &self.lane
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn pause(&mut self) -> bool {
        self.session.as_mut().is_some_and(pause)
    }

    pub fn resume(&mut self) -> bool {
        self.session.as_mut().is_some_and(resume)
    }

    /// Advance the active session; a no-op without one
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Skipped;
        };
        let outcome = tick(session, &self.lane, dt);
        self.flush_events();
        outcome
    }

    /// Forward a tap to the active session; ignored without one
    pub fn handle_tap(&mut self, location: Vec2, sim_time: f32) -> Option<TapOutcome> {
        let outcome = handle_tap(self.session.as_mut()?, location, sim_time);
        self.flush_events();
        outcome
    }

    fn flush_events(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        for event in session.drain_events() {
            self.audio.play_effect(SoundEffect::for_event(&event));
            if let Some(pulse) = HapticPulse::for_event(&event) {
                self.audio.haptic(pulse);
            }
        }
    }
}

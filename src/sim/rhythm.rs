//! Beat tracking and tap timing
//!
//! The clock is driven by the session clock value each tick; it never owns
//! time itself.

use serde::{Deserialize, Serialize};

use crate::consts::BEAT_TOLERANCE;

/// Result of advancing the clock for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatStatus {
    /// Beats elapsed so far
    pub beat: u32,
    /// A beat boundary was crossed this tick
    pub crossed: bool,
    /// This tick counts as on-beat
    pub on_beat: bool,
}

/// Fixed-tempo beat tracker for a single session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmClock {
    pub bpm: f32,
    /// Seconds between beats (60 / bpm)
    pub beat_interval: f32,
    pub next_beat_time: f32,
    pub current_beat: u32,
    pub on_beat: bool,
    pub tolerance: f32,
}

impl RhythmClock {
    pub fn new(bpm: f32) -> Self {
        Self::with_tolerance(bpm, BEAT_TOLERANCE)
    }

    pub fn with_tolerance(bpm: f32, tolerance: f32) -> Self {
        let beat_interval = 60.0 / bpm;
        Self {
            bpm,
            beat_interval,
            next_beat_time: beat_interval,
            current_beat: 0,
            on_beat: false,
            tolerance,
        }
    }

    /// Advance to the given session clock value
    ///
    /// Crossing a boundary moves `next_beat_time` forward by exactly one
    /// interval and flags the tick on-beat. Otherwise the tick is on-beat when
    /// it falls within tolerance of the upcoming beat.
    pub fn advance(&mut self, sim_clock: f32) -> BeatStatus {
        let crossed = sim_clock >= self.next_beat_time;
        if crossed {
            self.current_beat += 1;
            self.next_beat_time += self.beat_interval;
            self.on_beat = true;
        } else {
            self.on_beat = self.within_tolerance(sim_clock);
        }
        BeatStatus {
            beat: self.current_beat,
            crossed,
            on_beat: self.on_beat,
        }
    }

    /// Whether a discrete action at `action_time` lands on the upcoming beat
    ///
    /// Independent of the per-tick `on_beat` flag.
    pub fn is_player_on_beat(&self, action_time: f32) -> bool {
        self.within_tolerance(action_time)
    }

    fn within_tolerance(&self, t: f32) -> bool {
        (t - self.next_beat_time).abs() <= self.tolerance
    }
}

/// Banded timing accuracy for a tap against a beat
///
/// | distance     | accuracy |
/// |--------------|----------|
/// | <= 0.05s     | 1.0      |
/// | <= 0.1s      | 0.8      |
/// | <= 0.2s      | 0.6      |
/// | otherwise    | 0.3      |
pub fn calculate_rhythm_accuracy(tap_time: f32, beat_time: f32) -> f32 {
    let diff = (tap_time - beat_time).abs();
    if diff <= 0.05 {
        1.0
    } else if diff <= 0.1 {
        0.8
    } else if diff <= 0.2 {
        0.6
    } else {
        0.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_bpm() {
        let clock = RhythmClock::new(120.0);
        assert!((clock.beat_interval - 0.5).abs() < 1e-6);
        assert!((clock.next_beat_time - 0.5).abs() < 1e-6);
        assert_eq!(clock.current_beat, 0);
    }

    #[test]
    fn test_advance_crosses_beat() {
        let mut clock = RhythmClock::new(120.0);

        let status = clock.advance(0.2);
        assert!(!status.crossed);
        assert!(!status.on_beat);

        let status = clock.advance(0.45);
        assert!(!status.crossed);
        assert!(status.on_beat, "within tolerance of upcoming beat");

        let status = clock.advance(0.5);
        assert!(status.crossed);
        assert!(status.on_beat);
        assert_eq!(status.beat, 1);
        assert!((clock.next_beat_time - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_advance_steps_one_beat_per_call() {
        let mut clock = RhythmClock::new(120.0);
        // A long stall still only advances one beat per tick
        let status = clock.advance(2.0);
        assert_eq!(status.beat, 1);
        assert!((clock.next_beat_time - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_player_on_beat_ignores_tick_flag() {
        let mut clock = RhythmClock::new(120.0);
        clock.advance(0.1);
        assert!(!clock.on_beat);
        assert!(clock.is_player_on_beat(0.42));
        assert!(clock.is_player_on_beat(0.58));
        assert!(!clock.is_player_on_beat(0.35));
    }

    #[test]
    fn test_accuracy_bands() {
        assert_eq!(calculate_rhythm_accuracy(0.0, 0.0), 1.0);
        assert_eq!(calculate_rhythm_accuracy(0.05, 0.0), 1.0);
        assert_eq!(calculate_rhythm_accuracy(0.050_000_1, 0.0), 0.8);
        assert_eq!(calculate_rhythm_accuracy(0.1, 0.0), 0.8);
        assert_eq!(calculate_rhythm_accuracy(0.100_000_1, 0.0), 0.6);
        assert_eq!(calculate_rhythm_accuracy(0.2, 0.0), 0.6);
        assert_eq!(calculate_rhythm_accuracy(0.200_000_1, 0.0), 0.3);
        assert_eq!(calculate_rhythm_accuracy(0.0, 3.0), 0.3);
    }

    #[test]
    fn test_accuracy_is_symmetric() {
        assert_eq!(calculate_rhythm_accuracy(0.0, 0.07), 0.8);
        assert_eq!(calculate_rhythm_accuracy(0.07, 0.0), 0.8);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn on_beat_matches_tolerance_test(offset in -1.0f32..1.0) {
                let clock = RhythmClock::new(120.0);
                let t = clock.next_beat_time + offset;
                let expected = (t - clock.next_beat_time).abs() <= clock.tolerance;
                prop_assert_eq!(clock.is_player_on_beat(t), expected);
            }

            #[test]
            fn on_beat_is_symmetric(steps in 0u32..52) {
                // Multiples of 1/128 around 4.0 are exact in f32
                let offset = steps as f32 / 128.0;
                let mut clock = RhythmClock::new(120.0);
                clock.next_beat_time = 4.0;
                prop_assert_eq!(
                    clock.is_player_on_beat(4.0 + offset),
                    clock.is_player_on_beat(4.0 - offset)
                );
            }
        }
    }
}

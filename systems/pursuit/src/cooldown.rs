//! Per-difficulty gate limiting how often the cat may move.

use std::time::Duration;

use cat_chase_core::Difficulty;

use crate::config::CooldownTuning;

/// Rate limiter that paces cat moves by difficulty.
#[derive(Clone, Debug)]
pub struct MoveCooldown {
    tuning: CooldownTuning,
    last_move: Duration,
}

impl MoveCooldown {
    /// Creates a cooldown that last fired at time zero.
    #[must_use]
    pub fn new(tuning: CooldownTuning) -> Self {
        Self {
            tuning,
            last_move: Duration::ZERO,
        }
    }

    /// Restarts the cooldown window at the provided timestamp.
    pub fn reset(&mut self, at: Duration) {
        self.last_move = at;
    }

    /// Reports whether the cat may move at `now`, consuming the window when it may.
    pub fn should_move(&mut self, now: Duration, difficulty: Difficulty) -> bool {
        if now.saturating_sub(self.last_move) < self.tuning.delay(difficulty) {
            return false;
        }

        self.last_move = now;
        true
    }

    /// Timestamp of the most recent permitted move.
    #[must_use]
    pub fn last_move(&self) -> Duration {
        self.last_move
    }
}

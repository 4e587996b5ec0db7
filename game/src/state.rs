use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tetris_core::{CommandOutcome, TetrisCore};

pub const DEFAULT_GRAVITY_INTERVAL: Duration = Duration::from_millis(500);

/// The engine plus its gravity clock. The clock only runs while the round is live.
///
/// A fresh or restarted round starts with a drop already due, so the first `advance` moves the
/// piece down one row whatever `dt` is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tetris: TetrisCore,
    #[serde(with = "duration_ms")]
    pub gravity_interval: Duration,
    #[serde(with = "duration_ms")]
    pub gravity_elapsed: Duration,
}

impl GameState {
    pub fn new(tetris: TetrisCore) -> Self {
        Self::with_gravity(tetris, DEFAULT_GRAVITY_INTERVAL)
    }

    pub fn with_gravity(tetris: TetrisCore, gravity_interval: Duration) -> Self {
        let gravity_interval = gravity_interval.max(Duration::from_millis(1));
        Self {
            tetris,
            gravity_interval,
            gravity_elapsed: gravity_interval,
        }
    }

    pub fn tetris(&self) -> &TetrisCore {
        &self.tetris
    }

    /// Advances the gravity clock by `dt`, issuing one tick per elapsed interval. Stops ticking
    /// (and drops leftover time) as soon as the game is over.
    pub fn advance(&mut self, dt: Duration) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::new();
        if self.tetris.is_game_over() {
            self.gravity_elapsed = Duration::ZERO;
            return outcomes;
        }

        self.gravity_elapsed = self.gravity_elapsed.saturating_add(dt);
        while self.gravity_elapsed >= self.gravity_interval {
            self.gravity_elapsed -= self.gravity_interval;
            outcomes.push(self.tetris.tick());
            if self.tetris.is_game_over() {
                self.gravity_elapsed = Duration::ZERO;
                break;
            }
        }
        outcomes
    }

    /// Starts a new round with its first drop due.
    pub fn restart(&mut self) {
        self.tetris.reset();
        self.gravity_elapsed = self.gravity_interval;
    }
}

/// Serializes a `Duration` as whole milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

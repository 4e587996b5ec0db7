use std::time::Duration;

use engine::GameLogic;
use serde::{Deserialize, Serialize};

use crate::settings::GameplaySettings;
use crate::state::{DEFAULT_GRAVITY_INTERVAL, GameState};
use crate::tetris_core::{ColorMode, Command, ShapeKind, SpawnCheck, TetrisCore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TetrisAction {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    /// One gravity step, independent of the gravity clock.
    Tick,
    Reset,
    Noop,
}

impl TetrisAction {
    /// Parses the one-letter script alphabet used by the headless runner:
    /// `l` `r` `d` `u` `t` `x` `.` (left, right, down, rotate, tick, reset, noop).
    pub fn from_script_char(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'l' => Some(Self::MoveLeft),
            'r' => Some(Self::MoveRight),
            'd' => Some(Self::SoftDrop),
            'u' => Some(Self::Rotate),
            't' => Some(Self::Tick),
            'x' => Some(Self::Reset),
            '.' => Some(Self::Noop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TetrisGame {
    seed: u64,
    available_shapes: Vec<ShapeKind>,
    color_mode: ColorMode,
    spawn_check: SpawnCheck,
    gravity_interval: Duration,
}

impl TetrisGame {
    pub fn new(seed: u64, available_shapes: Vec<ShapeKind>) -> Self {
        Self {
            seed,
            available_shapes,
            color_mode: ColorMode::default(),
            spawn_check: SpawnCheck::default(),
            gravity_interval: DEFAULT_GRAVITY_INTERVAL,
        }
    }

    pub fn standard(seed: u64) -> Self {
        Self::new(seed, ShapeKind::all())
    }

    pub fn from_settings(seed: u64, gameplay: &GameplaySettings) -> Self {
        Self::standard(seed)
            .with_color_mode(gameplay.color_mode)
            .with_spawn_check(gameplay.spawn_check)
            .with_gravity_interval(gameplay.gravity_interval())
    }

    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    pub fn with_spawn_check(mut self, check: SpawnCheck) -> Self {
        self.spawn_check = check;
        self
    }

    pub fn with_gravity_interval(mut self, interval: Duration) -> Self {
        self.gravity_interval = interval;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn gravity_interval(&self) -> Duration {
        self.gravity_interval
    }

    /// A started engine configured like this game.
    pub fn new_core(&self) -> TetrisCore {
        let mut core = TetrisCore::new(self.seed);
        core.set_available_shapes(self.available_shapes.clone());
        core.set_color_mode(self.color_mode);
        core.set_spawn_check(self.spawn_check);
        core.initialize_game();
        core
    }
}

impl GameLogic for TetrisGame {
    type State = GameState;
    type Input = TetrisAction;

    fn initial_state(&self) -> Self::State {
        GameState::with_gravity(self.new_core(), self.gravity_interval)
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        apply_action(&mut next, input);
        next
    }
}

/// Applies one action in place. Movement is ignored once the game is over; only `Reset` still
/// does something.
pub fn apply_action(state: &mut GameState, action: TetrisAction) {
    let command = match action {
        TetrisAction::MoveLeft => Command::MoveLeft,
        TetrisAction::MoveRight => Command::MoveRight,
        TetrisAction::SoftDrop | TetrisAction::Tick => Command::SoftDrop,
        TetrisAction::Rotate => Command::Rotate,
        TetrisAction::Reset => {
            state.restart();
            return;
        }
        TetrisAction::Noop => return,
    };
    if state.tetris.is_game_over() {
        return;
    }
    state.tetris.apply(command);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_alphabet_maps_every_action() {
        let parsed: Vec<_> = "lrdutx.".chars().filter_map(TetrisAction::from_script_char).collect();
        assert_eq!(
            parsed,
            vec![
                TetrisAction::MoveLeft,
                TetrisAction::MoveRight,
                TetrisAction::SoftDrop,
                TetrisAction::Rotate,
                TetrisAction::Tick,
                TetrisAction::Reset,
                TetrisAction::Noop,
            ]
        );
        assert_eq!(TetrisAction::from_script_char('?'), None);
    }

    #[test]
    fn new_core_applies_configuration() {
        let game = TetrisGame::new(5, vec![ShapeKind::O])
            .with_color_mode(ColorMode::ByShape)
            .with_spawn_check(SpawnCheck::Immediate);
        let core = game.new_core();
        let piece = core.active_piece().expect("started game has a piece");
        assert_eq!(piece.kind, ShapeKind::O);
        assert_eq!(piece.color, ShapeKind::O.color());
    }
}

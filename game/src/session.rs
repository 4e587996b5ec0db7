use std::io;
use std::path::Path;
use std::time::Duration;

use engine::app::InputFrame;
use engine::{GameLogic, TimeMachine};

use crate::agent::{TetrisAction, TetrisGame, apply_action};
use crate::input_adapter::actions_for_frame;
use crate::state::GameState;
use crate::tetris_core::CommandOutcome;
use crate::view::{ViewLayout, WINDOW_SIZE};

/// Per-frame driver for the windowed game: applies player input, runs gravity, and records
/// every state that changed the board.
#[derive(Debug)]
pub struct TetrisSession {
    state: GameState,
    history: TimeMachine<GameState>,
    layout: ViewLayout,
    cursor: Option<(u32, u32)>,
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub actions: Vec<TetrisAction>,
    pub outcomes: Vec<CommandOutcome>,
    pub lines_cleared: usize,
    pub restarted: bool,
}

impl FrameReport {
    pub fn changed(&self) -> bool {
        !self.actions.is_empty() || !self.outcomes.is_empty()
    }
}

impl TetrisSession {
    pub fn new(game: TetrisGame, history_frames: usize) -> Self {
        let state = game.initial_state();
        let history = TimeMachine::with_capacity_limit(state.clone(), history_frames);
        Self {
            state,
            history,
            layout: ViewLayout::compute(WINDOW_SIZE),
            cursor: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &TimeMachine<GameState> {
        &self.history
    }

    pub fn cursor(&self) -> Option<(u32, u32)> {
        self.cursor
    }

    pub fn handle_frame(&mut self, input: &InputFrame, dt: Duration) -> FrameReport {
        self.cursor = input.mouse_pos;

        let mut report = FrameReport::default();
        for action in actions_for_frame(input, &self.layout) {
            let before = self.state.tetris.lines_cleared();
            apply_action(&mut self.state, action);
            if action == TetrisAction::Reset {
                report.restarted = true;
                self.history.restart(self.state.clone());
                tracing::info!("round restarted");
            } else {
                let after = self.state.tetris.lines_cleared();
                report.lines_cleared += after.saturating_sub(before) as usize;
            }
            report.actions.push(action);
        }

        report.outcomes = self.state.advance(dt);
        report.lines_cleared += report
            .outcomes
            .iter()
            .map(|outcome| outcome.lines_cleared())
            .sum::<usize>();

        if report.changed() {
            self.history.record(self.state.clone());
        }
        if report.lines_cleared > 0 {
            tracing::debug!(
                lines = report.lines_cleared,
                score = self.state.tetris.score(),
                "frame cleared lines"
            );
        }
        report
    }

    pub fn save_history(&self, path: impl AsRef<Path>) -> io::Result<()> {
        self.history.save_json_file(path)
    }
}

use engine::HeadlessRunner;
use engine::profiling::Profiler;
use thiserror::Error;

use crate::agent::{TetrisAction, TetrisGame};

/// One letter of a headless script: an action to record, or a move through the recorded
/// history. Recording after `Rewind` branches and drops the frames that followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Action(TetrisAction),
    Rewind,
    Forward,
}

impl ScriptStep {
    /// Action letters plus `b` (back one frame) and `f` (forward one frame).
    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'b' => Some(Self::Rewind),
            'f' => Some(Self::Forward),
            other => TetrisAction::from_script_char(other).map(Self::Action),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown script step {ch:?} at position {position}")]
pub struct ScriptError {
    pub ch: char,
    pub position: usize,
}

/// Parses a script, ignoring whitespace. Positions in errors count only non-whitespace letters.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    text.chars()
        .filter(|ch| !ch.is_whitespace())
        .enumerate()
        .map(|(position, ch)| ScriptStep::from_char(ch).ok_or(ScriptError { ch, position }))
        .collect()
}

/// Plays `steps` against `runner` and returns the frame it ends on.
pub fn play_script<P: Profiler>(
    runner: &mut HeadlessRunner<TetrisGame>,
    steps: &[ScriptStep],
    profiler: &mut P,
) -> usize {
    for step in steps {
        match *step {
            ScriptStep::Action(action) => {
                runner.step_profiled(action, profiler);
            }
            ScriptStep::Rewind => {
                runner.rewind(1);
            }
            ScriptStep::Forward => {
                runner.forward(1);
            }
        }
    }
    tracing::debug!(frame = runner.frame(), steps = steps.len(), "script finished");
    runner.frame()
}

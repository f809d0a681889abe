use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    /// Moves `position` by `step` frames, staying inside `0..=last_index`.
    #[inline]
    pub fn apply(self, position: usize, step: usize, last_index: usize) -> usize {
        match self {
            Self::Backward => position.saturating_sub(step),
            Self::Forward => position.saturating_add(step).min(last_index),
        }
    }
}

/// One user intent, already decoupled from whatever key produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Seek(Direction),
    TogglePause,
    /// Start the label with this number at the current frame.
    Assign(u8),
    /// Remove the breakpoint at the current frame.
    Remove,
    Quit,
}

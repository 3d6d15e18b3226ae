use core::fmt;
use serde::{Deserialize, Serialize};

/// A turn action, addressing a card by its position in the acting hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Play { index: usize },
    Discard { index: usize },
}

impl Action {
    pub const fn index(self) -> usize {
        match self {
            Action::Play { index } | Action::Discard { index } => index,
        }
    }

    pub const fn is_play(self) -> bool {
        matches!(self, Action::Play { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Play { index } => write!(f, "play #{index}"),
            Action::Discard { index } => write!(f, "discard #{index}"),
        }
    }
}

use crate::game::event::TerminalReason;
use crate::model::fireworks::FireworkError;
use crate::model::player::{MAX_PLAYERS, MIN_PLAYERS, PlayerId};
use std::fmt;

/// Problems detected before the first turn is played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    PlayerCount { requested: usize },
    ShortDeck { needed: usize, available: usize },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::PlayerCount { requested } => write!(
                f,
                "{requested} players requested; a table seats {MIN_PLAYERS} to {MAX_PLAYERS}"
            ),
            SetupError::ShortDeck { needed, available } => write!(
                f,
                "dealing needs {needed} cards but the deck holds {available}"
            ),
        }
    }
}

impl std::error::Error for SetupError {}

/// Engine or loop bookkeeping went wrong. Any of these invalidates the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    GameAlreadyOver { reason: Option<TerminalReason> },
    HandIndexOutOfRange {
        player: PlayerId,
        index: usize,
        hand_len: usize,
    },
    Firework(FireworkError),
    DrawFromEmptyDeck { player: PlayerId },
    CardsNotConserved { expected: usize, counted: usize },
    RepeatedExhaustion,
    CountdownMismatch {
        loop_remaining: Option<usize>,
        engine_remaining: Option<usize>,
    },
    TurnLimitExceeded { limit: u32 },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::GameAlreadyOver { reason } => match reason {
                Some(reason) => write!(f, "action submitted after game over ({reason})"),
                None => f.write_str("action submitted after game over"),
            },
            InvariantViolation::HandIndexOutOfRange {
                player,
                index,
                hand_len,
            } => write!(
                f,
                "{player} has {hand_len} cards; index {index} is out of range"
            ),
            InvariantViolation::Firework(err) => write!(f, "firework skipped a rank: {err}"),
            InvariantViolation::DrawFromEmptyDeck { player } => {
                write!(f, "{player} drew from an empty deck before exhaustion")
            }
            InvariantViolation::CardsNotConserved { expected, counted } => {
                write!(f, "card count drifted: expected {expected}, counted {counted}")
            }
            InvariantViolation::RepeatedExhaustion => {
                f.write_str("deck exhaustion reported more than once")
            }
            InvariantViolation::CountdownMismatch {
                loop_remaining,
                engine_remaining,
            } => write!(
                f,
                "final round countdown disagrees: loop {loop_remaining:?}, engine {engine_remaining:?}"
            ),
            InvariantViolation::TurnLimitExceeded { limit } => {
                write!(f, "game did not end within {limit} turns")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

impl From<FireworkError> for InvariantViolation {
    fn from(err: FireworkError) -> Self {
        InvariantViolation::Firework(err)
    }
}

mod perfect;
mod random;

pub use perfect::{PerfectPlayPolicy, Usefulness, classify};
pub use random::RandomPolicy;

use hanabi_core::game::action::Action;
use hanabi_core::game::error::InvariantViolation;
use hanabi_core::game::game_loop::GameLoop;
use hanabi_core::game::outcome::GameRecord;
use hanabi_core::game::state::GameState;
use hanabi_core::model::hand::Hand;
use hanabi_core::model::player::PlayerId;
use std::fmt;
use std::str::FromStr;

/// Read-only view handed to a policy on its turn.
pub struct PolicyContext<'a> {
    pub state: &'a GameState,
    pub player: PlayerId,
}

impl<'a> PolicyContext<'a> {
    pub fn new(state: &'a GameState) -> Self {
        Self {
            state,
            player: state.active_player(),
        }
    }

    pub fn hand(&self) -> &'a Hand {
        self.state.hand(self.player)
    }
}

/// Turn-level decision maker.
pub trait Policy: Send {
    fn choose_action(&mut self, ctx: &PolicyContext) -> Action;

    fn kind(&self) -> PolicyKind;
}

/// Play a game to completion, consulting `policy` on every turn.
pub fn play_out(
    policy: &mut dyn Policy,
    game: GameLoop,
) -> Result<GameRecord, InvariantViolation> {
    game.run(|state| policy.choose_action(&PolicyContext::new(state)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Perfect,
    Random,
}

impl PolicyKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Perfect => "perfect",
            PolicyKind::Random => "random",
        }
    }

    /// Fresh policy for one game. `seed` only matters for randomised kinds.
    pub fn spawn(self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Perfect => Box::new(PerfectPlayPolicy::new()),
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown policy '{}' (expected 'perfect' or 'random')", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "perfect" | "best" => Ok(PolicyKind::Perfect),
            "random" => Ok(PolicyKind::Random),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

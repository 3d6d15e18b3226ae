use crate::game::engine::TurnReport;
use crate::game::event::TerminalReason;
use serde::{Deserialize, Serialize};

/// Final result of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub seed: u64,
    pub players: usize,
    pub score: u8,
    pub reason: TerminalReason,
    pub turns: u32,
    pub rounds: u32,
}

impl Outcome {
    pub fn new(seed: u64, players: usize, score: u8, reason: TerminalReason, turns: u32) -> Self {
        let rounds = turns.div_ceil(players.max(1) as u32);
        Self {
            seed,
            players,
            score,
            reason,
            turns,
            rounds,
        }
    }

    /// False only when the fuse ran out.
    pub fn finished(&self) -> bool {
        self.reason != TerminalReason::FuseExhausted
    }
}

/// An outcome plus the per-turn log when recording was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub turns: Vec<TurnReport>,
}

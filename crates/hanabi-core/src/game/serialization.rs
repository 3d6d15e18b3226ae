use super::error::SetupError;
use super::outcome::GameRecord;
use super::state::GameState;
use serde::{Deserialize, Serialize};

/// JSON form of a finished game. The seed and table size are enough to
/// rebuild the opening position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub seed: u64,
    pub players: usize,
    pub record: GameRecord,
}

impl GameSnapshot {
    pub fn capture(record: &GameRecord) -> Self {
        GameSnapshot {
            seed: record.outcome.seed,
            players: record.outcome.players,
            record: record.clone(),
        }
    }

    pub fn restore_opening(&self) -> Result<GameState, SetupError> {
        GameState::new(self.players, self.seed)
    }

    pub fn to_json_line(record: &GameRecord) -> serde_json::Result<String> {
        serde_json::to_string(&Self::capture(record))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

use core::fmt;
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

/// Seat index around the table, zero based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const FIRST: PlayerId = PlayerId(0);

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < MAX_PLAYERS {
            Some(PlayerId(index as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn next(self, players: usize) -> PlayerId {
        PlayerId(((self.0 as usize + 1) % players) as u8)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0 + 1)
    }
}

/// Cards dealt to each player for a given table size.
pub const fn hand_size(players: usize) -> Option<usize> {
    match players {
        2 | 3 => Some(5),
        4 | 5 => Some(4),
        _ => None,
    }
}

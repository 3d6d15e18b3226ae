use crate::model::card::Card;
use crate::model::color::Color;
use crate::model::rank::Rank;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_SCORE: u8 = 25;

/// Highest rank played per colour; 0 when nothing was played yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Fireworks {
    heights: [u8; Color::COUNT],
}

impl Fireworks {
    pub const fn new() -> Self {
        Self {
            heights: [0; Color::COUNT],
        }
    }

    pub fn height(&self, color: Color) -> u8 {
        self.heights[color.index()]
    }

    /// Next rank accepted for `color`, or `None` once the firework is complete.
    pub fn next_rank(&self, color: Color) -> Option<Rank> {
        Rank::from_value(self.height(color) + 1)
    }

    pub fn is_playable(&self, card: Card) -> bool {
        self.next_rank(card.color) == Some(card.rank)
    }

    pub fn is_played(&self, card: Card) -> bool {
        card.rank.value() <= self.height(card.color)
    }

    /// Place `card` on its firework. Returns whether the firework is now complete.
    pub fn advance(&mut self, card: Card) -> Result<bool, FireworkError> {
        let current = self.height(card.color);
        if card.rank.value() != current + 1 {
            return Err(FireworkError::SkippedRank {
                card,
                height: current,
            });
        }
        self.heights[card.color.index()] = card.rank.value();
        Ok(card.rank.is_max())
    }

    pub fn score(&self) -> u8 {
        self.heights.iter().sum()
    }

    pub fn is_complete(&self) -> bool {
        self.score() == MAX_SCORE
    }

    pub fn heights(&self) -> &[u8; Color::COUNT] {
        &self.heights
    }
}

impl fmt::Display for Fireworks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, color) in Color::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", color.initial(), self.height(*color))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireworkError {
    SkippedRank { card: Card, height: u8 },
}

impl fmt::Display for FireworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireworkError::SkippedRank { card, height } => {
                write!(f, "cannot place {card} on a {} firework at {height}", card.color)
            }
        }
    }
}

impl std::error::Error for FireworkError {}

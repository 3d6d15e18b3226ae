use crate::model::card::Card;
use crate::model::player::PlayerId;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    FuseExhausted,
    PerfectScore,
    FinalRoundComplete,
}

impl TerminalReason {
    pub const ALL: [TerminalReason; 3] = [
        TerminalReason::FuseExhausted,
        TerminalReason::PerfectScore,
        TerminalReason::FinalRoundComplete,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            TerminalReason::FuseExhausted => "fuse_exhausted",
            TerminalReason::PerfectScore => "perfect_score",
            TerminalReason::FinalRoundComplete => "final_round_complete",
        }
    }
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a turn can produce. A turn yields its action event first,
/// then possibly `DeckExhausted`, then possibly `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    CardPlayed {
        player: PlayerId,
        card: Card,
        completed: bool,
    },
    CardMisplayed {
        player: PlayerId,
        card: Card,
        fuses_left: u8,
    },
    CardDiscarded {
        player: PlayerId,
        card: Card,
    },
    DeckExhausted {
        player: PlayerId,
    },
    GameOver {
        reason: TerminalReason,
        score: u8,
    },
}

/// Coarse bucket used by presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Success,
    Failure,
    Neutral,
    Notice,
}

impl GameEvent {
    pub const fn class(&self) -> EventClass {
        match self {
            GameEvent::CardPlayed { .. } => EventClass::Success,
            GameEvent::CardMisplayed { .. } => EventClass::Failure,
            GameEvent::CardDiscarded { .. } => EventClass::Neutral,
            GameEvent::DeckExhausted { .. } | GameEvent::GameOver { .. } => EventClass::Notice,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, GameEvent::GameOver { .. })
    }

    pub const fn card(&self) -> Option<Card> {
        match self {
            GameEvent::CardPlayed { card, .. }
            | GameEvent::CardMisplayed { card, .. }
            | GameEvent::CardDiscarded { card, .. } => Some(*card),
            GameEvent::DeckExhausted { .. } | GameEvent::GameOver { .. } => None,
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::CardPlayed {
                player,
                card,
                completed,
            } => {
                write!(f, "{player} played {card}")?;
                if *completed {
                    f.write_str(" (firework complete)")?;
                }
                Ok(())
            }
            GameEvent::CardMisplayed {
                player,
                card,
                fuses_left,
            } => write!(f, "{player} misplayed {card}, {fuses_left} fuse(s) left"),
            GameEvent::CardDiscarded { player, card } => write!(f, "{player} discarded {card}"),
            GameEvent::DeckExhausted { player } => {
                write!(f, "deck exhausted on {player}'s draw, final round")
            }
            GameEvent::GameOver { reason, score } => write!(f, "game over ({reason}), score {score}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EventClass, GameEvent, TerminalReason};
    use crate::model::card::Card;
    use crate::model::color::Color;
    use crate::model::player::PlayerId;
    use crate::model::rank::Rank;

    #[test]
    fn classes_follow_event_kind() {
        let card = Card::new(Color::Red, Rank::One);
        let played = GameEvent::CardPlayed {
            player: PlayerId::FIRST,
            card,
            completed: false,
        };
        let misplayed = GameEvent::CardMisplayed {
            player: PlayerId::FIRST,
            card,
            fuses_left: 2,
        };
        assert_eq!(played.class(), EventClass::Success);
        assert_eq!(misplayed.class(), EventClass::Failure);
        assert_eq!(played.card(), Some(card));
    }

    #[test]
    fn game_over_is_terminal_and_serializes_tagged() {
        let event = GameEvent::GameOver {
            reason: TerminalReason::FuseExhausted,
            score: 7,
        };
        assert!(event.is_terminal());
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"event":"game_over","reason":"fuse_exhausted","score":7}"#
        );
    }
}

use crate::game::action::Action;
use crate::game::error::InvariantViolation;
use crate::game::event::{GameEvent, TerminalReason};
use crate::game::state::GameState;
use crate::model::card::Card;
use crate::model::fireworks::Fireworks;
use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Table counters right after a turn resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub fireworks: Fireworks,
    pub fuses: u8,
    pub info: u8,
    pub deck_remaining: usize,
}

impl TurnSummary {
    pub fn capture(state: &GameState) -> Self {
        Self {
            fireworks: *state.fireworks(),
            fuses: state.tokens().fuses(),
            info: state.tokens().info(),
            deck_remaining: state.deck_remaining(),
        }
    }
}

/// What one turn did: who acted, how, the ordered events, and the refill card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u32,
    pub player: PlayerId,
    pub action: Action,
    pub events: Vec<GameEvent>,
    pub drawn: Option<Card>,
    pub summary: TurnSummary,
}

impl TurnReport {
    pub fn game_over(&self) -> Option<(TerminalReason, u8)> {
        self.events.iter().find_map(|event| match event {
            GameEvent::GameOver { reason, score } => Some((*reason, *score)),
            _ => None,
        })
    }

    pub fn exhausted_deck(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, GameEvent::DeckExhausted { .. }))
    }
}

/// Applies actions to a [`GameState`] and classifies what happened.
pub struct TurnEngine;

impl TurnEngine {
    /// Resolve `action` for the active player.
    ///
    /// Order within a turn: the action itself, the fuse/perfect-score check,
    /// the refill draw (or the one-time exhaustion transition), the final
    /// round tick, and the conservation check. Games ending on fuses or a
    /// perfect score skip the refill.
    pub fn apply(state: &mut GameState, action: Action) -> Result<TurnReport, InvariantViolation> {
        if state.ended().is_some() {
            return Err(InvariantViolation::GameAlreadyOver {
                reason: state.ended(),
            });
        }

        let player = state.active_player();
        let turn = state.turns_taken() + 1;
        let card = state.take_card(player, action.index())?;
        let mut events = Vec::with_capacity(3);

        match action {
            Action::Play { .. } if state.fireworks().is_playable(card) => {
                let completed = state.fireworks_mut().advance(card)?;
                if completed {
                    state.tokens_mut().regain_info();
                }
                events.push(GameEvent::CardPlayed {
                    player,
                    card,
                    completed,
                });
            }
            Action::Play { .. } => {
                state.discard_mut().add(card);
                let fuses_left = state.tokens_mut().burn_fuse();
                events.push(GameEvent::CardMisplayed {
                    player,
                    card,
                    fuses_left,
                });
            }
            Action::Discard { .. } => {
                state.discard_mut().add(card);
                state.tokens_mut().regain_info();
                events.push(GameEvent::CardDiscarded { player, card });
            }
        }

        let mut ended = if state.tokens().fuses_exhausted() {
            Some(TerminalReason::FuseExhausted)
        } else if state.fireworks().is_complete() {
            Some(TerminalReason::PerfectScore)
        } else {
            None
        };

        let mut drawn = None;
        if ended.is_none() {
            if state.deck_remaining() > 0 {
                drawn = Some(state.draw_into(player)?);
            } else if state.final_round_remaining().is_none() {
                state.start_final_round()?;
                events.push(GameEvent::DeckExhausted { player });
            }

            if state.tick_final_round() == Some(0) {
                ended = Some(TerminalReason::FinalRoundComplete);
            }
        }

        state.check_conservation()?;
        state.finish_turn(ended);

        if let Some(reason) = ended {
            events.push(GameEvent::GameOver {
                reason,
                score: state.score(),
            });
        }

        Ok(TurnReport {
            turn,
            player,
            action,
            events,
            drawn,
            summary: TurnSummary::capture(state),
        })
    }
}

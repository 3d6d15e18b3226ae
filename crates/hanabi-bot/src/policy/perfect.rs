use super::{Policy, PolicyContext, PolicyKind};
use hanabi_core::game::action::Action;
use hanabi_core::game::state::GameState;
use hanabi_core::model::card::Card;
use hanabi_core::model::player::PlayerId;
use std::cmp::Reverse;
use tracing::{Level, event};

/// How much the table loses if a card is thrown away. Declared from least to
/// most valuable, so the derived ordering ranks discard candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Usefulness {
    /// Already on its firework, or blocked by a fully discarded lower rank.
    Dead,
    /// Another copy sits in some hand, this one included.
    Duplicate,
    /// Still needed, but another copy is left in the deck.
    Expendable,
    /// The last copy that can still score.
    Critical,
}

/// Greedy full-information player: play the best playable card, otherwise
/// discard the least useful one. Never hints.
///
/// Ties among playable cards go to the highest rank, then colour priority,
/// then the oldest card. Discards pick the lowest [`Usefulness`] tier, then
/// the lowest rank, then colour priority, then the oldest card.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerfectPlayPolicy;

impl PerfectPlayPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn best_play(ctx: &PolicyContext) -> Option<usize> {
        let fireworks = ctx.state.fireworks();
        ctx.hand()
            .iter()
            .enumerate()
            .filter(|(_, card)| fireworks.is_playable(**card))
            .min_by_key(|(index, card)| (Reverse(card.rank), card.color, *index))
            .map(|(index, _)| index)
    }

    pub fn discard_candidate(ctx: &PolicyContext) -> Option<(usize, Usefulness)> {
        ctx.hand()
            .iter()
            .enumerate()
            .map(|(index, card)| {
                let usefulness = classify(ctx.state, ctx.player, *card);
                (index, *card, usefulness)
            })
            .min_by_key(|(index, card, usefulness)| (*usefulness, card.rank, card.color, *index))
            .map(|(index, _, usefulness)| (index, usefulness))
    }
}

/// Usefulness of `card` held by `holder`, judged with every hand visible.
pub fn classify(state: &GameState, holder: PlayerId, card: Card) -> Usefulness {
    if state.is_dead(card) {
        return Usefulness::Dead;
    }

    let held_twice = state.hand(holder).count(card) > 1;
    let held_elsewhere = state
        .players()
        .filter(|&player| player != holder)
        .any(|player| state.hand(player).contains(card));
    if held_twice || held_elsewhere {
        return Usefulness::Duplicate;
    }

    if state.live_copies(card) > 1 {
        Usefulness::Expendable
    } else {
        Usefulness::Critical
    }
}

impl Policy for PerfectPlayPolicy {
    fn choose_action(&mut self, ctx: &PolicyContext) -> Action {
        if let Some(index) = Self::best_play(ctx) {
            log_decision(ctx, index, "play_best", None);
            return Action::Play { index };
        }

        match Self::discard_candidate(ctx) {
            Some((index, usefulness)) => {
                log_decision(ctx, index, "discard_least_useful", Some(usefulness));
                Action::Discard { index }
            }
            // Empty hand: let the engine reject the index.
            None => Action::Discard { index: 0 },
        }
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Perfect
    }
}

fn log_decision(ctx: &PolicyContext, index: usize, reason: &str, usefulness: Option<Usefulness>) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let hand = ctx
        .hand()
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let chosen = ctx
        .hand()
        .get(index)
        .map(|card| card.to_string())
        .unwrap_or_default();

    event!(
        target: "hanabi_bot::decision",
        Level::DEBUG,
        player = %ctx.player,
        turn = ctx.state.turns_taken() + 1,
        hand = %hand,
        chosen = %chosen,
        usefulness = ?usefulness,
        fireworks = %ctx.state.fireworks(),
        deck = ctx.state.deck_remaining(),
        reason,
    );
}

use crate::game::error::{InvariantViolation, SetupError};
use crate::game::event::TerminalReason;
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::discard::DiscardPile;
use crate::model::fireworks::Fireworks;
use crate::model::hand::Hand;
use crate::model::player::{PlayerId, hand_size};
use crate::model::rank::Rank;
use crate::model::tokens::Tokens;

/// Complete table state for one game. Only the turn engine mutates it.
#[derive(Debug, Clone)]
pub struct GameState {
    deck: Deck,
    hands: Vec<Hand>,
    fireworks: Fireworks,
    tokens: Tokens,
    discard: DiscardPile,
    active: PlayerId,
    turns_taken: u32,
    final_round: Option<usize>,
    ended: Option<TerminalReason>,
    card_total: usize,
}

impl GameState {
    pub fn new(players: usize, seed: u64) -> Result<Self, SetupError> {
        Self::deal(Deck::shuffled_with_seed(seed), players)
    }

    /// Deal each player's hand in one block, first player first.
    pub fn deal(mut deck: Deck, players: usize) -> Result<Self, SetupError> {
        let per_hand = hand_size(players).ok_or(SetupError::PlayerCount { requested: players })?;
        let needed = per_hand * players;
        if deck.remaining() < needed {
            return Err(SetupError::ShortDeck {
                needed,
                available: deck.remaining(),
            });
        }

        let card_total = deck.remaining();
        let mut hands = Vec::with_capacity(players);
        for _ in 0..players {
            let mut hand = Hand::new();
            for _ in 0..per_hand {
                if let Ok(card) = deck.draw() {
                    hand.add(card);
                }
            }
            hands.push(hand);
        }

        Ok(Self {
            deck,
            hands,
            fireworks: Fireworks::new(),
            tokens: Tokens::new(),
            discard: DiscardPile::new(),
            active: PlayerId::FIRST,
            turns_taken: 0,
            final_round: None,
            ended: None,
            card_total,
        })
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (0..self.hands.len()).filter_map(PlayerId::from_index)
    }

    pub fn hand(&self, player: PlayerId) -> &Hand {
        &self.hands[player.index()]
    }

    pub fn active_player(&self) -> PlayerId {
        self.active
    }

    pub fn fireworks(&self) -> &Fireworks {
        &self.fireworks
    }

    pub fn tokens(&self) -> &Tokens {
        &self.tokens
    }

    pub fn discard(&self) -> &DiscardPile {
        &self.discard
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    /// Turns left once the deck has run out; `None` before that.
    pub fn final_round_remaining(&self) -> Option<usize> {
        self.final_round
    }

    pub fn ended(&self) -> Option<TerminalReason> {
        self.ended
    }

    pub fn score(&self) -> u8 {
        self.fireworks.score()
    }

    /// Cards the game started with, deck plus dealt hands.
    pub fn card_total(&self) -> usize {
        self.card_total
    }

    /// Deck, hands, discard pile and fireworks counted together.
    pub fn cards_accounted(&self) -> usize {
        let in_hands: usize = self.hands.iter().map(Hand::len).sum();
        self.deck.remaining() + in_hands + self.discard.len() + usize::from(self.score())
    }

    /// A card that can never score again: already on its firework, or cut off
    /// because every copy of a lower missing rank was discarded.
    pub fn is_dead(&self, card: Card) -> bool {
        if self.fireworks.is_played(card) {
            return true;
        }
        let next = self.fireworks.height(card.color) + 1;
        (next..card.rank.value())
            .filter_map(Rank::from_value)
            .any(|rank| self.discard.all_copies_gone(Card::new(card.color, rank)))
    }

    /// Copies of `card` not yet in the discard pile.
    pub fn live_copies(&self, card: Card) -> usize {
        usize::from(card.copies()).saturating_sub(self.discard.count(card))
    }

    /// The final-round limit: every card drawn plus one turn each.
    pub fn turn_limit(&self) -> u32 {
        (self.card_total + self.player_count()) as u32
    }

    pub(crate) fn take_card(
        &mut self,
        player: PlayerId,
        index: usize,
    ) -> Result<Card, InvariantViolation> {
        let hand = &mut self.hands[player.index()];
        let hand_len = hand.len();
        hand.take(index)
            .ok_or(InvariantViolation::HandIndexOutOfRange {
                player,
                index,
                hand_len,
            })
    }

    pub(crate) fn draw_into(&mut self, player: PlayerId) -> Result<Card, InvariantViolation> {
        let card = self
            .deck
            .draw()
            .map_err(|_| InvariantViolation::DrawFromEmptyDeck { player })?;
        self.hands[player.index()].add(card);
        Ok(card)
    }

    pub(crate) fn fireworks_mut(&mut self) -> &mut Fireworks {
        &mut self.fireworks
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut Tokens {
        &mut self.tokens
    }

    pub(crate) fn discard_mut(&mut self) -> &mut DiscardPile {
        &mut self.discard
    }

    pub(crate) fn start_final_round(&mut self) -> Result<(), InvariantViolation> {
        if self.final_round.is_some() {
            return Err(InvariantViolation::RepeatedExhaustion);
        }
        self.final_round = Some(self.player_count());
        Ok(())
    }

    /// Count the current turn against the final round, returning what is left.
    pub(crate) fn tick_final_round(&mut self) -> Option<usize> {
        if let Some(remaining) = self.final_round.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.final_round
    }

    pub(crate) fn finish_turn(&mut self, ended: Option<TerminalReason>) {
        self.turns_taken += 1;
        self.ended = ended;
        self.active = self.active.next(self.player_count());
    }

    pub(crate) fn check_conservation(&self) -> Result<(), InvariantViolation> {
        let counted = self.cards_accounted();
        if counted != self.card_total {
            return Err(InvariantViolation::CardsNotConserved {
                expected: self.card_total,
                counted,
            });
        }
        Ok(())
    }
}

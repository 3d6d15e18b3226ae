use crate::model::card::Card;
use crate::model::color::Color;
use crate::model::rank::Rank;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::fmt;

pub const FULL_DECK_SIZE: usize = 50;

/// Draw pile. The front of the sequence is the next card drawn.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    #[cfg(test)]
    pub(crate) fn standard() -> Self {
        Self {
            cards: standard_cards().into(),
        }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = standard_cards();
        cards.shuffle(rng);
        Self {
            cards: cards.into(),
        }
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    /// Full deck whose first cards are `front`, followed by the rest of the
    /// multiset in standard order.
    pub fn stacked(front: &[Card]) -> Result<Self, StackError> {
        let mut rest = standard_cards();
        let mut cards = VecDeque::with_capacity(FULL_DECK_SIZE);
        for &card in front {
            let index = rest
                .iter()
                .position(|&c| c == card)
                .ok_or(StackError::Unavailable(card))?;
            rest.remove(index);
            cards.push_back(card);
        }
        cards.extend(rest);
        Ok(Self { cards })
    }

    /// Deck made of exactly `cards`, in order.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into(),
        }
    }

    pub fn draw(&mut self) -> Result<Card, EmptyDeckError> {
        self.cards.pop_front().ok_or(EmptyDeckError)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

fn standard_cards() -> Vec<Card> {
    let mut cards = Vec::with_capacity(FULL_DECK_SIZE);
    for color in Color::ALL.iter().copied() {
        for rank in Rank::ORDERED.iter().copied() {
            for _ in 0..rank.copies() {
                cards.push(Card::new(color, rank));
            }
        }
    }
    cards
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyDeckError;

impl fmt::Display for EmptyDeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no more cards in deck")
    }
}

impl std::error::Error for EmptyDeckError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    Unavailable(Card),
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackError::Unavailable(card) => {
                write!(f, "no copy of {card} left to stack on the deck")
            }
        }
    }
}

impl std::error::Error for StackError {}

#[cfg(test)]
mod tests {
    use super::{Deck, EmptyDeckError, FULL_DECK_SIZE, StackError};
    use crate::model::card::Card;
    use crate::model::color::Color;
    use crate::model::rank::Rank;

    #[test]
    fn standard_deck_has_fifty_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.remaining(), FULL_DECK_SIZE);
        let red_ones = deck
            .iter()
            .filter(|&&c| c == Card::new(Color::Red, Rank::One))
            .count();
        assert_eq!(red_ones, 3);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a: Vec<_> = Deck::shuffled_with_seed(42).iter().copied().collect();
        let deck_b: Vec<_> = Deck::shuffled_with_seed(42).iter().copied().collect();
        assert_eq!(deck_a, deck_b);
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a: Vec<_> = Deck::shuffled_with_seed(1).iter().copied().collect();
        let deck_b: Vec<_> = Deck::shuffled_with_seed(2).iter().copied().collect();
        assert_ne!(deck_a, deck_b);
    }

    #[test]
    fn draw_takes_from_front_until_empty() {
        let first = Card::new(Color::Green, Rank::Four);
        let second = Card::new(Color::Blue, Rank::Two);
        let mut deck = Deck::from_cards(vec![first, second]);
        assert_eq!(deck.draw(), Ok(first));
        assert_eq!(deck.draw(), Ok(second));
        assert_eq!(deck.draw(), Err(EmptyDeckError));
    }

    #[test]
    fn stacked_deck_keeps_full_multiset() {
        let five = Card::new(Color::Yellow, Rank::Five);
        let mut deck = Deck::stacked(&[five]).unwrap();
        assert_eq!(deck.remaining(), FULL_DECK_SIZE);
        assert_eq!(deck.draw(), Ok(five));
        assert!(deck.iter().all(|&c| c != five));
    }

    #[test]
    fn stacking_too_many_copies_fails() {
        let five = Card::new(Color::Yellow, Rank::Five);
        assert_eq!(
            Deck::stacked(&[five, five]).unwrap_err(),
            StackError::Unavailable(five)
        );
    }
}

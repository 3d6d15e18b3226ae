use crate::model::card::Card;
use std::vec::Vec;

/// Cards held by one player, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn take(&mut self, index: usize) -> Option<Card> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn count(&self, card: Card) -> usize {
        self.cards.iter().filter(|&&c| c == card).count()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;
    use crate::model::color::Color;
    use crate::model::rank::Rank;

    #[test]
    fn add_and_take_cards() {
        let mut hand = Hand::new();
        let card = Card::new(Color::White, Rank::Three);
        hand.add(card);
        assert!(hand.contains(card));
        assert_eq!(hand.take(0), Some(card));
        assert!(!hand.contains(card));
        assert_eq!(hand.take(0), None);
    }

    #[test]
    fn drawn_cards_go_to_the_end() {
        let mut hand = Hand::with_cards(vec![
            Card::new(Color::Blue, Rank::Two),
            Card::new(Color::Red, Rank::One),
        ]);
        hand.add(Card::new(Color::Green, Rank::Five));
        assert_eq!(hand.get(2), Some(Card::new(Color::Green, Rank::Five)));
        assert_eq!(hand.take(0), Some(Card::new(Color::Blue, Rank::Two)));
        assert_eq!(hand.get(0), Some(Card::new(Color::Red, Rank::One)));
    }

    #[test]
    fn counts_duplicates() {
        let one = Card::new(Color::Red, Rank::One);
        let hand = Hand::with_cards(vec![one, Card::new(Color::Red, Rank::Two), one]);
        assert_eq!(hand.count(one), 2);
    }
}

use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const HAND_SIZE: usize = 13;
pub const MAX_SEATS: usize = 4;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealError {
    NoSeats,
    TooManySeats { requested: usize, max: usize },
}

impl fmt::Display for DealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealError::NoSeats => write!(f, "a deal needs at least one seat"),
            DealError::TooManySeats { requested, max } => {
                write!(f, "cannot deal {HAND_SIZE} cards to {requested} seats (max {max})")
            }
        }
    }
}

impl std::error::Error for DealError {}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Seat `i` receives the `i`-th run of thirteen cards.
    pub fn deal(&self, seats: usize) -> Result<Vec<Vec<Card>>, DealError> {
        if seats == 0 {
            return Err(DealError::NoSeats);
        }
        if seats > MAX_SEATS {
            return Err(DealError::TooManySeats {
                requested: seats,
                max: MAX_SEATS,
            });
        }
        Ok(self
            .cards
            .chunks(HAND_SIZE)
            .take(seats)
            .map(<[Card]>::to_vec)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{DealError, Deck, HAND_SIZE};
    use std::collections::HashSet;

    #[test]
    fn standard_deck_has_52_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.cards().len(), 52);
        let unique: HashSet<_> = deck.cards().iter().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn deal_hands_out_thirteen_disjoint_cards_per_seat() {
        let deck = Deck::shuffled_with_seed(7);
        let hands = deck.deal(4).unwrap();
        assert_eq!(hands.len(), 4);
        let mut seen = HashSet::new();
        for hand in &hands {
            assert_eq!(hand.len(), HAND_SIZE);
            for card in hand {
                assert!(seen.insert(*card), "{card} dealt twice");
            }
        }
        assert_eq!(&hands[1][..], &deck.cards()[13..26]);
    }

    #[test]
    fn deal_rejects_impossible_seat_counts() {
        let deck = Deck::standard();
        assert_eq!(deck.deal(0), Err(DealError::NoSeats));
        assert!(matches!(
            deck.deal(5),
            Err(DealError::TooManySeats { requested: 5, .. })
        ));
        assert_eq!(deck.deal(2).unwrap().len(), 2);
    }
}

use crate::model::board::Board;
use crate::model::card::Card;
use core::fmt;
use std::collections::BTreeMap;

/// How close a held card is to being playable. States only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Clarity {
    /// The parent is held by someone else.
    Unclear,
    /// The parent is held (and clear) in this hand.
    SecondaryClear,
    /// Playable against the board right now.
    PrimaryClear,
    Played,
}

impl Clarity {
    pub const fn is_held(self) -> bool {
        !matches!(self, Clarity::Played)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandError {
    NotHeld(Card),
    NotPlayable(Card),
}

impl fmt::Display for HandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandError::NotHeld(card) => write!(f, "{card} is not in this hand"),
            HandError::NotPlayable(card) => write!(f, "{card} is not primary-clear"),
        }
    }
}

impl std::error::Error for HandError {}

#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: BTreeMap<Card, Clarity>,
    classified_at: Option<u32>,
}

impl Hand {
    /// Builds a hand from a dealt set and classifies it against `board`.
    pub fn deal<I>(cards: I, board: &Board) -> Self
    where
        I: IntoIterator<Item = Card>,
    {
        let mut hand = Self {
            cards: cards.into_iter().map(|card| (card, Clarity::Unclear)).collect(),
            classified_at: None,
        };
        hand.refresh(board);
        hand
    }

    /// Recomputes the tiers against `board`.
    ///
    /// Cards the board accepts become primary-clear first; then unclear cards whose
    /// parent is held primary- or secondary-clear become secondary-clear, repeated
    /// until a pass moves nothing. Calling this twice without a board change is a no-op.
    pub fn refresh(&mut self, board: &Board) {
        let ready: Vec<Card> = self
            .cards
            .iter()
            .filter(|(card, clarity)| {
                matches!(clarity, Clarity::Unclear | Clarity::SecondaryClear)
                    && board.is_playable(**card)
            })
            .map(|(card, _)| *card)
            .collect();
        for card in ready {
            self.promote(card, Clarity::PrimaryClear);
        }

        loop {
            let chained: Vec<Card> = self
                .cards
                .iter()
                .filter(|(_, clarity)| **clarity == Clarity::Unclear)
                .filter(|(card, _)| {
                    card.parent()
                        .and_then(|parent| self.cards.get(&parent))
                        .is_some_and(|parent| {
                            matches!(parent, Clarity::PrimaryClear | Clarity::SecondaryClear)
                        })
                })
                .map(|(card, _)| *card)
                .collect();
            if chained.is_empty() {
                break;
            }
            for card in chained {
                self.promote(card, Clarity::SecondaryClear);
            }
        }

        self.classified_at = Some(board.moves());
    }

    /// Whether the tiers reflect the board as it is now.
    pub fn is_current(&self, board: &Board) -> bool {
        self.classified_at == Some(board.moves())
    }

    /// Marks a primary-clear card as played. The classification is stale afterwards.
    pub fn mark_played(&mut self, card: Card) -> Result<(), HandError> {
        match self.cards.get(&card) {
            None | Some(Clarity::Played) => Err(HandError::NotHeld(card)),
            Some(Clarity::PrimaryClear) => {
                self.promote(card, Clarity::Played);
                self.classified_at = None;
                Ok(())
            }
            Some(_) => Err(HandError::NotPlayable(card)),
        }
    }

    pub fn clarity(&self, card: Card) -> Option<Clarity> {
        self.cards.get(&card).copied()
    }

    pub fn tier(&self, clarity: Clarity) -> impl Iterator<Item = Card> + '_ {
        self.cards
            .iter()
            .filter(move |(_, state)| **state == clarity)
            .map(|(card, _)| *card)
    }

    pub fn primary_clear(&self) -> impl Iterator<Item = Card> + '_ {
        self.tier(Clarity::PrimaryClear)
    }

    pub fn secondary_clear(&self) -> impl Iterator<Item = Card> + '_ {
        self.tier(Clarity::SecondaryClear)
    }

    pub fn unclear(&self) -> impl Iterator<Item = Card> + '_ {
        self.tier(Clarity::Unclear)
    }

    pub fn played(&self) -> impl Iterator<Item = Card> + '_ {
        self.tier(Clarity::Played)
    }

    /// Cards still held, in any of the three live tiers.
    pub fn remaining(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards
            .iter()
            .filter(|(_, state)| state.is_held())
            .map(|(card, _)| *card)
    }

    pub fn remaining_len(&self) -> usize {
        self.remaining().count()
    }

    pub fn holds(&self, card: Card) -> bool {
        self.clarity(card).is_some_and(Clarity::is_held)
    }

    /// Size of the hand as dealt, played cards included.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True once every dealt card has been played.
    pub fn is_empty(&self) -> bool {
        self.remaining().next().is_none()
    }

    /// Sum of ranks still held; the loser's penalty at the end of a game.
    pub fn hand_value(&self) -> u32 {
        self.remaining().map(|card| u32::from(card.rank.value())).sum()
    }

    pub fn states(&self) -> impl Iterator<Item = (Card, Clarity)> + '_ {
        self.cards.iter().map(|(card, clarity)| (*card, *clarity))
    }

    fn promote(&mut self, card: Card, to: Clarity) {
        if let Some(state) = self.cards.get_mut(&card) {
            debug_assert!(*state < to, "{card} cannot move from {state:?} to {to:?}");
            *state = to;
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |cards: Vec<Card>| {
            cards
                .iter()
                .map(Card::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        };
        writeln!(f, "Primary clear:   {}", join(self.primary_clear().collect()))?;
        writeln!(f, "Secondary clear: {}", join(self.secondary_clear().collect()))?;
        write!(f, "Unclear:         {}", join(self.unclear().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Clarity, Hand, HandError};
    use crate::model::board::Board;
    use crate::model::card::Card;

    fn cards(tokens: &[&str]) -> Vec<Card> {
        tokens.iter().map(|t| t.parse().unwrap()).collect()
    }

    fn card(token: &str) -> Card {
        token.parse().unwrap()
    }

    #[test]
    fn opening_scenario_reclassifies_as_table_grows() {
        let mut board = Board::new();
        let mut hand = Hand::deal(cards(&["7C", "8C", "6H", "KC"]), &board);
        assert_eq!(hand.unclear().count(), 4);
        assert_eq!(hand.primary_clear().count(), 0);

        board.play(Card::OPENING).unwrap();
        assert!(!hand.is_current(&board));
        hand.refresh(&board);
        assert_eq!(hand.clarity(card("6H")), Some(Clarity::PrimaryClear));
        assert_eq!(hand.clarity(card("7C")), Some(Clarity::PrimaryClear));
        assert_eq!(hand.clarity(card("8C")), Some(Clarity::SecondaryClear));
        assert_eq!(hand.clarity(card("KC")), Some(Clarity::Unclear));

        hand.mark_played(card("7C")).unwrap();
        board.play(card("7C")).unwrap();
        hand.refresh(&board);
        assert_eq!(hand.clarity(card("8C")), Some(Clarity::PrimaryClear));
        assert_eq!(hand.clarity(card("KC")), Some(Clarity::Unclear));
    }

    #[test]
    fn chains_of_held_cards_become_secondary_in_one_refresh() {
        let mut board = Board::new();
        board.play(Card::OPENING).unwrap();
        let hand = Hand::deal(cards(&["7S", "8S", "9S", "10S", "QS"]), &board);
        assert_eq!(hand.clarity(card("7S")), Some(Clarity::PrimaryClear));
        assert_eq!(hand.clarity(card("8S")), Some(Clarity::SecondaryClear));
        assert_eq!(hand.clarity(card("9S")), Some(Clarity::SecondaryClear));
        assert_eq!(hand.clarity(card("10S")), Some(Clarity::SecondaryClear));
        assert_eq!(hand.clarity(card("QS")), Some(Clarity::Unclear));
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut board = Board::new();
        board.play(Card::OPENING).unwrap();
        board.play(card("8H")).unwrap();
        let mut hand = Hand::deal(cards(&["9H", "10H", "6D", "7D", "2C"]), &board);
        let first: Vec<_> = hand.states().collect();
        hand.refresh(&board);
        let second: Vec<_> = hand.states().collect();
        assert_eq!(first, second);
        assert!(hand.is_current(&board));
    }

    #[test]
    fn only_primary_cards_can_be_marked_played() {
        let board = Board::new();
        let mut hand = Hand::deal(cards(&["7H", "8H", "KS"]), &board);
        assert_eq!(hand.mark_played(card("8H")), Err(HandError::NotPlayable(card("8H"))));
        assert_eq!(hand.mark_played(card("2D")), Err(HandError::NotHeld(card("2D"))));
        hand.mark_played(Card::OPENING).unwrap();
        assert_eq!(hand.mark_played(Card::OPENING), Err(HandError::NotHeld(Card::OPENING)));
        assert_eq!(hand.len(), 3);
        assert_eq!(hand.remaining_len(), 2);
        assert!(!hand.holds(Card::OPENING));
    }

    #[test]
    fn hand_value_sums_remaining_ranks() {
        let board = Board::new();
        let mut hand = Hand::deal(cards(&["7H", "KS", "AC"]), &board);
        assert_eq!(hand.hand_value(), 7 + 13 + 1);
        hand.mark_played(Card::OPENING).unwrap();
        assert_eq!(hand.hand_value(), 14);
        assert!(!hand.is_empty());
    }

    #[test]
    fn display_lists_each_tier() {
        let board = Board::new();
        let hand = Hand::deal(cards(&["7H", "8H", "KS"]), &board);
        let text = hand.to_string();
        assert!(text.contains("Primary clear:   7H"));
        assert!(text.contains("Secondary clear: 8H"));
        assert!(text.contains("Unclear:         KS"));
    }
}

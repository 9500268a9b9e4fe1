use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    /// The only card that may open an empty table.
    pub const OPENING: Card = Card::new(Rank::Seven, Suit::Hearts);

    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn distance(self) -> u8 {
        self.rank.distance()
    }

    /// The same-suit card one step closer to the seven, or `None` for a seven.
    pub fn parent(self) -> Option<Card> {
        self.rank
            .toward_seven()
            .map(|rank| Card::new(rank, self.suit))
    }

    /// Ancestors from the immediate parent down to the suit's seven.
    pub fn branch(self) -> Vec<Card> {
        let mut branch = Vec::with_capacity(self.distance() as usize);
        let mut cursor = self;
        while let Some(parent) = cursor.parent() {
            branch.push(parent);
            cursor = parent;
        }
        branch
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.suit.cmp(&other.suit).then(self.rank.cmp(&other.rank))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardParseError {
    Empty,
    UnknownRank(String),
    UnknownSuit(String),
}

impl fmt::Display for CardParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardParseError::Empty => write!(f, "empty card token"),
            CardParseError::UnknownRank(token) => write!(f, "unknown rank in '{token}'"),
            CardParseError::UnknownSuit(token) => write!(f, "unknown suit in '{token}'"),
        }
    }
}

impl std::error::Error for CardParseError {}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let suit_letter = token.chars().last().ok_or(CardParseError::Empty)?;
        let suit = Suit::from_letter(suit_letter)
            .ok_or_else(|| CardParseError::UnknownSuit(token.to_string()))?;
        let rank_text = &token[..token.len() - suit_letter.len_utf8()];
        let rank = Rank::from_symbol(rank_text)
            .ok_or_else(|| CardParseError::UnknownRank(token.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

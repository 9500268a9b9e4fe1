use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;

/// Played ranks of one suit. An open run always contains the seven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuitRun {
    Unopened,
    Open { low: Rank, high: Rank },
}

impl SuitRun {
    pub fn contains(self, rank: Rank) -> bool {
        match self {
            SuitRun::Unopened => false,
            SuitRun::Open { low, high } => low <= rank && rank <= high,
        }
    }

    /// Ranks that would extend this run by one step, lower end first.
    pub fn frontier(self) -> [Option<Rank>; 2] {
        match self {
            SuitRun::Unopened => [Some(Rank::Seven), None],
            SuitRun::Open { low, high } => [
                Rank::from_value(low.value() - 1),
                Rank::from_value(high.value() + 1),
            ],
        }
    }

    fn extended(self, rank: Rank) -> Option<SuitRun> {
        match self {
            SuitRun::Unopened if rank == Rank::Seven => Some(SuitRun::Open {
                low: Rank::Seven,
                high: Rank::Seven,
            }),
            SuitRun::Unopened => None,
            SuitRun::Open { low, high } => {
                if rank.value() + 1 == low.value() {
                    Some(SuitRun::Open { low: rank, high })
                } else if rank.value() == high.value() + 1 {
                    Some(SuitRun::Open { low, high: rank })
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    InvalidMove(Card),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::InvalidMove(card) => write!(f, "{card} cannot be played on the table"),
        }
    }
}

impl std::error::Error for BoardError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    runs: [SuitRun; 4],
    opened: bool,
    moves: u32,
}

impl Board {
    pub const fn new() -> Self {
        Self {
            runs: [SuitRun::Unopened; 4],
            opened: false,
            moves: 0,
        }
    }

    pub const fn is_opened(&self) -> bool {
        self.opened
    }

    /// Number of cards played so far. Hands compare against this to detect stale
    /// classifications.
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    pub const fn run(&self, suit: Suit) -> SuitRun {
        self.runs[suit.index()]
    }

    pub fn is_on_table(&self, card: Card) -> bool {
        self.run(card.suit).contains(card.rank)
    }

    pub fn is_playable(&self, card: Card) -> bool {
        if !self.opened {
            return card == Card::OPENING;
        }
        self.run(card.suit).extended(card.rank).is_some()
    }

    pub fn play(&mut self, card: Card) -> Result<(), BoardError> {
        if !self.is_playable(card) {
            return Err(BoardError::InvalidMove(card));
        }
        let slot = &mut self.runs[card.suit.index()];
        *slot = slot.extended(card.rank).ok_or(BoardError::InvalidMove(card))?;
        self.opened = true;
        self.moves += 1;
        Ok(())
    }

    /// Every card that could legally be played right now.
    pub fn playable_cards(&self) -> Vec<Card> {
        if !self.opened {
            return vec![Card::OPENING];
        }
        Suit::ALL
            .iter()
            .flat_map(|&suit| {
                self.run(suit)
                    .frontier()
                    .into_iter()
                    .flatten()
                    .map(move |rank| Card::new(rank, suit))
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table:")?;
        for rank in Rank::ORDERED {
            for suit in Suit::ALL {
                if self.run(suit).contains(rank) {
                    write!(f, "  {rank}{}\t", suit.symbol())?;
                } else {
                    f.write_str("\t")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

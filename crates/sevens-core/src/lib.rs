#![deny(warnings)]
pub mod model;

pub use model::board::{Board, BoardError, SuitRun};
pub use model::card::{Card, CardParseError};
pub use model::deck::{DealError, Deck, HAND_SIZE};
pub use model::hand::{Clarity, Hand, HandError};
pub use model::rank::Rank;
pub use model::suit::Suit;

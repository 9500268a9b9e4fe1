//! Turn loop for one game of Sevens.
//!
//! Seats act in fixed rotation starting from the holder of the opening card. Each turn
//! reclassifies the acting hand, asks its policy for a card, and applies the choice to
//! the board and hand together. The game ends on the play that empties a hand, or when
//! every seat passes in a row and nothing can move again.

use crate::policy::{Policy, PolicyContext};
use serde::Serialize;
use sevens_core::model::board::{Board, BoardError};
use sevens_core::model::card::Card;
use sevens_core::model::deck::{DealError, Deck};
use sevens_core::model::hand::{Hand, HandError};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, event};

pub const MIN_SEATS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Played { seat: usize, card: Card },
    Passed { seat: usize },
    /// The card that left `seat` with nothing in hand; the game is over.
    HandEmptied { seat: usize, card: Card },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Won { seat: usize },
    /// Every seat passed in a row with the board unchanged.
    Stalled,
}

impl SessionState {
    pub const fn is_finished(self) -> bool {
        !matches!(self, SessionState::InProgress)
    }
}

#[derive(Debug)]
pub enum SessionError {
    GameOver,
    TooFewSeats(usize),
    SeatMismatch { hands: usize, policies: usize },
    Deal(DealError),
    Board(BoardError),
    Hand(HandError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::GameOver => write!(f, "the game has already ended"),
            SessionError::TooFewSeats(count) => {
                write!(f, "a game needs at least {MIN_SEATS} seats, got {count}")
            }
            SessionError::SeatMismatch { hands, policies } => {
                write!(f, "{hands} hands dealt but {policies} policies supplied")
            }
            SessionError::Deal(err) => write!(f, "deal failed: {err}"),
            SessionError::Board(err) => write!(f, "board rejected move: {err}"),
            SessionError::Hand(err) => write!(f, "hand rejected move: {err}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Deal(err) => Some(err),
            SessionError::Board(err) => Some(err),
            SessionError::Hand(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DealError> for SessionError {
    fn from(err: DealError) -> Self {
        SessionError::Deal(err)
    }
}

impl From<BoardError> for SessionError {
    fn from(err: BoardError) -> Self {
        SessionError::Board(err)
    }
}

impl From<HandError> for SessionError {
    fn from(err: HandError) -> Self {
        SessionError::Hand(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayRecord {
    pub seat: usize,
    pub card: Card,
}

/// Result of a finished (or abandoned) game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameReport {
    pub winner: Option<usize>,
    pub stalled: bool,
    /// Sum of ranks left in each seat's hand; the winner's is zero.
    pub hand_values: Vec<u32>,
    pub turns: u32,
    pub plays: Vec<PlayRecord>,
}

struct Seat {
    hand: Hand,
    policy: Box<dyn Policy>,
}

pub struct GameSession {
    board: Board,
    seats: Vec<Seat>,
    current: usize,
    consecutive_passes: usize,
    turns: u32,
    plays: Vec<PlayRecord>,
    state: SessionState,
}

impl GameSession {
    /// Starts a game from explicit hands, one policy per hand.
    pub fn new(
        hands: Vec<Vec<Card>>,
        policies: Vec<Box<dyn Policy>>,
    ) -> Result<Self, SessionError> {
        if hands.len() < MIN_SEATS {
            return Err(SessionError::TooFewSeats(hands.len()));
        }
        if hands.len() != policies.len() {
            return Err(SessionError::SeatMismatch {
                hands: hands.len(),
                policies: policies.len(),
            });
        }

        let board = Board::new();
        let current = hands
            .iter()
            .position(|cards| cards.contains(&Card::OPENING))
            .unwrap_or(0);
        let seats = hands
            .into_iter()
            .zip(policies)
            .map(|(cards, policy)| Seat {
                hand: Hand::deal(cards, &board),
                policy,
            })
            .collect();

        Ok(Self {
            board,
            seats,
            current,
            consecutive_passes: 0,
            turns: 0,
            plays: Vec::new(),
            state: SessionState::InProgress,
        })
    }

    /// Deals 13 cards from `deck` to each policy's seat.
    pub fn deal(deck: &Deck, policies: Vec<Box<dyn Policy>>) -> Result<Self, SessionError> {
        let hands = deck.deal(policies.len())?;
        Self::new(hands, policies)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hand(&self, seat: usize) -> Option<&Hand> {
        self.seats.get(seat).map(|seat| &seat.hand)
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn current_seat(&self) -> usize {
        self.current
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Plays one turn for the current seat.
    pub fn take_turn(&mut self) -> Result<TurnOutcome, SessionError> {
        if self.state.is_finished() {
            return Err(SessionError::GameOver);
        }

        let seat_index = self.current;
        let Seat { hand, policy } = &mut self.seats[seat_index];
        hand.refresh(&self.board);
        let choice = {
            let ctx = PolicyContext {
                seat: seat_index,
                hand,
                board: &self.board,
            };
            policy.choose_play(&ctx)
        };

        let outcome = match choice {
            Some(card) => {
                if !self.board.is_playable(card) {
                    return Err(BoardError::InvalidMove(card).into());
                }
                hand.mark_played(card)?;
                self.board.play(card)?;
                self.plays.push(PlayRecord {
                    seat: seat_index,
                    card,
                });
                self.consecutive_passes = 0;
                if hand.is_empty() {
                    self.state = SessionState::Won { seat: seat_index };
                    TurnOutcome::HandEmptied {
                        seat: seat_index,
                        card,
                    }
                } else {
                    TurnOutcome::Played {
                        seat: seat_index,
                        card,
                    }
                }
            }
            None => {
                self.consecutive_passes += 1;
                if self.consecutive_passes >= self.seats.len() {
                    self.state = SessionState::Stalled;
                }
                TurnOutcome::Passed { seat: seat_index }
            }
        };

        self.turns += 1;
        if self.state.is_finished() {
            self.log_finish();
        } else {
            self.current = (self.current + 1) % self.seats.len();
        }
        Ok(outcome)
    }

    /// Plays until the game ends.
    pub fn run(&mut self) -> Result<GameReport, SessionError> {
        while !self.state.is_finished() {
            self.take_turn()?;
        }
        Ok(self.report())
    }

    /// Like [`run`](Self::run), but checks `abort` between turns and returns `None` if set.
    pub fn run_with_abort(
        &mut self,
        abort: &AtomicBool,
    ) -> Result<Option<GameReport>, SessionError> {
        while !self.state.is_finished() {
            if abort.load(Ordering::Relaxed) {
                return Ok(None);
            }
            self.take_turn()?;
        }
        Ok(Some(self.report()))
    }

    pub fn report(&self) -> GameReport {
        let winner = match self.state {
            SessionState::Won { seat } => Some(seat),
            _ => None,
        };
        GameReport {
            winner,
            stalled: matches!(self.state, SessionState::Stalled),
            hand_values: self.seats.iter().map(|seat| seat.hand.hand_value()).collect(),
            turns: self.turns,
            plays: self.plays.clone(),
        }
    }

    fn log_finish(&self) {
        if !tracing::enabled!(target: "sevens_bot::session", Level::DEBUG) {
            return;
        }
        let values = self
            .seats
            .iter()
            .map(|seat| seat.hand.hand_value().to_string())
            .collect::<Vec<_>>()
            .join(",");
        event!(
            target: "sevens_bot::session",
            Level::DEBUG,
            state = ?self.state,
            turns = self.turns,
            plays = self.plays.len(),
            hand_values = %values,
        );
    }
}

mod heuristic;

pub use heuristic::HeuristicPolicy;

use sevens_core::model::board::Board;
use sevens_core::model::card::Card;
use sevens_core::model::hand::Hand;

/// What a policy sees on its turn. `hand` is classified against `board`.
pub struct PolicyContext<'a> {
    pub seat: usize,
    pub hand: &'a Hand,
    pub board: &'a Board,
}

/// Chooses a card for one seat; `None` means pass.
pub trait Policy: Send {
    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Card>;
}

/// A primary-clear card up for selection, with the unclear card it opens the way to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub card: Card,
    pub blocks: Option<Card>,
}

/// Scores used by the weighted tier. Higher is better; both must be total.
pub trait Scorer: Send + Sync {
    /// Desirability of playing a card that blocks nothing of ours.
    fn score_hold(&self, candidate: &Candidate) -> f64;
    /// Desirability of playing a card that blocks `candidate.blocks`.
    fn score_play(&self, candidate: &Candidate) -> f64;
}

/// Scores every card by its distance from the seven.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceScorer;

impl Scorer for DistanceScorer {
    fn score_hold(&self, candidate: &Candidate) -> f64 {
        f64::from(candidate.card.distance())
    }

    fn score_play(&self, candidate: &Candidate) -> f64 {
        f64::from(candidate.card.distance())
    }
}

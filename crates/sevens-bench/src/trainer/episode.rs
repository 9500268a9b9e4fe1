use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sevens_bot::{
    BotDifficulty, GameReport, GameSession, HeuristicPolicy, Policy, Scorer, SessionError,
};
use sevens_core::model::deck::Deck;

const TRIAL_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for one trial of a batch, independent of the order trials run in.
pub fn trial_seed(batch_seed: u64, trial: usize) -> u64 {
    batch_seed ^ (trial as u64 + 1).wrapping_mul(TRIAL_SEED_MIX)
}

/// Builds one policy per seat. Weighted seats share `scorer`.
pub fn seat_policies(
    seats: &[BotDifficulty],
    scorer: &Arc<dyn Scorer>,
    rng: &mut StdRng,
) -> Vec<Box<dyn Policy>> {
    seats
        .iter()
        .map(|difficulty| {
            let policy = HeuristicPolicy::new(*difficulty).with_seed(rng.next_u64());
            let policy = if *difficulty == BotDifficulty::Weighted {
                policy.with_scorer(Arc::clone(scorer))
            } else {
                policy
            };
            Box::new(policy) as Box<dyn Policy>
        })
        .collect()
}

/// Deals a fresh deck from `seed` and plays it out.
pub fn play_game(
    seed: u64,
    seats: &[BotDifficulty],
    scorer: &Arc<dyn Scorer>,
) -> Result<GameReport, SessionError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let deck = Deck::shuffled(&mut rng);
    let policies = seat_policies(seats, scorer, &mut rng);
    GameSession::deal(&deck, policies)?.run()
}

/// What one training game meant for the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialOutcome {
    pub learner_won: bool,
    /// Learner's remaining hand value; zero on a win.
    pub learner_points: u32,
    pub stalled: bool,
}

impl TrialOutcome {
    pub fn from_report(report: &GameReport, learner_seat: usize) -> Self {
        let learner_won = report.winner == Some(learner_seat);
        Self {
            learner_won,
            learner_points: if learner_won {
                0
            } else {
                report.hand_values.get(learner_seat).copied().unwrap_or(0)
            },
            stalled: report.stalled,
        }
    }
}

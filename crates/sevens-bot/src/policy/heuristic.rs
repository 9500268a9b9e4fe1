use super::{DistanceScorer, Policy, PolicyContext, Scorer};
use crate::bot::{BotDifficulty, PlayPlanner};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sevens_core::model::card::Card;
use std::sync::Arc;
use tracing::{Level, event};

/// Adapter that runs `PlayPlanner` for one seat at a fixed difficulty.
pub struct HeuristicPolicy {
    difficulty: BotDifficulty,
    rng: SmallRng,
    scorer: Arc<dyn Scorer>,
}

impl HeuristicPolicy {
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self {
            difficulty,
            rng: SmallRng::from_entropy(),
            scorer: Arc::new(DistanceScorer),
        }
    }

    pub fn from_env() -> Self {
        Self::new(BotDifficulty::from_env())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn difficulty(&self) -> BotDifficulty {
        self.difficulty
    }
}

impl Policy for HeuristicPolicy {
    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Card> {
        debug_assert!(ctx.hand.is_current(ctx.board), "hand classified against a stale board");
        let decision =
            PlayPlanner::choose(ctx.hand, self.difficulty, &mut self.rng, self.scorer.as_ref());
        match decision {
            Some(decision) => {
                log_play_decision(ctx, self.difficulty, Some(decision.card), decision.reason);
                Some(decision.card)
            }
            None => {
                log_play_decision(ctx, self.difficulty, None, "no_primary_clear");
                None
            }
        }
    }
}

fn log_play_decision(
    ctx: &PolicyContext,
    difficulty: BotDifficulty,
    chosen: Option<Card>,
    reason: &str,
) {
    if !tracing::enabled!(target: "sevens_bot::play", Level::DEBUG) {
        return;
    }

    let candidates: Vec<Card> = ctx.hand.primary_clear().collect();
    let preview = if candidates.len() <= 6 {
        candidates
            .iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(",")
    } else {
        format!("{} cards", candidates.len())
    };
    let choice = chosen.map_or_else(|| "pass".to_string(), |card| card.to_string());

    event!(
        target: "sevens_bot::play",
        Level::DEBUG,
        seat = ctx.seat,
        difficulty = %difficulty,
        level = difficulty.level(),
        candidate_count = candidates.len(),
        candidates = %preview,
        chosen = %choice,
        remaining = ctx.hand.remaining_len(),
        board_moves = ctx.board.moves(),
        reason,
    );
}

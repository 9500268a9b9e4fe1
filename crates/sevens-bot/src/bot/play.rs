use super::{BlockerSplit, BotDifficulty};
use crate::policy::{Candidate, Scorer};
use rand::Rng;
use rand::seq::IteratorRandom;
use sevens_core::model::card::Card;
use sevens_core::model::hand::Hand;

/// A selected card and a short tag for the decision log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub card: Card,
    pub reason: &'static str,
}

pub struct PlayPlanner;

impl PlayPlanner {
    /// Picks one primary-clear card, or `None` when the hand must pass.
    ///
    /// `hand` must already be classified against the current board.
    pub fn choose<R: Rng + ?Sized>(
        hand: &Hand,
        difficulty: BotDifficulty,
        rng: &mut R,
        scorer: &dyn Scorer,
    ) -> Option<Decision> {
        match difficulty {
            BotDifficulty::Random => hand.primary_clear().choose(rng).map(|card| Decision {
                card,
                reason: "random_primary",
            }),
            BotDifficulty::Distance => {
                first_best(hand.primary_clear(), distance_score).map(|card| Decision {
                    card,
                    reason: "farthest_primary",
                })
            }
            BotDifficulty::Blocking => {
                let split = BlockerSplit::from_hand(hand);
                if split.has_blockers() {
                    first_best(split.blockers(), distance_score).map(|card| Decision {
                        card,
                        reason: "farthest_blocker",
                    })
                } else {
                    first_best(split.holders(), distance_score).map(|card| Decision {
                        card,
                        reason: "farthest_holder",
                    })
                }
            }
            BotDifficulty::Weighted => {
                let split = BlockerSplit::from_hand(hand);
                if split.has_blockers() {
                    let score = |card: Card| {
                        scorer.score_play(&Candidate {
                            card,
                            blocks: split.blocked_by(card),
                        })
                    };
                    first_best(split.blockers(), score).map(|card| Decision {
                        card,
                        reason: "scored_blocker",
                    })
                } else {
                    let score = |card: Card| scorer.score_hold(&Candidate { card, blocks: None });
                    first_best(split.holders(), score).map(|card| Decision {
                        card,
                        reason: "scored_holder",
                    })
                }
            }
        }
    }
}

fn distance_score(card: Card) -> f64 {
    f64::from(card.distance())
}

// Strict `>` keeps the earliest card on ties; `max_by` would keep the last.
fn first_best<I, F>(cards: I, mut score: F) -> Option<Card>
where
    I: IntoIterator<Item = Card>,
    F: FnMut(Card) -> f64,
{
    let mut best: Option<(Card, f64)> = None;
    for card in cards {
        let value = score(card);
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((card, value));
        }
    }
    best.map(|(card, _)| card)
}

#[cfg(test)]
mod tests {
    use super::{PlayPlanner, first_best};
    use crate::bot::{BotDifficulty, WeightTable, pair_index};
    use crate::policy::DistanceScorer;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use sevens_core::model::board::Board;
    use sevens_core::model::card::Card;
    use sevens_core::model::hand::Hand;
    use sevens_core::model::rank::Rank;

    fn card(token: &str) -> Card {
        token.parse().unwrap()
    }

    fn board_with(tokens: &[&str]) -> Board {
        let mut board = Board::new();
        for token in tokens {
            board.play(card(token)).unwrap();
        }
        board
    }

    fn pick(hand: &Hand, difficulty: BotDifficulty) -> Option<Card> {
        let mut rng = SmallRng::seed_from_u64(1);
        PlayPlanner::choose(hand, difficulty, &mut rng, &DistanceScorer).map(|d| d.card)
    }

    #[test]
    fn empty_primary_tier_passes_at_every_level() {
        let board = board_with(&["7H"]);
        let hand = Hand::deal([card("KS"), card("2D")], &board);
        for difficulty in BotDifficulty::ALL {
            assert_eq!(pick(&hand, difficulty), None, "{difficulty}");
        }
    }

    #[test]
    fn random_level_only_picks_primary_cards() {
        let board = board_with(&["7H"]);
        let hand = Hand::deal([card("6H"), card("8H"), card("9H"), card("KS")], &board);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..32 {
            let decision =
                PlayPlanner::choose(&hand, BotDifficulty::Random, &mut rng, &DistanceScorer)
                    .unwrap();
            assert!(matches!(decision.card.to_string().as_str(), "6H" | "8H"));
        }
    }

    #[test]
    fn distance_level_prefers_farthest_and_first_on_ties() {
        let board = board_with(&["7H", "8H", "7S", "6S", "5S"]);
        let hand = Hand::deal([card("9H"), card("4S"), card("8S")], &board);
        // 4S is distance 3, beats 9H (2) and 8S (1).
        assert_eq!(pick(&hand, BotDifficulty::Distance), Some(card("4S")));

        let board = board_with(&["7H"]);
        let hand = Hand::deal([card("6H"), card("8H")], &board);
        // Equal distance: hearts 6 comes before 8 in hand order.
        assert_eq!(pick(&hand, BotDifficulty::Distance), Some(card("6H")));
    }

    #[test]
    fn blocking_level_prefers_blockers_over_farther_holders() {
        let board = board_with(&["7H", "8H", "9H", "7D", "6D"]);
        // 10H is a free-standing far card; 5D opens the way to 3D, held and unclear.
        let hand = Hand::deal([card("10H"), card("5D"), card("3D")], &board);
        assert_eq!(pick(&hand, BotDifficulty::Distance), Some(card("10H")));
        assert_eq!(pick(&hand, BotDifficulty::Blocking), Some(card("5D")));
    }

    #[test]
    fn blocking_level_falls_back_to_farthest_holder() {
        let board = board_with(&["7H", "6H"]);
        let hand = Hand::deal([card("5H"), card("8H"), card("7C")], &board);
        assert_eq!(pick(&hand, BotDifficulty::Blocking), Some(card("5H")));
    }

    #[test]
    fn weighted_level_ranks_by_scorer() {
        let board = board_with(&["7H"]);
        let hand = Hand::deal([card("6H"), card("8H"), card("7S"), card("KS")], &board);
        let mut weights = WeightTable::zeros();
        // No blockers for hearts; 7S blocks KS. Make the pair expensive but it is the
        // only blocker, so it is still chosen.
        let pair = pair_index(Rank::Seven, Rank::King).unwrap();
        weights.play[pair] = -3.0;
        let mut rng = SmallRng::seed_from_u64(3);
        let decision =
            PlayPlanner::choose(&hand, BotDifficulty::Weighted, &mut rng, &weights).unwrap();
        assert_eq!(decision.card, card("7S"));
        assert_eq!(decision.reason, "scored_blocker");

        let hand = Hand::deal([card("6H"), card("8H")], &board);
        weights.hold[Rank::Eight.value() as usize - 1] = 1.0;
        let decision =
            PlayPlanner::choose(&hand, BotDifficulty::Weighted, &mut rng, &weights).unwrap();
        assert_eq!(decision.card, card("8H"));
    }

    #[test]
    fn weighted_level_ranks_blockers_by_pair_weight() {
        let board = board_with(&["7H", "7D", "6D"]);
        // 7S blocks 9S and 5D blocks 3D; by distance 5D would go first.
        let hand = Hand::deal([card("7S"), card("9S"), card("5D"), card("3D")], &board);
        let mut weights = WeightTable::zeros();
        weights.play[pair_index(Rank::Seven, Rank::Nine).unwrap()] = 5.0;

        assert_eq!(pick(&hand, BotDifficulty::Blocking), Some(card("5D")));
        let mut rng = SmallRng::seed_from_u64(3);
        let decision =
            PlayPlanner::choose(&hand, BotDifficulty::Weighted, &mut rng, &weights).unwrap();
        assert_eq!(decision.card, card("7S"));
        assert_eq!(decision.reason, "scored_blocker");
    }

    #[test]
    fn weighted_with_distance_scorer_matches_blocking() {
        let board = board_with(&["7H", "8H", "9H", "7D", "6D"]);
        let hand = Hand::deal([card("10H"), card("5D"), card("3D"), card("7C")], &board);
        assert_eq!(
            pick(&hand, BotDifficulty::Weighted),
            pick(&hand, BotDifficulty::Blocking)
        );
    }

    #[test]
    fn first_best_keeps_earliest_maximum() {
        let cards = [card("2S"), card("3S"), card("4S")];
        assert_eq!(first_best(cards, |_| 1.0), Some(card("2S")));
        assert_eq!(first_best([], |_: Card| 1.0), None);
    }
}

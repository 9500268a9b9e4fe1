use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use sevens_bot::{BotDifficulty, DistanceScorer, GameReport, Scorer, SessionError, WeightTable};

use crate::analytics::{AnalyticsError, SeatStats, WinRate};
use crate::trainer::play_game;

/// Seeded games between fixed difficulties.
pub struct Simulation {
    seats: Vec<BotDifficulty>,
    scorer: Arc<dyn Scorer>,
    games: usize,
    seed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub games: usize,
    pub stalls: usize,
    pub seats: Vec<SeatStats>,
}

impl SimulationSummary {
    pub fn win_rate(&self, seat: usize) -> Result<Option<WinRate>, AnalyticsError> {
        self.seats
            .get(seat)
            .map(|stats| WinRate::estimate(stats.wins, self.games))
            .transpose()
    }
}

impl Simulation {
    pub fn new(seats: Vec<BotDifficulty>, games: usize, seed: u64) -> Self {
        Self {
            seats,
            scorer: Arc::new(DistanceScorer),
            games,
            seed,
        }
    }

    /// Weighted seats score with `weights` instead of plain distance.
    pub fn with_weights(mut self, weights: WeightTable) -> Self {
        self.scorer = Arc::new(weights);
        self
    }

    pub fn run(&self) -> Result<SimulationSummary, SessionError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let seeds: Vec<u64> = (0..self.games).map(|_| rng.next_u64()).collect();
        let reports: Vec<GameReport> = seeds
            .into_par_iter()
            .map(|seed| play_game(seed, &self.seats, &self.scorer))
            .collect::<Result<_, _>>()?;

        let mut seats: Vec<SeatStats> = self
            .seats
            .iter()
            .enumerate()
            .map(|(seat, difficulty)| SeatStats::new(seat, *difficulty))
            .collect();
        let mut stalls = 0;
        for report in &reports {
            if report.stalled {
                stalls += 1;
            }
            if let Some(winner) = report.winner {
                if let Some(stats) = seats.get_mut(winner) {
                    stats.wins += 1;
                }
            }
            for (stats, value) in seats.iter_mut().zip(&report.hand_values) {
                stats.total_hand_value += u64::from(*value);
            }
        }

        Ok(SimulationSummary {
            games: self.games,
            stalls,
            seats,
        })
    }
}

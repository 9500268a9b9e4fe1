//! Random-perturbation hill climbing over the weighted tier's scores.
//!
//! Every iteration nudges all weights by a uniform random delta, plays a batch of
//! games with the learner on the candidate weights, and keeps the candidate only if
//! it wins more often than the best so far. Runs are reproducible from the seed:
//! each trial draws its deal and policy seeds from its index, not from thread order.

mod episode;

pub use episode::{TrialOutcome, play_game, seat_policies, trial_seed};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use sevens_bot::bot::{WeightDelta, WeightError};
use sevens_bot::{BotDifficulty, Scorer, SessionError, WeightTable};
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsError, IterationRow, TrainingReport, WinRate};
use crate::config::{ResolvedOutputs, TrainingConfig};

/// Totals for one batch of trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub wins: usize,
    pub points: u64,
    pub stalls: usize,
}

impl BatchResult {
    fn record(mut self, outcome: TrialOutcome) -> Self {
        if outcome.learner_won {
            self.wins += 1;
        } else {
            self.points += u64::from(outcome.learner_points);
        }
        if outcome.stalled {
            self.stalls += 1;
        }
        self
    }
}

/// Summary details returned after a run.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub iterations_run: usize,
    pub accepted: usize,
    pub best_wins: usize,
    pub best_points: Option<u64>,
    pub aborted: bool,
    pub weights: WeightTable,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub weights_path: PathBuf,
}

pub struct Trainer {
    config: TrainingConfig,
    outputs: ResolvedOutputs,
    seats: Vec<BotDifficulty>,
    initial: WeightTable,
}

impl Trainer {
    /// Build a trainer from a validated configuration, loading starting weights if set.
    pub fn new(config: TrainingConfig, outputs: ResolvedOutputs) -> Result<Self, TrainerError> {
        let initial = match config.table.initial_weights.as_ref() {
            Some(path) => WeightTable::from_file(path).map_err(|source| TrainerError::Weights {
                path: path.clone(),
                source,
            })?,
            None => WeightTable::zeros(),
        };
        let seats = config.table.seat_difficulties();
        Ok(Self {
            config,
            outputs,
            seats,
            initial,
        })
    }

    pub fn run(&self) -> Result<TrainingSummary, TrainerError> {
        self.run_with_abort(&AtomicBool::new(false))
    }

    /// Runs the search, checking `abort` between iterations. Outputs are written either way.
    pub fn run_with_abort(&self, abort: &AtomicBool) -> Result<TrainingSummary, TrainerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        ensure_parent(self.outputs.weights.parent())?;

        let search = &self.config.search;
        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(search.seed.unwrap_or(0));
        let mut weights = self.initial.clone();
        let mut best_wins = 0usize;
        let mut best_points: Option<u64> = None;
        let mut accepted = 0usize;
        let mut iterations_run = 0usize;
        let mut aborted = false;

        for iteration in 0..search.iterations {
            if abort.load(Ordering::Relaxed) {
                aborted = true;
                break;
            }

            let delta = WeightDelta::sample(&mut rng);
            let candidate = weights.perturbed(&delta, search.step_size);
            let batch_seed = rng.next_u64();
            let batch = self.evaluate(&candidate, batch_seed)?;

            let threshold = best_wins as f64 + search.trials as f64 * search.win_margin;
            let improved = batch.wins as f64 > threshold;
            if improved {
                weights = candidate;
                best_wins = batch.wins;
                best_points = Some(batch.points);
                accepted += 1;
            }

            let row = IterationRow {
                run_id: self.config.run_id.clone(),
                iteration,
                wins: batch.wins,
                trials: search.trials,
                points: batch.points,
                stalls: batch.stalls,
                accepted: improved,
                best_wins,
            };
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            iterations_run += 1;

            if tracing::enabled!(target: "sevens_bench::train", Level::INFO) {
                event!(
                    target: "sevens_bench::train",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    iteration = iteration as u64,
                    wins = batch.wins as u64,
                    trials = search.trials as u64,
                    points = batch.points,
                    stalls = batch.stalls as u64,
                    accepted = improved,
                    best_wins = best_wins as u64,
                );
            }
        }

        writer.flush()?;
        weights
            .to_file(&self.outputs.weights)
            .map_err(|source| TrainerError::Weights {
                path: self.outputs.weights.clone(),
                source,
            })?;

        let report = TrainingReport {
            run_id: self.config.run_id.clone(),
            seats: self.seats.clone(),
            learner_seat: self.config.table.learner_seat,
            iterations_run,
            iterations_planned: search.iterations,
            accepted,
            best: WinRate::estimate(best_wins, search.trials)?,
            best_points,
            aborted,
        };
        report.write_markdown(&self.outputs.summary_md)?;

        Ok(TrainingSummary {
            iterations_run,
            accepted,
            best_wins,
            best_points,
            aborted,
            weights,
            rows_written: iterations_run,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            weights_path: self.outputs.weights.clone(),
        })
    }

    /// Plays `trials` games with the learner on `candidate`.
    pub fn evaluate(
        &self,
        candidate: &WeightTable,
        batch_seed: u64,
    ) -> Result<BatchResult, TrainerError> {
        let scorer: Arc<dyn Scorer> = Arc::new(candidate.clone());
        let learner_seat = self.config.table.learner_seat;
        let trials = self.config.search.trials;
        let run_trial = |trial: usize| -> Result<TrialOutcome, SessionError> {
            let report = play_game(trial_seed(batch_seed, trial), &self.seats, &scorer)?;
            Ok(TrialOutcome::from_report(&report, learner_seat))
        };

        let outcomes: Vec<TrialOutcome> = if self.config.search.parallel {
            (0..trials)
                .into_par_iter()
                .map(run_trial)
                .collect::<Result<_, _>>()?
        } else {
            (0..trials).map(run_trial).collect::<Result<_, _>>()?
        };

        Ok(outcomes
            .into_iter()
            .fold(BatchResult::default(), BatchResult::record))
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), TrainerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("weights file {path:?}: {source}")]
    Weights {
        path: PathBuf,
        #[source]
        source: WeightError,
    },
    #[error("game execution failed: {0}")]
    Session(#[from] SessionError),
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

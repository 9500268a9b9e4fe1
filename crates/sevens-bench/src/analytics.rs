use std::fs;
use std::path::Path;

use serde::Serialize;
use sevens_bot::BotDifficulty;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build normal distribution: {0}")]
    Distribution(String),
}

/// Win rate with a normal-approximation confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinRate {
    pub wins: usize,
    pub games: usize,
    pub rate: f64,
    pub ci95: (f64, f64),
}

impl WinRate {
    pub fn estimate(wins: usize, games: usize) -> Result<Self, AnalyticsError> {
        if games == 0 {
            return Ok(Self {
                wins,
                games,
                rate: 0.0,
                ci95: (0.0, 0.0),
            });
        }
        let normal =
            Normal::new(0.0, 1.0).map_err(|err| AnalyticsError::Distribution(err.to_string()))?;
        let z = normal.inverse_cdf(1.0 - (1.0 - CONFIDENCE_LEVEL) / 2.0);
        let n = games as f64;
        let rate = wins as f64 / n;
        let margin = z * (rate * (1.0 - rate) / n).sqrt();
        Ok(Self {
            wins,
            games,
            rate,
            ci95: ((rate - margin).max(0.0), (rate + margin).min(1.0)),
        })
    }
}

/// One row of the search log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRow {
    pub run_id: String,
    pub iteration: usize,
    pub wins: usize,
    pub trials: usize,
    /// Learner's remaining hand value summed over lost games.
    pub points: u64,
    pub stalls: usize,
    pub accepted: bool,
    pub best_wins: usize,
}

/// End-of-run overview written as Markdown.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub run_id: String,
    pub seats: Vec<BotDifficulty>,
    pub learner_seat: usize,
    pub iterations_run: usize,
    pub iterations_planned: usize,
    pub accepted: usize,
    pub best: WinRate,
    pub best_points: Option<u64>,
    pub aborted: bool,
}

impl TrainingReport {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let seating = self
            .seats
            .iter()
            .enumerate()
            .map(|(seat, difficulty)| {
                if seat == self.learner_seat {
                    format!("{seat}: {difficulty} (learner)")
                } else {
                    format!("{seat}: {difficulty}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut rows = String::new();
        rows.push_str("# Weight Search Summary\n\n");
        rows.push_str(&format!("Run: `{}`\n\n", self.run_id));
        rows.push_str(&format!("Seating: {seating}\n\n"));
        if self.aborted {
            rows.push_str("Stopped early by request.\n\n");
        }
        rows.push_str("| Iterations | Accepted | Trials | Best wins | Win % | 95% CI | Points on loss |\n");
        rows.push_str("|------------|----------|--------|-----------|-------|--------|----------------|\n");
        rows.push_str(&format!(
            "| {run}/{planned} | {accepted} | {trials} | {wins} | {rate:.1}% | [{low:.1}%, {high:.1}%] | {points} |\n",
            run = self.iterations_run,
            planned = self.iterations_planned,
            accepted = self.accepted,
            trials = self.best.games,
            wins = self.best.wins,
            rate = self.best.rate * 100.0,
            low = self.best.ci95.0 * 100.0,
            high = self.best.ci95.1 * 100.0,
            points = self
                .best_points
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
        ));

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

/// Per-seat totals from a batch of simulated games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatStats {
    pub seat: usize,
    pub difficulty: BotDifficulty,
    pub wins: usize,
    pub total_hand_value: u64,
}

impl SeatStats {
    pub fn new(seat: usize, difficulty: BotDifficulty) -> Self {
        Self {
            seat,
            difficulty,
            wins: 0,
            total_hand_value: 0,
        }
    }

    pub fn average_hand_value(&self, games: usize) -> f64 {
        if games == 0 {
            0.0
        } else {
            self.total_hand_value as f64 / games as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn win_rate_interval_brackets_the_rate() {
        let estimate = WinRate::estimate(50, 200).unwrap();
        assert!((estimate.rate - 0.25).abs() < 1e-12);
        let half_width = 1.959_964 * (0.25f64 * 0.75 / 200.0).sqrt();
        assert!((estimate.ci95.0 - (0.25 - half_width)).abs() < 1e-4);
        assert!((estimate.ci95.1 - (0.25 + half_width)).abs() < 1e-4);
    }

    #[test]
    fn win_rate_interval_is_clamped() {
        let all = WinRate::estimate(10, 10).unwrap();
        assert_eq!(all.ci95, (1.0, 1.0));
        let none = WinRate::estimate(0, 0).unwrap();
        assert_eq!(none.rate, 0.0);
    }

    #[test]
    fn markdown_lists_seating_and_best_result() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.md");
        let report = TrainingReport {
            run_id: "md".to_string(),
            seats: vec![
                BotDifficulty::Random,
                BotDifficulty::Random,
                BotDifficulty::Random,
                BotDifficulty::Weighted,
            ],
            learner_seat: 3,
            iterations_run: 4,
            iterations_planned: 5,
            accepted: 2,
            best: WinRate::estimate(30, 100).unwrap(),
            best_points: Some(812),
            aborted: true,
        };
        report.write_markdown(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("3: weighted (learner)"));
        assert!(text.contains("| 4/5 | 2 | 100 | 30 | 30.0% |"));
        assert!(text.contains("Stopped early"));
        assert!(text.contains("| 812 |"));
    }

    #[test]
    fn average_hand_value_handles_zero_games() {
        let mut stats = SeatStats::new(0, BotDifficulty::Distance);
        assert_eq!(stats.average_hand_value(0), 0.0);
        stats.total_hand_value = 90;
        assert_eq!(stats.average_hand_value(3), 30.0);
    }
}

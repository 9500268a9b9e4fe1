//! Learned scoring weights for the weighted tier.
//!
//! `hold` is indexed by rank, `play` by (blocker rank, blocked rank) pairs that can
//! occur on one side of a seven. Tables are exchanged as JSON so a search can hand
//! its result to a later game.

use crate::policy::{Candidate, Scorer};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sevens_core::model::rank::Rank;
use std::fmt;
use std::fs;
use std::path::Path;

pub const HOLD_WEIGHTS: usize = 13;
pub const PLAY_PAIRS: usize = 42;
const LOW_SIDE_PAIRS: usize = 21;

/// Position of a (blocker, blocked) rank pair in the `play` table.
///
/// Low side first: blockers 2..=7 with any lower rank, then high side: blockers
/// 7..=12 with any higher rank. Pairs that cannot occur return `None`.
pub fn pair_index(parent: Rank, child: Rank) -> Option<usize> {
    let p = parent.value() as usize;
    let c = child.value() as usize;
    if c < p && p <= 7 {
        Some((p - 2) * (p - 1) / 2 + (c - 1))
    } else if c > p && p >= 7 {
        Some(LOW_SIDE_PAIRS + (p - 7) * (20 - p) / 2 + (c - p - 1))
    } else {
        None
    }
}

#[derive(Debug)]
pub enum WeightError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Shape { expected: usize, found: usize },
    NonFinite { field: &'static str, index: usize },
}

impl fmt::Display for WeightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightError::Io(err) => write!(f, "failed to access weight file: {err}"),
            WeightError::Json(err) => write!(f, "failed to parse weight JSON: {err}"),
            WeightError::Shape { expected, found } => {
                write!(f, "play weights wrong size: expected {expected}, got {found}")
            }
            WeightError::NonFinite { field, index } => {
                write!(f, "{field}[{index}] is not a finite number")
            }
        }
    }
}

impl std::error::Error for WeightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WeightError::Io(err) => Some(err),
            WeightError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WeightError {
    fn from(err: std::io::Error) -> Self {
        WeightError::Io(err)
    }
}

impl From<serde_json::Error> for WeightError {
    fn from(err: serde_json::Error) -> Self {
        WeightError::Json(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    pub hold: [f64; HOLD_WEIGHTS],
    pub play: Vec<f64>,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::zeros()
    }
}

impl WeightTable {
    pub fn zeros() -> Self {
        Self {
            hold: [0.0; HOLD_WEIGHTS],
            play: vec![0.0; PLAY_PAIRS],
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WeightError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, WeightError> {
        let table: WeightTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), WeightError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), WeightError> {
        if self.play.len() != PLAY_PAIRS {
            return Err(WeightError::Shape {
                expected: PLAY_PAIRS,
                found: self.play.len(),
            });
        }
        if let Some(index) = self.hold.iter().position(|w| !w.is_finite()) {
            return Err(WeightError::NonFinite {
                field: "hold",
                index,
            });
        }
        if let Some(index) = self.play.iter().position(|w| !w.is_finite()) {
            return Err(WeightError::NonFinite {
                field: "play",
                index,
            });
        }
        Ok(())
    }

    pub fn hold_weight(&self, rank: Rank) -> f64 {
        self.hold[rank.value() as usize - 1]
    }

    pub fn play_weight(&self, parent: Rank, child: Rank) -> f64 {
        pair_index(parent, child)
            .and_then(|index| self.play.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    /// `self + step * delta`, element-wise.
    pub fn perturbed(&self, delta: &WeightDelta, step: f64) -> Self {
        let mut next = self.clone();
        for (weight, d) in next.hold.iter_mut().zip(delta.hold.iter()) {
            *weight += d * step;
        }
        for (weight, d) in next.play.iter_mut().zip(delta.play.iter()) {
            *weight += d * step;
        }
        next
    }
}

impl Scorer for WeightTable {
    fn score_hold(&self, candidate: &Candidate) -> f64 {
        self.hold_weight(candidate.card.rank)
    }

    fn score_play(&self, candidate: &Candidate) -> f64 {
        candidate
            .blocks
            .map(|blocked| self.play_weight(candidate.card.rank, blocked.rank))
            .unwrap_or(0.0)
    }
}

/// One random nudge for every weight, each drawn uniformly from `[0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightDelta {
    pub hold: [f64; HOLD_WEIGHTS],
    pub play: Vec<f64>,
}

impl WeightDelta {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut hold = [0.0; HOLD_WEIGHTS];
        for weight in hold.iter_mut() {
            *weight = rng.gen_range(0.0..1.0);
        }
        let play = (0..PLAY_PAIRS).map(|_| rng.gen_range(0.0..1.0)).collect();
        Self { hold, play }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sevens_core::model::card::Card;
    use std::collections::HashSet;

    #[test]
    fn pair_indices_cover_the_table_exactly_once() {
        let mut seen = HashSet::new();
        for parent in Rank::ORDERED {
            for child in Rank::ORDERED {
                if let Some(index) = pair_index(parent, child) {
                    assert!(index < PLAY_PAIRS, "{parent}->{child} out of range");
                    assert!(seen.insert(index), "{parent}->{child} collides");
                }
            }
        }
        assert_eq!(seen.len(), PLAY_PAIRS);
    }

    #[test]
    fn pair_index_follows_side_ordering() {
        assert_eq!(pair_index(Rank::Two, Rank::Ace), Some(0));
        assert_eq!(pair_index(Rank::Seven, Rank::Six), Some(20));
        assert_eq!(pair_index(Rank::Seven, Rank::Eight), Some(21));
        assert_eq!(pair_index(Rank::Eight, Rank::Nine), Some(27));
        assert_eq!(pair_index(Rank::Queen, Rank::King), Some(41));
        assert_eq!(pair_index(Rank::Nine, Rank::Five), None);
        assert_eq!(pair_index(Rank::Seven, Rank::Seven), None);
    }

    #[test]
    fn scorer_reads_hold_and_pair_weights() {
        let mut table = WeightTable::zeros();
        table.hold[Rank::King.value() as usize - 1] = 2.5;
        let index = pair_index(Rank::Seven, Rank::Ten).unwrap();
        table.play[index] = 4.0;

        let king: Card = "KD".parse().unwrap();
        let hold = Candidate { card: king, blocks: None };
        assert_eq!(table.score_hold(&hold), 2.5);

        let seven: Card = "7D".parse().unwrap();
        let ten: Card = "10D".parse().unwrap();
        let blocker = Candidate { card: seven, blocks: Some(ten) };
        assert_eq!(table.score_play(&blocker), 4.0);
        let bare = Candidate { card: seven, blocks: None };
        assert_eq!(table.score_play(&bare), 0.0);
    }

    #[test]
    fn json_round_trip_and_validation() {
        let mut rng = StdRng::seed_from_u64(20240601);
        let mut table = WeightTable::zeros();
        for _ in 0..5 {
            table = table.perturbed(&WeightDelta::sample(&mut rng), 1.0);
        }
        let json = serde_json::to_string_pretty(&table).unwrap();
        let reloaded = WeightTable::from_json(&json).unwrap();
        for (index, (saved, loaded)) in table.hold.iter().zip(&reloaded.hold).enumerate() {
            assert_eq!(saved.to_bits(), loaded.to_bits(), "hold[{index}] drifted");
        }
        for (index, (saved, loaded)) in table.play.iter().zip(&reloaded.play).enumerate() {
            assert_eq!(saved.to_bits(), loaded.to_bits(), "play[{index}] drifted");
        }
        assert_eq!(reloaded, table);

        let short = r#"{"hold":[0,0,0,0,0,0,0,0,0,0,0,0,0],"play":[1.0]}"#;
        assert!(matches!(
            WeightTable::from_json(short),
            Err(WeightError::Shape { expected: PLAY_PAIRS, found: 1 })
        ));
        assert!(matches!(
            WeightTable::from_json("not json"),
            Err(WeightError::Json(_))
        ));
    }

    #[test]
    fn perturbation_is_scaled_and_reproducible() {
        let mut rng_a = StdRng::seed_from_u64(9);
        let mut rng_b = StdRng::seed_from_u64(9);
        let delta = WeightDelta::sample(&mut rng_a);
        assert_eq!(delta, WeightDelta::sample(&mut rng_b));
        assert!(delta.hold.iter().chain(&delta.play).all(|d| (0.0..1.0).contains(d)));

        let base = WeightTable::zeros();
        let next = base.perturbed(&delta, 2.0);
        assert_eq!(next.hold[4], delta.hold[4] * 2.0);
        assert_eq!(next.play[40], delta.play[40] * 2.0);
        assert!(next.validate().is_ok());
    }
}

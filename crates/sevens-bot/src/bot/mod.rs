mod blockers;
mod play;
mod weights;

pub use blockers::BlockerSplit;
pub use play::{Decision, PlayPlanner};
pub use weights::{PLAY_PAIRS, WeightDelta, WeightError, WeightTable, pair_index};

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Selection tiers, from a blind pick up to the learned-weight heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BotDifficulty {
    /// Any primary-clear card.
    Random,
    /// The primary-clear card farthest from its seven.
    Distance,
    /// Prefer cards that open the way to this hand's unclear cards.
    Blocking,
    /// Blocking split ranked by externally supplied scores.
    Weighted,
}

impl Default for BotDifficulty {
    fn default() -> Self {
        Self::Blocking
    }
}

impl BotDifficulty {
    pub const ALL: [BotDifficulty; 4] = [
        BotDifficulty::Random,
        BotDifficulty::Distance,
        BotDifficulty::Blocking,
        BotDifficulty::Weighted,
    ];

    pub const fn level(self) -> u8 {
        match self {
            BotDifficulty::Random => 0,
            BotDifficulty::Distance => 1,
            BotDifficulty::Blocking => 2,
            BotDifficulty::Weighted => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BotDifficulty::Random => "random",
            BotDifficulty::Distance => "distance",
            BotDifficulty::Blocking => "blocking",
            BotDifficulty::Weighted => "weighted",
        }
    }

    pub fn from_env() -> Self {
        static CACHED: OnceLock<BotDifficulty> = OnceLock::new();
        *CACHED.get_or_init(|| {
            std::env::var("SEVENS_BOT_DIFFICULTY")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default()
        })
    }
}

impl fmt::Display for BotDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDifficulty(pub String);

impl fmt::Display for UnknownDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown difficulty '{}'", self.0)
    }
}

impl std::error::Error for UnknownDifficulty {}

impl TryFrom<String> for BotDifficulty {
    type Error = UnknownDifficulty;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BotDifficulty> for String {
    fn from(difficulty: BotDifficulty) -> Self {
        difficulty.as_str().to_string()
    }
}

impl FromStr for BotDifficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "random" | "easy" => Ok(BotDifficulty::Random),
            "1" | "distance" => Ok(BotDifficulty::Distance),
            "2" | "blocking" | "normal" => Ok(BotDifficulty::Blocking),
            "3" | "weighted" | "hard" => Ok(BotDifficulty::Weighted),
            other => Err(UnknownDifficulty(other.to_string())),
        }
    }
}

pub mod bot;
pub mod policy;
pub mod session;

pub use bot::{BlockerSplit, BotDifficulty, Decision, PlayPlanner, UnknownDifficulty, WeightTable};
pub use policy::{Candidate, DistanceScorer, HeuristicPolicy, Policy, PolicyContext, Scorer};
pub use session::{GameReport, GameSession, SessionError, SessionState, TurnOutcome};

pub mod day;
mod engine;
mod level;

pub use engine::{
    AppOpenOutcome, ConsistencyEngine, ConsistencyState, ScoreChange, ScoreReason, ScoringRules,
    MAX_SCORE, MIN_SCORE,
};
pub use level::{ConsistencyLevel, ScoreTier};

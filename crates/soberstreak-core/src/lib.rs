//! # Soberstreak Core Library
//!
//! This library provides the rules engine behind a habit-recovery tracker:
//! the sobriety streak, milestone achievements and a gamified consistency
//! score. A standalone CLI binary drives every operation, and any GUI is
//! expected to be a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Streak**: a single persisted relapse timestamp ([`StreakAnchor`]) from
//!   which calendar-aware elapsed time is computed on every read
//! - **Achievements**: a fixed catalog of day thresholds; unlock state is a
//!   pure function of days since the anchor
//! - **Consistency**: a bounded [0, 100] score moved by daily app opens and
//!   relapses, with rewards and penalties rolled through an injected
//!   [`ScoreRng`]
//! - **Storage**: SQLite key-value state, relapse history and journal, plus
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Tracker`]: loads state, applies operations in order, saves, and
//!   returns the resulting [`Event`]s
//! - [`Database`]: state and history persistence
//! - [`Config`]: application configuration management

pub mod achievements;
pub mod calendar;
pub mod consistency;
pub mod error;
pub mod events;
pub mod journal;
pub mod rng;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use achievements::{Achievement, AchievementEngine, AchievementProgress, AchievementStatus};
pub use calendar::Calendar;
pub use consistency::{
    AppOpenOutcome, ConsistencyEngine, ConsistencyLevel, ConsistencyState, ScoreChange,
    ScoreReason, ScoreTier, ScoringRules,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use journal::{JournalEntry, Mood};
pub use rng::{PcgScoreRng, ScoreRng, ScriptedRng};
pub use storage::{Config, Database, MemoryStore, RelapseRecord, StateStore};
pub use streak::{StreakAnchor, TimeComponents};
pub use tracker::{ScoreSnapshot, StatusSnapshot, Tracker};

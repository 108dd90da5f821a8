//! Consistency score state machine.
//!
//! The score lives in [0, 100] and moves on two external events, an app
//! open and a reported relapse, plus a catch-up check when state is loaded.
//! Days are compared as calendar dates, never as instants.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::day::days_between;
use super::level::ConsistencyLevel;
use crate::rng::ScoreRng;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

/// Reward and penalty ranges for score transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    #[serde(default = "default_initial_score")]
    pub initial_score: i32,
    #[serde(default = "default_app_open_reward_min")]
    pub app_open_reward_min: i32,
    #[serde(default = "default_app_open_reward_max")]
    pub app_open_reward_max: i32,
    #[serde(default = "default_missed_day_penalty_min")]
    pub missed_day_penalty_min: i32,
    #[serde(default = "default_missed_day_penalty_max")]
    pub missed_day_penalty_max: i32,
    #[serde(default = "default_relapse_penalty_min")]
    pub relapse_penalty_min: i32,
    #[serde(default = "default_relapse_penalty_max")]
    pub relapse_penalty_max: i32,
}

fn default_initial_score() -> i32 {
    50
}
fn default_app_open_reward_min() -> i32 {
    5
}
fn default_app_open_reward_max() -> i32 {
    11
}
fn default_missed_day_penalty_min() -> i32 {
    4
}
fn default_missed_day_penalty_max() -> i32 {
    8
}
fn default_relapse_penalty_min() -> i32 {
    20
}
fn default_relapse_penalty_max() -> i32 {
    44
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            initial_score: default_initial_score(),
            app_open_reward_min: default_app_open_reward_min(),
            app_open_reward_max: default_app_open_reward_max(),
            missed_day_penalty_min: default_missed_day_penalty_min(),
            missed_day_penalty_max: default_missed_day_penalty_max(),
            relapse_penalty_min: default_relapse_penalty_min(),
            relapse_penalty_max: default_relapse_penalty_max(),
        }
    }
}

impl ScoringRules {
    pub fn app_open_reward(&self) -> RangeInclusive<i32> {
        self.app_open_reward_min..=self.app_open_reward_max
    }

    pub fn missed_day_penalty(&self) -> RangeInclusive<i32> {
        self.missed_day_penalty_min..=self.missed_day_penalty_max
    }

    pub fn relapse_penalty(&self) -> RangeInclusive<i32> {
        self.relapse_penalty_min..=self.relapse_penalty_max
    }

    /// Check that every range is ordered and non-negative and the initial
    /// score is a valid score.
    pub fn validate(&self) -> Result<(), String> {
        let ranges = [
            ("app_open_reward", self.app_open_reward_min, self.app_open_reward_max),
            ("missed_day_penalty", self.missed_day_penalty_min, self.missed_day_penalty_max),
            ("relapse_penalty", self.relapse_penalty_min, self.relapse_penalty_max),
        ];
        for (name, min, max) in ranges {
            if min < 0 || min > max {
                return Err(format!("{name} range {min}..={max} is invalid"));
            }
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.initial_score) {
            return Err(format!(
                "initial_score {} is outside {MIN_SCORE}..={MAX_SCORE}",
                self.initial_score
            ));
        }
        Ok(())
    }
}

/// Persisted consistency fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyState {
    pub score: i32,
    /// `None` until the first app open.
    pub last_app_open_date: Option<NaiveDate>,
    pub last_score_update_date: Option<NaiveDate>,
    pub consecutive_days_count: u32,
    /// Day the load-time catch-up last ran.
    #[serde(default)]
    pub last_catch_up_date: Option<NaiveDate>,
}

impl ConsistencyState {
    pub fn new(initial_score: i32) -> Self {
        Self {
            score: initial_score.clamp(MIN_SCORE, MAX_SCORE),
            last_app_open_date: None,
            last_score_update_date: None,
            consecutive_days_count: 0,
            last_catch_up_date: None,
        }
    }
}

impl Default for ConsistencyState {
    fn default() -> Self {
        Self::new(default_initial_score())
    }
}

/// Why the score moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreReason {
    ConsecutiveDay,
    MissedDays { days: i64 },
    CatchUp { days: i64 },
    Relapse,
}

/// A single score transition. `requested` is the signed delta before
/// clamping; `after - before` is what was actually applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub before: i32,
    pub after: i32,
    pub requested: i64,
    pub reason: ScoreReason,
}

impl ScoreChange {
    pub fn applied(&self) -> i32 {
        self.after - self.before
    }
}

/// Result of an app open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AppOpenOutcome {
    /// Already opened today.
    SameDay,
    /// First open ever; dates recorded, score untouched.
    FirstOpen,
    /// Exactly one calendar day after the previous open.
    Consecutive { change: ScoreChange, consecutive_days: u32 },
    /// Any other gap; the consecutive count resets.
    Gap { change: ScoreChange, gap_days: i64 },
}

impl AppOpenOutcome {
    pub fn score_change(&self) -> Option<&ScoreChange> {
        match self {
            Self::Consecutive { change, .. } | Self::Gap { change, .. } => Some(change),
            Self::SameDay | Self::FirstOpen => None,
        }
    }
}

/// Applies score transitions to a [`ConsistencyState`].
#[derive(Debug, Clone)]
pub struct ConsistencyEngine {
    state: ConsistencyState,
    rules: ScoringRules,
}

impl ConsistencyEngine {
    pub fn new(rules: ScoringRules) -> Self {
        Self {
            state: ConsistencyState::new(rules.initial_score),
            rules,
        }
    }

    /// Resume from persisted state. An out-of-range score is clamped.
    pub fn with_state(mut state: ConsistencyState, rules: ScoringRules) -> Self {
        state.score = state.score.clamp(MIN_SCORE, MAX_SCORE);
        Self { state, rules }
    }

    pub fn state(&self) -> &ConsistencyState {
        &self.state
    }

    pub fn into_state(self) -> ConsistencyState {
        self.state
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn score(&self) -> i32 {
        self.state.score
    }

    pub fn level(&self) -> ConsistencyLevel {
        ConsistencyLevel::from_score(self.state.score)
    }

    /// Penalize days skipped since the last score update.
    ///
    /// Runs when state is loaded, at most once per calendar day. It does not
    /// advance `last_score_update_date`; the next app open does that. Days
    /// already penalized by an earlier catch-up are not counted again.
    pub fn apply_daily_catch_up(
        &mut self,
        today: NaiveDate,
        rng: &mut dyn ScoreRng,
    ) -> Option<ScoreChange> {
        let last = self.state.last_score_update_date?;
        if last == today {
            return None;
        }
        if matches!(self.state.last_catch_up_date, Some(ran) if ran >= today) {
            return None;
        }
        let since = match self.state.last_catch_up_date {
            Some(ran) if ran > last => ran,
            _ => last,
        };
        self.state.last_catch_up_date = Some(today);

        let days_missed = days_between(since, today) - 1;
        if days_missed <= 0 {
            return None;
        }
        let per_day = rng.roll(self.rules.missed_day_penalty());
        let change = self.adjust(
            -days_missed.saturating_mul(i64::from(per_day)),
            ScoreReason::CatchUp { days: days_missed },
        );
        tracing::debug!(
            days_missed,
            before = change.before,
            after = change.after,
            "applied catch-up penalty"
        );
        Some(change)
    }

    /// Record that the app was opened on `today`.
    ///
    /// Only the first open of a calendar day changes anything.
    pub fn record_app_open(&mut self, today: NaiveDate, rng: &mut dyn ScoreRng) -> AppOpenOutcome {
        if self.state.last_app_open_date == Some(today) {
            return AppOpenOutcome::SameDay;
        }

        let outcome = match self.state.last_app_open_date {
            None => AppOpenOutcome::FirstOpen,
            Some(last) => {
                let gap = days_between(last, today);
                if gap == 1 {
                    self.state.consecutive_days_count =
                        self.state.consecutive_days_count.saturating_add(1);
                    let reward = rng.roll(self.rules.app_open_reward());
                    let change = self.adjust(i64::from(reward), ScoreReason::ConsecutiveDay);
                    AppOpenOutcome::Consecutive {
                        change,
                        consecutive_days: self.state.consecutive_days_count,
                    }
                } else {
                    self.state.consecutive_days_count = 0;
                    // A clock moved backwards counts as zero missed days.
                    let days_missed = (gap - 1).max(0);
                    let per_day = rng.roll(self.rules.missed_day_penalty());
                    let change = self.adjust(
                        -days_missed.saturating_mul(i64::from(per_day)),
                        ScoreReason::MissedDays { days: days_missed },
                    );
                    AppOpenOutcome::Gap {
                        change,
                        gap_days: gap,
                    }
                }
            }
        };

        self.state.last_app_open_date = Some(today);
        self.state.last_score_update_date = Some(today);
        outcome
    }

    /// Apply the flat relapse penalty and break the consecutive run.
    /// `last_app_open_date` is left alone.
    pub fn record_relapse(&mut self, today: NaiveDate, rng: &mut dyn ScoreRng) -> ScoreChange {
        let penalty = rng.roll(self.rules.relapse_penalty());
        let change = self.adjust(-i64::from(penalty), ScoreReason::Relapse);
        self.state.consecutive_days_count = 0;
        self.state.last_score_update_date = Some(today);
        change
    }

    fn adjust(&mut self, delta: i64, reason: ScoreReason) -> ScoreChange {
        let before = self.state.score;
        let after = (i64::from(before) + delta).clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE));
        self.state.score = after as i32;
        ScoreChange {
            before,
            after: self.state.score,
            requested: delta,
            reason,
        }
    }
}

impl Default for ConsistencyEngine {
    fn default() -> Self {
        Self::new(ScoringRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::day::parse_day;
    use crate::rng::ScriptedRng;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    fn opened_on(date: &str, score: i32, consecutive: u32) -> ConsistencyEngine {
        ConsistencyEngine::with_state(
            ConsistencyState {
                score,
                last_app_open_date: Some(day(date)),
                last_score_update_date: Some(day(date)),
                consecutive_days_count: consecutive,
                last_catch_up_date: None,
            },
            ScoringRules::default(),
        )
    }

    #[test]
    fn first_open_records_dates_only() {
        let mut engine = ConsistencyEngine::default();
        let mut rng = ScriptedRng::new([]);
        let outcome = engine.record_app_open(day("2024-03-01"), &mut rng);
        assert_eq!(outcome, AppOpenOutcome::FirstOpen);
        assert_eq!(engine.score(), 50);
        assert_eq!(engine.state().last_app_open_date, Some(day("2024-03-01")));
        assert_eq!(engine.state().last_score_update_date, Some(day("2024-03-01")));
        assert!(rng.requested().is_empty());
    }

    #[test]
    fn consecutive_day_rewards() {
        let mut engine = opened_on("2024-03-01", 50, 3);
        let mut rng = ScriptedRng::new([7]);
        let outcome = engine.record_app_open(day("2024-03-02"), &mut rng);
        match outcome {
            AppOpenOutcome::Consecutive { change, consecutive_days } => {
                assert_eq!(consecutive_days, 4);
                assert_eq!(change.applied(), 7);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(engine.score(), 57);
        assert_eq!(rng.requested(), &[5..=11]);
    }

    #[test]
    fn same_day_open_is_idempotent() {
        let mut engine = opened_on("2024-03-01", 50, 0);
        let mut rng = ScriptedRng::new([9, 9]);
        engine.record_app_open(day("2024-03-02"), &mut rng);
        let score = engine.score();
        let outcome = engine.record_app_open(day("2024-03-02"), &mut rng);
        assert_eq!(outcome, AppOpenOutcome::SameDay);
        assert_eq!(engine.score(), score);
        assert_eq!(rng.requested().len(), 1);
    }

    #[test]
    fn gap_penalizes_missed_days_and_resets_run() {
        let mut engine = opened_on("2024-03-01", 50, 6);
        let mut rng = ScriptedRng::new([5]);
        let outcome = engine.record_app_open(day("2024-03-04"), &mut rng);
        assert_eq!(
            outcome.score_change().map(|c| c.reason),
            Some(ScoreReason::MissedDays { days: 2 })
        );
        assert_eq!(engine.score(), 40);
        assert_eq!(engine.state().consecutive_days_count, 0);
        assert_eq!(rng.requested(), &[4..=8]);
    }

    #[test]
    fn backwards_clock_resets_run_without_penalty() {
        let mut engine = opened_on("2024-03-05", 50, 2);
        let mut rng = ScriptedRng::new([8]);
        engine.record_app_open(day("2024-03-03"), &mut rng);
        assert_eq!(engine.score(), 50);
        assert_eq!(engine.state().consecutive_days_count, 0);
        assert_eq!(engine.state().last_app_open_date, Some(day("2024-03-03")));
    }

    #[test]
    fn relapse_penalty_and_reset() {
        let mut engine = opened_on("2024-03-01", 80, 12);
        let mut rng = ScriptedRng::new([30]);
        let change = engine.record_relapse(day("2024-03-02"), &mut rng);
        assert_eq!(change.applied(), -30);
        assert_eq!(engine.score(), 50);
        assert_eq!(engine.state().consecutive_days_count, 0);
        assert_eq!(engine.state().last_score_update_date, Some(day("2024-03-02")));
        assert_eq!(engine.state().last_app_open_date, Some(day("2024-03-01")));
        assert_eq!(rng.requested(), &[20..=44]);
    }

    #[test]
    fn catch_up_penalizes_days_between_updates() {
        let mut engine = opened_on("2024-03-01", 50, 0);
        let mut rng = ScriptedRng::new([6]);
        let change = engine
            .apply_daily_catch_up(day("2024-03-05"), &mut rng)
            .unwrap();
        assert_eq!(change.reason, ScoreReason::CatchUp { days: 3 });
        assert_eq!(engine.score(), 32);
        assert_eq!(engine.state().last_score_update_date, Some(day("2024-03-01")));
    }

    #[test]
    fn catch_up_runs_once_per_day() {
        let mut engine = opened_on("2024-03-01", 50, 0);
        let mut rng = ScriptedRng::new([6, 6, 6]);
        assert!(engine.apply_daily_catch_up(day("2024-03-05"), &mut rng).is_some());
        assert!(engine.apply_daily_catch_up(day("2024-03-05"), &mut rng).is_none());
        assert!(engine.apply_daily_catch_up(day("2024-03-05"), &mut rng).is_none());
        assert_eq!(engine.score(), 32);
        assert_eq!(engine.state().last_catch_up_date, Some(day("2024-03-05")));
        assert_eq!(rng.requested().len(), 1);
    }

    #[test]
    fn catch_up_on_later_day_counts_only_new_misses() {
        let mut engine = opened_on("2024-03-01", 50, 0);
        let mut rng = ScriptedRng::new([6, 6]);
        engine.apply_daily_catch_up(day("2024-03-05"), &mut rng);
        // Mar 2-4 were already counted; only Mar 6 is new.
        let change = engine
            .apply_daily_catch_up(day("2024-03-07"), &mut rng)
            .unwrap();
        assert_eq!(change.reason, ScoreReason::CatchUp { days: 1 });
        assert_eq!(engine.score(), 26);
    }

    #[test]
    fn catch_up_ignores_backwards_clock() {
        let mut engine = opened_on("2024-03-01", 50, 0);
        let mut rng = ScriptedRng::new([6]);
        engine.apply_daily_catch_up(day("2024-03-05"), &mut rng);
        assert!(engine.apply_daily_catch_up(day("2024-03-04"), &mut rng).is_none());
        assert_eq!(engine.state().last_catch_up_date, Some(day("2024-03-05")));
    }

    #[test]
    fn catch_up_skips_adjacent_and_unset_days() {
        let mut rng = ScriptedRng::new([8]);
        let mut engine = opened_on("2024-03-01", 50, 0);
        assert!(engine.apply_daily_catch_up(day("2024-03-01"), &mut rng).is_none());
        assert!(engine.apply_daily_catch_up(day("2024-03-02"), &mut rng).is_none());

        let mut fresh = ConsistencyEngine::default();
        assert!(fresh.apply_daily_catch_up(day("2024-03-09"), &mut rng).is_none());
        assert!(rng.requested().is_empty());
    }

    #[test]
    fn score_clamps_at_bounds() {
        let mut engine = opened_on("2024-03-01", 5, 0);
        let mut rng = ScriptedRng::new([44]);
        let change = engine.record_relapse(day("2024-03-01"), &mut rng);
        assert_eq!(engine.score(), 0);
        assert_eq!(change.requested, -44);
        assert_eq!(change.applied(), -5);

        let mut engine = opened_on("2024-03-01", 98, 0);
        let mut rng = ScriptedRng::new([11]);
        engine.record_app_open(day("2024-03-02"), &mut rng);
        assert_eq!(engine.score(), 100);
    }

    #[test]
    fn long_absence_saturates_instead_of_overflowing() {
        let mut engine = opened_on("1970-01-01", 100, 0);
        let mut rng = ScriptedRng::new([8]);
        engine.record_app_open(day("9999-12-31"), &mut rng);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn with_state_clamps_score() {
        let engine = ConsistencyEngine::with_state(
            ConsistencyState { score: 140, ..Default::default() },
            ScoringRules::default(),
        );
        assert_eq!(engine.score(), 100);
    }

    #[test]
    fn rules_validation() {
        assert!(ScoringRules::default().validate().is_ok());
        let bad = ScoringRules { relapse_penalty_min: 50, ..Default::default() };
        assert!(bad.validate().is_err());
        let bad = ScoringRules { initial_score: 101, ..Default::default() };
        assert!(bad.validate().is_err());
    }
}

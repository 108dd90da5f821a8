use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::consistency::{AppOpenOutcome, ConsistencyLevel, ScoreChange};

/// Every state change the tracker makes produces an Event.
///
/// Operations return their events in the order the changes were applied,
/// so a caller replaying them sees the same sequence the tracker did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// First interaction on a calendar day, or a repeat on the same day.
    AppOpened {
        day: NaiveDate,
        outcome: AppOpenOutcome,
        at: DateTime<Utc>,
    },
    ScoreChanged {
        change: ScoreChange,
        level: ConsistencyLevel,
        at: DateTime<Utc>,
    },
    /// The anchor moved to `at`, ending a streak of `streak_seconds`.
    StreakReset {
        previous_anchor: DateTime<Utc>,
        streak_seconds: i64,
        at: DateTime<Utc>,
    },
    /// A milestone was crossed between two observations of the streak.
    AchievementUnlocked {
        unlock_number: u32,
        title: String,
        days_required: u32,
        at: DateTime<Utc>,
    },
    AchievementsReset {
        reset_count: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::AppOpened { at, .. }
            | Event::ScoreChanged { at, .. }
            | Event::StreakReset { at, .. }
            | Event::AchievementUnlocked { at, .. }
            | Event::AchievementsReset { at, .. } => *at,
        }
    }

    pub(crate) fn score_changed(change: ScoreChange, at: DateTime<Utc>) -> Self {
        Event::ScoreChanged {
            change,
            level: ConsistencyLevel::from_score(change.after),
            at,
        }
    }
}

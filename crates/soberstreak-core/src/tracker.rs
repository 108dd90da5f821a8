//! The tracker service: owns the streak anchor, consistency state and
//! achievement counter, and persists them through a [`StateStore`].
//!
//! Each operation takes the current instant explicitly, applies its rules
//! in a fixed order, saves, and returns the events it produced.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::achievements::{AchievementEngine, AchievementProgress};
use crate::calendar::Calendar;
use crate::consistency::{
    AppOpenOutcome, ConsistencyEngine, ConsistencyLevel, ScoreTier, ScoringRules,
};
use crate::error::Result;
use crate::events::Event;
use crate::rng::ScoreRng;
use crate::storage::{Database, PersistedState, StateStore};
use crate::streak::{StreakAnchor, TimeComponents};

/// Point-in-time view of everything derived from the stored state.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub now: DateTime<Utc>,
    pub last_relapse: DateTime<Utc>,
    pub streak_seconds: i64,
    pub days_since: u32,
    pub elapsed: TimeComponents,
    pub elapsed_display: String,
    pub achievements: AchievementProgress,
    pub score: ScoreSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSnapshot {
    pub score: i32,
    pub level: ConsistencyLevel,
    pub label: &'static str,
    pub tier: ScoreTier,
    pub color: &'static str,
    pub consecutive_days: u32,
    pub last_app_open_date: Option<chrono::NaiveDate>,
    pub last_score_update_date: Option<chrono::NaiveDate>,
}

pub struct Tracker<S: StateStore> {
    store: S,
    rng: Box<dyn ScoreRng>,
    calendar: Calendar,
    anchor: StreakAnchor,
    consistency: ConsistencyEngine,
    achievements: AchievementEngine,
}

impl<S: StateStore> Tracker<S> {
    /// Load state from `store` and run the daily catch-up check.
    ///
    /// On a first run the anchor is set to `now` and written immediately.
    /// Missing values fall back to defaults; unreadable ones are replaced by
    /// their defaults and the repaired state is written back. The catch-up
    /// penalty applies at most once per calendar day, so repeated loads on
    /// the same day leave the score alone.
    ///
    /// # Errors
    /// Returns an error only if the store cannot be read or written.
    pub fn load(
        store: S,
        rules: ScoringRules,
        rng: Box<dyn ScoreRng>,
        calendar: Calendar,
        now: DateTime<Utc>,
    ) -> Result<(Self, Vec<Event>)> {
        let loaded = PersistedState::load(&store, now, rules.initial_score)?;
        let state = loaded.state;
        let mut tracker = Self {
            store,
            rng,
            calendar,
            anchor: state.anchor,
            consistency: ConsistencyEngine::with_state(state.consistency.clone(), rules),
            achievements: AchievementEngine::with_reset_count(state.achievements_reset_count),
        };

        let mut events = Vec::new();
        let today = calendar.today(now);
        if let Some(change) = tracker
            .consistency
            .apply_daily_catch_up(today, tracker.rng.as_mut())
        {
            events.push(Event::score_changed(change, now));
        }

        if loaded.first_run {
            tracing::info!(anchor = %now, "starting first streak");
        }
        if loaded.recovered {
            tracing::info!("rewriting repaired state");
        }
        if loaded.first_run || loaded.recovered || *tracker.consistency.state() != state.consistency
        {
            tracker.save()?;
        }
        Ok((tracker, events))
    }

    pub fn anchor(&self) -> &StreakAnchor {
        &self.anchor
    }

    pub fn consistency(&self) -> &ConsistencyEngine {
        &self.consistency
    }

    pub fn achievements(&self) -> &AchievementEngine {
        &self.achievements
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Whole days of the current streak.
    pub fn days_since(&self, now: DateTime<Utc>) -> u32 {
        self.anchor.days_since(now)
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeComponents {
        self.calendar.elapsed(&self.anchor, now)
    }

    /// Record an app foreground. Only the first call per calendar day moves
    /// the score.
    pub fn record_app_open(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let today = self.calendar.today(now);
        let outcome = self.consistency.record_app_open(today, self.rng.as_mut());

        let mut events = vec![Event::AppOpened {
            day: today,
            outcome,
            at: now,
        }];
        if let Some(change) = outcome.score_change() {
            tracing::info!(
                before = change.before,
                after = change.after,
                consecutive = self.consistency.state().consecutive_days_count,
                "app open moved score"
            );
            events.push(Event::score_changed(*change, now));
        }
        if outcome != AppOpenOutcome::SameDay {
            self.save()?;
        }
        Ok(events)
    }

    /// Record a reported relapse: apply the score penalty, then move the
    /// anchor to `now`.
    pub fn record_relapse(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let today = self.calendar.today(now);
        let change = self.consistency.record_relapse(today, self.rng.as_mut());

        let previous_anchor = self.anchor.last_relapse();
        let streak_seconds = self.anchor.streak_seconds(now);
        self.anchor.reset(now);

        tracing::info!(
            streak_seconds,
            score_before = change.before,
            score_after = change.after,
            "relapse recorded"
        );
        self.save()?;

        Ok(vec![
            Event::score_changed(change, now),
            Event::StreakReset {
                previous_anchor,
                streak_seconds,
                at: now,
            },
        ])
    }

    /// Bump the achievements reset counter. Unlock state is unaffected.
    pub fn reset_achievements(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let reset_count = self.achievements.reset_achievements();
        self.save()?;
        Ok(vec![Event::AchievementsReset {
            reset_count,
            at: now,
        }])
    }

    /// Achievements crossed between two refresh ticks.
    pub fn unlocked_between(&self, previous: DateTime<Utc>, now: DateTime<Utc>) -> Vec<Event> {
        let before = self.anchor.days_since(previous);
        let after = self.anchor.days_since(now);
        self.achievements
            .newly_unlocked(before, after)
            .into_iter()
            .map(|a| Event::AchievementUnlocked {
                unlock_number: a.unlock_number,
                title: a.title.to_string(),
                days_required: a.days_required,
                at: now,
            })
            .collect()
    }

    pub fn score_snapshot(&self) -> ScoreSnapshot {
        let state = self.consistency.state();
        let level = self.consistency.level();
        ScoreSnapshot {
            score: state.score,
            level,
            label: level.label(),
            tier: level.tier(),
            color: level.tier().color_name(),
            consecutive_days: state.consecutive_days_count,
            last_app_open_date: state.last_app_open_date,
            last_score_update_date: state.last_score_update_date,
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> StatusSnapshot {
        let days_since = self.days_since(now);
        let elapsed = self.elapsed(now);
        StatusSnapshot {
            now,
            last_relapse: self.anchor.last_relapse(),
            streak_seconds: self.anchor.streak_seconds(now),
            days_since,
            elapsed,
            elapsed_display: elapsed.to_string(),
            achievements: self.achievements.progress(days_since),
            score: self.score_snapshot(),
        }
    }

    fn persisted(&self) -> PersistedState {
        PersistedState {
            anchor: self.anchor,
            consistency: self.consistency.state().clone(),
            achievements_reset_count: self.achievements.reset_count(),
        }
    }

    fn save(&mut self) -> Result<()> {
        let state = self.persisted();
        state.save(&mut self.store)
    }
}

impl Tracker<Database> {
    /// [`record_relapse`](Tracker::record_relapse), also appending the ended
    /// streak to the relapse history.
    pub fn record_relapse_logged(
        &mut self,
        now: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<Vec<Event>> {
        let events = self.record_relapse(now)?;
        for event in &events {
            if let Event::StreakReset { streak_seconds, .. } = event {
                self.store.record_relapse(now, *streak_seconds, note)?;
            }
        }
        Ok(events)
    }

    /// Longest streak so far, counting the one in progress.
    pub fn best_streak_seconds(&self, now: DateTime<Utc>) -> Result<i64> {
        let logged = self.store.longest_logged_streak()?.unwrap_or(0);
        Ok(logged.max(self.anchor.streak_seconds(now)))
    }
}

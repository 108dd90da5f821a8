//! Key-value layout of the persisted streak and score state.
//!
//! Values are stored as strings under fixed keys. Reading never fails on a
//! bad value: anything missing or unparseable falls back to its default.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::consistency::day::{format_day, parse_day};
use crate::consistency::ConsistencyState;
use crate::error::Result;
use crate::streak::StreakAnchor;

pub const LAST_RELAPSE_KEY: &str = "lastRelapseTimeInterval";
pub const CONSISTENCY_SCORE_KEY: &str = "consistencyScore";
pub const LAST_APP_OPEN_DATE_KEY: &str = "lastAppOpenDate";
pub const CONSECUTIVE_DAYS_KEY: &str = "consecutiveDaysCount";
pub const LAST_SCORE_UPDATE_DATE_KEY: &str = "lastScoreUpdateDate";
pub const ACHIEVEMENTS_RESET_COUNT_KEY: &str = "achievementsResetCount";
pub const LAST_CATCH_UP_DATE_KEY: &str = "lastCatchUpDate";

/// Backing store for persisted state.
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Store kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Everything the tracker persists under the kv keys.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedState {
    pub anchor: StreakAnchor,
    pub consistency: ConsistencyState,
    pub achievements_reset_count: u32,
}

impl PersistedState {
    /// Defaults for a first run at `now`.
    pub fn fresh(now: DateTime<Utc>, initial_score: i32) -> Self {
        Self {
            anchor: StreakAnchor::new(now),
            consistency: ConsistencyState::new(initial_score),
            achievements_reset_count: 0,
        }
    }

    /// Read state from `store`.
    ///
    /// # Errors
    /// Only errors from the store itself are returned.
    pub fn load(
        store: &dyn StateStore,
        now: DateTime<Utc>,
        initial_score: i32,
    ) -> Result<LoadedState> {
        let defaults = Self::fresh(now, initial_score);
        let mut reader = Reader { store, recovered: false };

        let stored_anchor = store.get(LAST_RELAPSE_KEY)?;
        let first_run = stored_anchor.is_none();
        let anchor = match stored_anchor {
            None => defaults.anchor,
            Some(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(StreakAnchor::from_epoch_seconds);
                parsed.unwrap_or_else(|| {
                    tracing::warn!(key = LAST_RELAPSE_KEY, value = %raw, "corrupt anchor, resetting to now");
                    reader.recovered = true;
                    defaults.anchor
                })
            }
        };

        let score = reader
            .parsed(CONSISTENCY_SCORE_KEY)?
            .unwrap_or(defaults.consistency.score);
        let consecutive_days_count = reader.parsed(CONSECUTIVE_DAYS_KEY)?.unwrap_or(0);
        let last_app_open_date = reader.day(LAST_APP_OPEN_DATE_KEY)?;
        let last_score_update_date = reader.day(LAST_SCORE_UPDATE_DATE_KEY)?;
        let last_catch_up_date = reader.day(LAST_CATCH_UP_DATE_KEY)?;
        let achievements_reset_count = reader.parsed(ACHIEVEMENTS_RESET_COUNT_KEY)?.unwrap_or(0);

        let state = Self {
            anchor,
            consistency: ConsistencyState {
                score,
                last_app_open_date,
                last_score_update_date,
                consecutive_days_count,
                last_catch_up_date,
            },
            achievements_reset_count,
        };
        Ok(LoadedState {
            state,
            first_run,
            recovered: reader.recovered,
        })
    }

    /// Write every key.
    pub fn save(&self, store: &mut dyn StateStore) -> Result<()> {
        store.set(LAST_RELAPSE_KEY, &self.anchor.to_epoch_seconds().to_string())?;
        store.set(CONSISTENCY_SCORE_KEY, &self.consistency.score.to_string())?;
        store.set(
            LAST_APP_OPEN_DATE_KEY,
            &day_key(self.consistency.last_app_open_date),
        )?;
        store.set(
            CONSECUTIVE_DAYS_KEY,
            &self.consistency.consecutive_days_count.to_string(),
        )?;
        store.set(
            LAST_SCORE_UPDATE_DATE_KEY,
            &day_key(self.consistency.last_score_update_date),
        )?;
        store.set(
            LAST_CATCH_UP_DATE_KEY,
            &day_key(self.consistency.last_catch_up_date),
        )?;
        store.set(
            ACHIEVEMENTS_RESET_COUNT_KEY,
            &self.achievements_reset_count.to_string(),
        )?;
        Ok(())
    }
}

/// Result of [`PersistedState::load`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedState {
    pub state: PersistedState,
    /// No anchor had been stored yet.
    pub first_run: bool,
    /// A stored value was unreadable and replaced by its default.
    pub recovered: bool,
}

fn day_key(day: Option<NaiveDate>) -> String {
    day.map(format_day).unwrap_or_default()
}

struct Reader<'a> {
    store: &'a dyn StateStore,
    recovered: bool,
}

impl Reader<'_> {
    fn parsed<T: std::str::FromStr>(&mut self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => {
                tracing::warn!(key, value = %raw, "corrupt stored value, using default");
                self.recovered = true;
                Ok(None)
            }
        }
    }

    /// Empty string means "never".
    fn day(&mut self, key: &str) -> Result<Option<NaiveDate>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match parse_day(&raw) {
            Ok(day) => Ok(Some(day)),
            Err(_) => {
                tracing::warn!(key, value = %raw, "corrupt stored day, treating as unset");
                self.recovered = true;
                Ok(None)
            }
        }
    }
}

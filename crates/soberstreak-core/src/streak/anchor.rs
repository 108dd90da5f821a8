use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::elapsed::{self, TimeComponents};

const SECONDS_PER_DAY: i64 = 86_400;

/// The instant of the last reported relapse.
///
/// Every streak-derived value (elapsed time, days since, achievement state)
/// is computed from this one timestamp. It only moves through [`reset`].
///
/// [`reset`]: StreakAnchor::reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakAnchor {
    last_relapse: DateTime<Utc>,
}

impl StreakAnchor {
    /// Anchor a fresh streak at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { last_relapse: now }
    }

    pub fn last_relapse(&self) -> DateTime<Utc> {
        self.last_relapse
    }

    /// Overwrite the anchor unconditionally.
    pub fn reset(&mut self, to: DateTime<Utc>) {
        self.last_relapse = to;
    }

    /// Whole days since the anchor, `floor((now - anchor) / 86400)`.
    /// A `now` earlier than the anchor counts as day zero.
    pub fn days_since(&self, now: DateTime<Utc>) -> u32 {
        let secs = now.signed_duration_since(self.last_relapse).num_seconds();
        if secs <= 0 {
            return 0;
        }
        u32::try_from(secs / SECONDS_PER_DAY).unwrap_or(u32::MAX)
    }

    /// Total seconds of the current streak, zero if `now` precedes the anchor.
    pub fn streak_seconds(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.last_relapse)
            .num_seconds()
            .max(0)
    }

    /// Elapsed components in UTC calendar terms.
    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeComponents {
        elapsed::compute(&self.last_relapse, &now)
    }

    /// Elapsed components using the calendar of `tz`.
    pub fn elapsed_in<Tz: TimeZone>(&self, tz: &Tz, now: DateTime<Utc>) -> TimeComponents {
        let start = self.last_relapse.with_timezone(tz);
        let end = now.with_timezone(tz);
        elapsed::compute(&start, &end)
    }

    /// Elapsed components in the host's local calendar.
    pub fn elapsed_local(&self, now: DateTime<Utc>) -> TimeComponents {
        self.elapsed_in(&Local, now)
    }

    /// Epoch seconds with sub-second precision, the persisted form.
    pub fn to_epoch_seconds(&self) -> f64 {
        self.last_relapse.timestamp() as f64
            + f64::from(self.last_relapse.timestamp_subsec_nanos()) / 1e9
    }

    /// Rebuild from persisted epoch seconds. Returns `None` for values
    /// that are not finite or fall outside chrono's range.
    pub fn from_epoch_seconds(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
        if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp(whole as i64, nanos).map(Self::new)
    }
}

//! Calendar-aware decomposition of an elapsed span.
//!
//! The span between two instants is broken down greedily, most significant
//! unit first: whole calendar months, then whole calendar days, then hours,
//! minutes and seconds of what remains. Month steps follow the calendar of
//! the time zone the instants are expressed in, so Jan 31 + 1 month lands on
//! the last day of February rather than 30 days later.

use std::fmt;

use chrono::{DateTime, Days, Duration, LocalResult, Months, NaiveDateTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};

/// Elapsed time split into calendar units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeComponents {
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimeComponents {
    /// True when every unit is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Advance `start` by these components the same way [`compute`] consumed
    /// them: one month at a time, then one day at a time, then a fixed span.
    ///
    /// Returns `None` if a step leaves chrono's representable range.
    pub fn apply_to<Tz: TimeZone>(&self, start: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = start.timezone();
        let mut wall = start.naive_local();
        let mut cursor = start.clone();
        for (count, step) in [(self.months, next_month as Step), (self.days, next_day as Step)] {
            for _ in 0..count {
                wall = step(wall)?;
                cursor = resolve_local(&tz, wall)?;
            }
        }
        let rest = Duration::hours(i64::from(self.hours))
            + Duration::minutes(i64::from(self.minutes))
            + Duration::seconds(i64::from(self.seconds));
        cursor.checked_add_signed(rest)
    }
}

impl fmt::Display for TimeComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months > 0 {
            write!(f, "{}mo ", self.months)?;
        }
        if self.months > 0 || self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

type Step = fn(NaiveDateTime) -> Option<NaiveDateTime>;

fn next_month(wall: NaiveDateTime) -> Option<NaiveDateTime> {
    wall.checked_add_months(Months::new(1))
}

fn next_day(wall: NaiveDateTime) -> Option<NaiveDateTime> {
    wall.checked_add_days(Days::new(1))
}

/// Map a wall-clock time back to an instant in `tz`.
///
/// A time repeated by a backward shift resolves to its earlier occurrence.
/// A time skipped by a forward shift is read with the offset in force before
/// the shift, which lands the same distance past the gap.
fn resolve_local<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => Some(t),
        LocalResult::None => {
            let before = wall.checked_sub_signed(Duration::days(1))?;
            let offset = tz.offset_from_utc_datetime(&before).fix();
            let utc = wall.checked_sub_signed(Duration::seconds(i64::from(
                offset.local_minus_utc(),
            )))?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

/// Take `step` on the wall clock for as long as the resolved instant stays
/// at or before `end`. Returns how many steps were taken.
fn advance<Tz: TimeZone>(
    wall: &mut NaiveDateTime,
    cursor: &mut DateTime<Tz>,
    end: &DateTime<Tz>,
    step: Step,
) -> u32 {
    let tz = end.timezone();
    let mut taken = 0u32;
    while let Some(next_wall) = step(*wall) {
        let Some(next) = resolve_local(&tz, next_wall) else {
            break;
        };
        if next > *end {
            break;
        }
        *wall = next_wall;
        *cursor = next;
        taken += 1;
    }
    taken
}

/// Decompose the span from `start` to `end`.
///
/// Returns all zeros when `end` is not after `start`. Sub-second remainders
/// are dropped. Month and day steps move the wall clock of the zone, so a
/// daylight-saving shift inside the span shows up in the hours rather than
/// stopping the calendar walk; `hours` reaches 24 only on a 25-hour day.
pub fn compute<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> TimeComponents {
    if end <= start {
        return TimeComponents::default();
    }

    let mut wall = start.naive_local();
    let mut cursor = start.clone();
    let months = advance(&mut wall, &mut cursor, end, next_month);
    let days = advance(&mut wall, &mut cursor, end, next_day);

    // Below a day every unit has a fixed length.
    let remaining = end.clone().signed_duration_since(cursor).num_seconds().max(0);
    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;
    let seconds = remaining % 60;

    TimeComponents {
        months,
        days,
        hours: hours as u32,
        minutes: minutes as u32,
        seconds: seconds as u32,
    }
}

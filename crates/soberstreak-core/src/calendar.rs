//! Which calendar "today" and elapsed months are measured in.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

use crate::consistency::day::day_of;
use crate::streak::{StreakAnchor, TimeComponents};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    Utc,
    /// The host's local zone, DST included.
    Local,
    Fixed(FixedOffset),
}

impl Calendar {
    pub fn from_local_flag(use_local_time: bool) -> Self {
        if use_local_time {
            Self::Local
        } else {
            Self::Utc
        }
    }

    /// Calendar day that `now` falls on.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Utc => day_of(&now),
            Self::Local => day_of(&now.with_timezone(&Local)),
            Self::Fixed(offset) => day_of(&now.with_timezone(offset)),
        }
    }

    pub fn elapsed(&self, anchor: &StreakAnchor, now: DateTime<Utc>) -> TimeComponents {
        match self {
            Self::Utc => anchor.elapsed(now),
            Self::Local => anchor.elapsed_local(now),
            Self::Fixed(offset) => anchor.elapsed_in(offset, now),
        }
    }
}

//! Milestone achievements unlocked by days since the last relapse.
//!
//! The catalog is fixed and ordered by ascending `days_required`. Unlock
//! state is never stored: it is recomputed from the elapsed day count on
//! every query.

use serde::Serialize;

/// One milestone in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub title: &'static str,
    pub description: &'static str,
    pub days_required: u32,
    /// 1-based position in the catalog.
    pub unlock_number: u32,
    pub icon_name: &'static str,
}

impl Achievement {
    const fn new(
        unlock_number: u32,
        days_required: u32,
        title: &'static str,
        description: &'static str,
        icon_name: &'static str,
    ) -> Self {
        Self {
            title,
            description,
            days_required,
            unlock_number,
            icon_name,
        }
    }

    pub fn is_unlocked(&self, days_since: u32) -> bool {
        days_since >= self.days_required
    }
}

const CATALOG: [Achievement; 12] = [
    Achievement::new(1, 1, "First Step", "Made it through your first full day.", "leaf"),
    Achievement::new(2, 3, "Three Days Strong", "Three days without a relapse.", "flame"),
    Achievement::new(3, 5, "High Five", "Five days of steady progress.", "hand.raised"),
    Achievement::new(4, 7, "One Week", "A full week behind you.", "calendar"),
    Achievement::new(5, 14, "Two Weeks", "Two weeks of new habits.", "star"),
    Achievement::new(6, 30, "One Month", "A whole month of recovery.", "moon.stars"),
    Achievement::new(7, 40, "Forty Days", "Forty days and still going.", "mountain.2"),
    Achievement::new(8, 50, "Halfway to 100", "Fifty days of commitment.", "figure.walk"),
    Achievement::new(9, 60, "Two Months", "Two months of consistency.", "sun.max"),
    Achievement::new(10, 70, "Seventy Days", "Seventy days of strength.", "bolt.heart"),
    Achievement::new(11, 80, "Eighty Days", "Eighty days, the finish line is near.", "shield"),
    Achievement::new(12, 90, "Ninety Days", "Ninety days. A new baseline.", "crown"),
];

/// An achievement paired with its unlock state for a given day count.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
}

/// Summary of achievement progress at a day count.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementProgress {
    pub days_since: u32,
    pub unlocked_count: usize,
    pub total: usize,
    pub next: Option<Achievement>,
    pub progress_fraction: f64,
}

/// Queries over the achievement catalog.
#[derive(Debug, Clone)]
pub struct AchievementEngine {
    catalog: Vec<Achievement>,
    reset_count: u32,
}

impl AchievementEngine {
    pub fn new() -> Self {
        Self::with_reset_count(0)
    }

    /// Restore an engine with a persisted reset counter.
    pub fn with_reset_count(reset_count: u32) -> Self {
        Self {
            catalog: CATALOG.to_vec(),
            reset_count,
        }
    }

    pub fn catalog(&self) -> &[Achievement] {
        &self.catalog
    }

    pub fn reset_count(&self) -> u32 {
        self.reset_count
    }

    pub fn is_unlocked(&self, achievement: &Achievement, days_since: u32) -> bool {
        achievement.is_unlocked(days_since)
    }

    pub fn unlocked_count(&self, days_since: u32) -> usize {
        self.catalog
            .iter()
            .filter(|a| a.is_unlocked(days_since))
            .count()
    }

    /// First locked achievement in catalog order, `None` once all are unlocked.
    pub fn next_achievement(&self, days_since: u32) -> Option<&Achievement> {
        self.catalog.iter().find(|a| !a.is_unlocked(days_since))
    }

    /// The most recently unlocked achievement, if any.
    pub fn last_unlocked(&self, days_since: u32) -> Option<&Achievement> {
        self.catalog
            .iter()
            .rev()
            .find(|a| a.is_unlocked(days_since))
    }

    /// Progress from the last unlocked threshold toward the next one, in [0, 1].
    /// Once every achievement is unlocked the ring is full.
    pub fn progress_fraction(&self, days_since: u32) -> f64 {
        let Some(next) = self.next_achievement(days_since) else {
            return 1.0;
        };
        let prev = self
            .last_unlocked(days_since)
            .map_or(0, |a| a.days_required);

        if days_since <= prev {
            return 0.0;
        }
        if days_since >= next.days_required {
            return 1.0;
        }
        let fraction =
            f64::from(days_since - prev) / f64::from(next.days_required - prev);
        fraction.clamp(0.0, 1.0)
    }

    /// Achievements crossed when the day count moves from `before` to `after`.
    pub fn newly_unlocked(&self, before: u32, after: u32) -> Vec<&Achievement> {
        self.catalog
            .iter()
            .filter(|a| !a.is_unlocked(before) && a.is_unlocked(after))
            .collect()
    }

    pub fn statuses(&self, days_since: u32) -> Vec<AchievementStatus> {
        self.catalog
            .iter()
            .map(|a| AchievementStatus {
                achievement: a.clone(),
                unlocked: a.is_unlocked(days_since),
            })
            .collect()
    }

    pub fn progress(&self, days_since: u32) -> AchievementProgress {
        AchievementProgress {
            days_since,
            unlocked_count: self.unlocked_count(days_since),
            total: self.catalog.len(),
            next: self.next_achievement(days_since).cloned(),
            progress_fraction: self.progress_fraction(days_since),
        }
    }

    /// Bumps the reset counter. Unlock state is derived from elapsed days,
    /// so this does not relock anything.
    pub fn reset_achievements(&mut self) -> u32 {
        self.reset_count = self.reset_count.saturating_add(1);
        self.reset_count
    }
}

impl Default for AchievementEngine {
    fn default() -> Self {
        Self::new()
    }
}

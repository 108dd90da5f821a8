use serde::{Deserialize, Serialize};

/// Named band of the consistency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    GettingStarted,
    BuildingHabits,
    MakingProgress,
    Consistent,
    HighlyConsistent,
    Master,
}

impl ConsistencyLevel {
    /// Band for a score; values outside [0, 100] are clamped first.
    pub fn from_score(score: i32) -> Self {
        match score.clamp(0, 100) {
            0..=19 => Self::GettingStarted,
            20..=39 => Self::BuildingHabits,
            40..=59 => Self::MakingProgress,
            60..=79 => Self::Consistent,
            80..=94 => Self::HighlyConsistent,
            _ => Self::Master,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::GettingStarted => "Getting Started",
            Self::BuildingHabits => "Building Habits",
            Self::MakingProgress => "Making Progress",
            Self::Consistent => "Consistent",
            Self::HighlyConsistent => "Highly Consistent",
            Self::Master => "Master Level",
        }
    }

    pub fn tier(&self) -> ScoreTier {
        match self {
            Self::GettingStarted => ScoreTier::Critical,
            Self::BuildingHabits => ScoreTier::Low,
            Self::MakingProgress => ScoreTier::Moderate,
            Self::Consistent => ScoreTier::Good,
            Self::HighlyConsistent => ScoreTier::Strong,
            Self::Master => ScoreTier::Excellent,
        }
    }
}

/// Severity tier shown alongside the level, one per band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Critical,
    Low,
    Moderate,
    Good,
    Strong,
    Excellent,
}

impl ScoreTier {
    pub fn color_name(&self) -> &'static str {
        match self {
            Self::Critical => "red",
            Self::Low => "orange",
            Self::Moderate => "yellow",
            Self::Good => "mint",
            Self::Strong => "green",
            Self::Excellent => "blue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(ConsistencyLevel::from_score(0).label(), "Getting Started");
        assert_eq!(ConsistencyLevel::from_score(19).label(), "Getting Started");
        assert_eq!(ConsistencyLevel::from_score(20).label(), "Building Habits");
        assert_eq!(ConsistencyLevel::from_score(39), ConsistencyLevel::BuildingHabits);
        assert_eq!(ConsistencyLevel::from_score(40), ConsistencyLevel::MakingProgress);
        assert_eq!(ConsistencyLevel::from_score(60), ConsistencyLevel::Consistent);
        assert_eq!(ConsistencyLevel::from_score(80), ConsistencyLevel::HighlyConsistent);
        assert_eq!(ConsistencyLevel::from_score(94), ConsistencyLevel::HighlyConsistent);
        assert_eq!(ConsistencyLevel::from_score(95), ConsistencyLevel::Master);
        assert_eq!(ConsistencyLevel::from_score(100).label(), "Master Level");
    }

    #[test]
    fn out_of_range_scores_clamp() {
        assert_eq!(ConsistencyLevel::from_score(-5), ConsistencyLevel::GettingStarted);
        assert_eq!(ConsistencyLevel::from_score(250), ConsistencyLevel::Master);
    }

    #[test]
    fn tiers_follow_levels() {
        assert_eq!(ConsistencyLevel::from_score(10).tier().color_name(), "red");
        assert_eq!(ConsistencyLevel::from_score(100).tier(), ScoreTier::Excellent);
        assert_eq!(ConsistencyLevel::from_score(65).tier().color_name(), "mint");
    }
}

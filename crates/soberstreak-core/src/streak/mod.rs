mod anchor;
pub mod elapsed;

pub use anchor::StreakAnchor;
pub use elapsed::TimeComponents;

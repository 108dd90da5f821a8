pub mod achievements;
pub mod config;
pub mod journal;
pub mod status;
pub mod streak;

use serde::Serialize;
use soberstreak_core::RelapseRecord;

use crate::context::{open_session, print_json};

#[derive(Serialize)]
struct History {
    current_streak_seconds: i64,
    best_streak_seconds: i64,
    relapses: Vec<RelapseRecord>,
}

pub fn run_status() -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session()?;
    print_json(&session.tracker.snapshot(session.now))
}

pub fn run_score() -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session()?;
    print_json(&session.tracker.score_snapshot())
}

pub fn run_history() -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session()?;
    let tracker = &session.tracker;
    let history = History {
        current_streak_seconds: tracker.anchor().streak_seconds(session.now),
        best_streak_seconds: tracker.best_streak_seconds(session.now)?,
        relapses: tracker.store().relapses()?,
    };
    print_json(&history)
}

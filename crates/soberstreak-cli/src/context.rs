//! Opens the database and config and builds a tracker for one command.

use chrono::{DateTime, Utc};
use soberstreak_core::{Calendar, Config, Database, Event, PcgScoreRng, Tracker};

pub struct Session {
    pub tracker: Tracker<Database>,
    /// Events produced while loading (catch-up penalties).
    pub load_events: Vec<Event>,
    pub now: DateTime<Utc>,
}

pub fn open_session() -> Result<Session, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let now = Utc::now();
    let rng = PcgScoreRng::new(config.rng.seed);
    let (tracker, load_events) = Tracker::load(
        db,
        config.scoring.clone(),
        Box::new(rng),
        Calendar::from_local_flag(config.display.use_local_time),
        now,
    )?;
    Ok(Session {
        tracker,
        load_events,
        now,
    })
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use crate::context::{open_session, print_json};

pub fn run_open() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session()?;
    let mut events = std::mem::take(&mut session.load_events);
    events.extend(session.tracker.record_app_open(session.now)?);
    print_json(&events)
}

pub fn run_relapse(note: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session()?;
    let note = note.map(str::trim).filter(|n| !n.is_empty());
    let mut events = std::mem::take(&mut session.load_events);
    events.extend(session.tracker.record_relapse_logged(session.now, note)?);
    print_json(&events)
}

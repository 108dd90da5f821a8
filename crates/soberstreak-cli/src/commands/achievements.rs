use clap::Subcommand;

use crate::context::{open_session, print_json};

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// Every achievement with its unlock state
    List,
    /// The next locked achievement and progress toward it
    Next,
    /// Increment the reset counter (unlocks are derived from the streak)
    Reset,
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session()?;
    let days_since = session.tracker.days_since(session.now);

    match action {
        AchievementsAction::List => {
            print_json(&session.tracker.achievements().statuses(days_since))?;
        }
        AchievementsAction::Next => {
            print_json(&session.tracker.achievements().progress(days_since))?;
        }
        AchievementsAction::Reset => {
            let events = session.tracker.reset_achievements(session.now)?;
            print_json(&events)?;
        }
    }
    Ok(())
}

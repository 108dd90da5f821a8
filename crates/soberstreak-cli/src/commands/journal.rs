use chrono::Utc;
use clap::Subcommand;
use soberstreak_core::{Database, JournalEntry};

use crate::context::print_json;

#[derive(Subcommand)]
pub enum JournalAction {
    /// Add an entry
    Add {
        /// Entry text
        text: String,
        /// Mood from 1 (worst) to 5 (best)
        #[arg(long)]
        mood: Option<u8>,
    },
    /// List entries, newest first
    List {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

pub fn run(action: JournalAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        JournalAction::Add { text, mood } => {
            let entry = JournalEntry::new(&text, mood, Utc::now())?;
            db.add_journal_entry(&entry)?;
            print_json(&entry)?;
        }
        JournalAction::List { limit } => {
            print_json(&db.journal_entries(limit)?)?;
        }
    }
    Ok(())
}

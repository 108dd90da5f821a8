use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "soberstreak-cli", version, about = "Soberstreak CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current streak, achievements and score as JSON
    Status,
    /// Record an app open for today
    Open,
    /// Record a relapse and restart the streak
    Relapse {
        /// Optional note stored with the relapse
        #[arg(long)]
        note: Option<String>,
    },
    /// Milestone achievements
    Achievements {
        #[command(subcommand)]
        action: commands::achievements::AchievementsAction,
    },
    /// Consistency score, level and tier
    Score,
    /// Relapse history and best streak
    History,
    /// Recovery journal
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SOBERSTREAK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Status => commands::status::run_status(),
        Commands::Open => commands::streak::run_open(),
        Commands::Relapse { note } => commands::streak::run_relapse(note.as_deref()),
        Commands::Achievements { action } => commands::achievements::run(action),
        Commands::Score => commands::status::run_score(),
        Commands::History => commands::status::run_history(),
        Commands::Journal { action } => commands::journal::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

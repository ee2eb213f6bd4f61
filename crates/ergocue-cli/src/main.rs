use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ergocue", version, about = "ErgoCue desk-ergonomics reminders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler, reading commands from stdin
    Run(commands::run::RunArgs),
    /// Settings management
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Cue library management
    Cue {
        #[command(subcommand)]
        action: commands::cue::CueAction,
    },
    /// Cue statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Level and XP
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Streak badges
    Badges {
        #[command(subcommand)]
        action: commands::badges::BadgesAction,
    },
    /// Remote leaderboard
    Leaderboard {
        #[command(subcommand)]
        action: commands::leaderboard::LeaderboardAction,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ERGOCUE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Cue { action } => commands::cue::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Badges { action } => commands::badges::run(action),
        Commands::Leaderboard { action } => commands::leaderboard::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

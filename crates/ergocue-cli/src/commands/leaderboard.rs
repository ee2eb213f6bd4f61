use clap::Subcommand;
use ergocue_core::{LeaderboardClient, LeaderboardError, Store};

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum LeaderboardAction {
    /// Highest-ranked users
    Top {
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Your own rank
    Rank,
}

pub fn run(action: LeaderboardAction) -> CliResult {
    let store = open_store()?;
    let identity = store.load_settings().identity;
    let base = identity
        .leaderboard_url
        .as_deref()
        .ok_or(LeaderboardError::Disabled)?;
    let client = LeaderboardClient::new(base)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match action {
        LeaderboardAction::Top { count } => {
            let entries = runtime.block_on(client.top(count))?;
            for (i, e) in entries.iter().enumerate() {
                let me = if e.user_id == identity.user_id { " *" } else { "" };
                println!(
                    "{:>3}. {:<20} level {:>3}  {:>7} XP  {}/{} done{me}",
                    i + 1,
                    e.username,
                    e.level,
                    e.total_xp,
                    e.completed_cues,
                    e.counts().total()
                );
            }
        }
        LeaderboardAction::Rank => match runtime.block_on(client.rank(&identity.user_id))? {
            Some(rank) => println!("{rank}"),
            None => println!("not ranked"),
        },
    }
    Ok(())
}

use clap::Subcommand;
use ergocue_core::progression::all_badges;
use ergocue_core::Store;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum BadgesAction {
    /// List badges with their thresholds
    List {
        /// Only show unlocked badges
        #[arg(long)]
        unlocked: bool,
    },
}

pub fn run(action: BadgesAction) -> CliResult {
    let store = open_store()?;
    let progress = store.load_settings().progress;

    match action {
        BadgesAction::List { unlocked } => {
            for badge in all_badges() {
                let has = progress.has_badge(badge.name);
                if unlocked && !has {
                    continue;
                }
                let mark = if has { "x" } else { " " };
                let kind = if badge.is_negative() { "negative" } else { "positive" };
                println!("[{mark}] {:>5}  {kind:<8}  {}", badge.threshold, badge.name);
            }
        }
    }
    Ok(())
}

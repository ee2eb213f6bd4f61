use clap::Subcommand;
use ergocue_core::statistics::sorted_recent_first;
use ergocue_core::{StatisticsSummary, Store};

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals, completion rate and per-type breakdown
    Summary,
    /// Recorded cues, most recent first
    List {
        /// Maximum number of records
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let store = open_store()?;
    let records = store.load_statistics();

    match action {
        StatsAction::Summary => {
            let summary = StatisticsSummary::from_records(&records);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::List { limit } => {
            let recent: Vec<_> = sorted_recent_first(&records)
                .into_iter()
                .take(limit)
                .collect();
            println!("{}", serde_json::to_string_pretty(&recent)?);
        }
    }
    Ok(())
}

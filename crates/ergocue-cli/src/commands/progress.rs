use clap::Subcommand;
use ergocue_core::{ProgressionEngine, Store};
use serde_json::json;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Print level, XP and streaks as JSON
    Show,
}

pub fn run(action: ProgressAction) -> CliResult {
    let store = open_store()?;
    let settings = store.load_settings();
    let engine = ProgressionEngine::with_config(settings.progression.clone());
    let p = &settings.progress;

    match action {
        ProgressAction::Show => {
            let view = json!({
                "level": p.level,
                "current_xp": p.current_xp,
                "xp_for_next_level": engine.xp_for_next_level(p.level),
                "progress_percentage": engine.progress_percentage(p),
                "total_xp_earned": p.total_xp_earned,
                "current_streak": p.current_streak,
                "best_streak": p.best_streak,
                "current_negative_streak": p.current_negative_streak,
                "worst_negative_streak": p.worst_negative_streak,
                "badges_unlocked": p.unlocked_badges.len(),
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}

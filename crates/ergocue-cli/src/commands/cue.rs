use clap::Subcommand;
use ergocue_core::{Cue, CueType, Store, XpCalculator};
use uuid::Uuid;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum CueAction {
    /// List cues
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a custom cue
    Add {
        /// Cue type (e.g. "sitting_stretch", "desk-standing")
        cue_type: CueType,
        /// Title shown to the user
        title: String,
        /// Longer instructions
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Remove a cue
    Remove { id: Uuid },
    /// Enable a cue
    Enable { id: Uuid },
    /// Disable a cue
    Disable { id: Uuid },
    /// Replace the cue library with the defaults
    Reset,
}

pub fn run(action: CueAction) -> CliResult {
    let store = open_store()?;
    let mut settings = store.load_settings();

    match action {
        CueAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&settings.cues)?);
                return Ok(());
            }
            let xp = XpCalculator::new();
            for cue in &settings.cues {
                let mark = if cue.enabled { "on " } else { "off" };
                println!(
                    "{}  {mark}  {:<24} {}  ({})",
                    cue.id,
                    cue.cue_type,
                    cue.title,
                    xp.describe(cue.cue_type)
                );
            }
        }
        CueAction::Add {
            cue_type,
            title,
            description,
        } => {
            let id = settings.add_cue(Cue::new(cue_type, title, description))?;
            store.save_settings(&settings)?;
            println!("{id}");
        }
        CueAction::Remove { id } => {
            let removed = settings.remove_cue(id)?;
            store.save_settings(&settings)?;
            println!("removed: {}", removed.title);
        }
        CueAction::Enable { id } => {
            settings.set_cue_enabled(id, true)?;
            store.save_settings(&settings)?;
            println!("ok");
        }
        CueAction::Disable { id } => {
            settings.set_cue_enabled(id, false)?;
            store.save_settings(&settings)?;
            println!("ok");
        }
        CueAction::Reset => {
            let count = settings.reset_cues();
            store.save_settings(&settings)?;
            println!("restored {count} default cues");
        }
    }
    Ok(())
}

use clap::Subcommand;
use ergocue_core::Store;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a settings value
    Get {
        /// Dot-separated key (e.g. "exercise.min_minutes", "identity.username")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// Print all settings as JSON
    Show,
    /// Check the stored settings against the edit rules
    Validate,
}

pub fn run(action: SettingsAction) -> CliResult {
    let store = open_store()?;
    let mut settings = store.load_settings();

    match action {
        SettingsAction::Get { key } => match settings.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        SettingsAction::Set { key, value } => {
            settings.set(&key, &value)?;
            store.save_settings(&settings)?;
            println!("ok");
        }
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Validate => {
            settings.validate()?;
            println!("ok");
        }
    }
    Ok(())
}

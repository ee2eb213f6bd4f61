//! Persistence gateway.
//!
//! Two JSON documents live in the data directory: `settings.json` (rewritten
//! at every save point) and `statistics.json` (append-only log, rewritten in
//! full on each append).

mod json_store;
mod memory;

pub use json_store::JsonStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::settings::Settings;
use crate::statistics::CueStatistic;

/// Load/save boundary used by the scheduler and coordinator.
///
/// Loads never fail: missing or corrupt documents yield defaults.
pub trait Store: Send + Sync {
    /// Load settings, writing defaults first if none are stored.
    fn load_settings(&self) -> Settings;

    fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// All recorded statistics; empty if absent or unreadable.
    fn load_statistics(&self) -> Vec<CueStatistic>;

    /// Append one closed record. Read-append-write is a single critical section.
    fn append_statistic(&self, statistic: CueStatistic) -> Result<()>;
}

/// Returns the data directory, creating it if needed.
///
/// `ERGOCUE_DATA_DIR` overrides the location. Otherwise
/// `~/.config/ergocue[-dev]/`, with `ERGOCUE_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ERGOCUE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ERGOCUE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("ergocue-dev")
            } else {
                base_dir.join("ergocue")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

pub mod badges;
pub mod cue;
pub mod leaderboard;
pub mod progress;
pub mod run;
pub mod settings;
pub mod stats;

use std::sync::Arc;

use ergocue_core::JsonStore;

pub(crate) type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub(crate) fn open_store() -> CliResult<Arc<JsonStore>> {
    Ok(Arc::new(JsonStore::open()?))
}

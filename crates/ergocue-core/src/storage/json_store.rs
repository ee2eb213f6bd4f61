use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::settings::Settings;
use crate::statistics::CueStatistic;

use super::{data_dir, Store};

const SETTINGS_FILE: &str = "settings.json";
const STATISTICS_FILE: &str = "statistics.json";

/// File-backed store writing pretty-printed JSON.
#[derive(Debug)]
pub struct JsonStore {
    settings_path: PathBuf,
    statistics_path: PathBuf,
    statistics_lock: Mutex<()>,
}

impl JsonStore {
    /// Open the store in the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> Result<Self> {
        Ok(Self::at(data_dir()?))
    }

    /// Store rooted at `dir`. The directory must already exist.
    pub fn at(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            settings_path: dir.join(SETTINGS_FILE),
            statistics_path: dir.join(STATISTICS_FILE),
            statistics_lock: Mutex::new(()),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn statistics_path(&self) -> &Path {
        &self.statistics_path
    }

    fn read_statistics(&self) -> Vec<CueStatistic> {
        let content = match std::fs::read_to_string(&self.statistics_path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.statistics_path.display(), error = %e, "statistics unreadable, starting empty");
            Vec::new()
        })
    }

    fn write_json<T: serde::Serialize + ?Sized>(
        what: &'static str,
        path: &Path,
        value: &T,
    ) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            what,
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

impl Store for JsonStore {
    fn load_settings(&self) -> Settings {
        match std::fs::read_to_string(&self.settings_path) {
            Ok(content) => match serde_json::from_str::<Settings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    // Left on disk; the next save overwrites it.
                    warn!(path = %self.settings_path.display(), error = %e, "settings unreadable, using defaults");
                    Settings::default()
                }
            },
            Err(_) => {
                debug!(path = %self.settings_path.display(), "no settings yet, writing defaults");
                let settings = Settings::default();
                if let Err(e) = self.save_settings(&settings) {
                    warn!(error = %e, "failed to write default settings");
                }
                settings
            }
        }
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        Self::write_json("settings", &self.settings_path, settings)
    }

    fn load_statistics(&self) -> Vec<CueStatistic> {
        let _guard = self
            .statistics_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.read_statistics()
    }

    fn append_statistic(&self, statistic: CueStatistic) -> Result<()> {
        let _guard = self
            .statistics_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut all = self.read_statistics();
        all.push(statistic);
        Self::write_json("statistics", &self.statistics_path, &all)
    }
}

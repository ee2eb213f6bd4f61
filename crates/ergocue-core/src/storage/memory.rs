use std::sync::Mutex;

use crate::error::Result;
use crate::settings::Settings;
use crate::statistics::CueStatistic;

use super::Store;

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: Mutex<Option<Settings>>,
    statistics: Mutex<Vec<CueStatistic>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(Some(settings)),
            ..Self::default()
        }
    }

    /// Last saved settings, if any.
    pub fn saved_settings(&self) -> Option<Settings> {
        self.settings.lock().ok().and_then(|s| s.clone())
    }

    /// Number of `save_settings` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl Store for MemoryStore {
    fn load_settings(&self) -> Settings {
        match self.settings.lock() {
            Ok(mut slot) => slot.get_or_insert_with(Settings::default).clone(),
            Err(_) => Settings::default(),
        }
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        if let Ok(mut slot) = self.settings.lock() {
            *slot = Some(settings.clone());
        }
        if let Ok(mut n) = self.saves.lock() {
            *n += 1;
        }
        Ok(())
    }

    fn load_statistics(&self) -> Vec<CueStatistic> {
        self.statistics
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn append_statistic(&self, statistic: CueStatistic) -> Result<()> {
        self.statistics
            .lock()
            .map_err(|e| crate::CoreError::Custom(e.to_string()))?
            .push(statistic);
        Ok(())
    }
}

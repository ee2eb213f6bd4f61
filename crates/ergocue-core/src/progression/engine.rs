//! XP, level, streak and badge state machine.
//!
//! All operations mutate only the [`UserProgress`] passed in; the engine
//! itself holds configuration and no state.

use serde::{Deserialize, Serialize};

use super::badges::{Badge, NEGATIVE_BADGES, POSITIVE_BADGES};

/// Which streak value positive badges are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeMetric {
    CurrentStreak,
    BestStreak,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// XP required to leave level `n` is `n * xp_per_level`.
    #[serde(default = "default_xp_per_level")]
    pub xp_per_level: u32,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    #[serde(default = "default_badge_metric")]
    pub badge_metric: BadgeMetric,
}

fn default_xp_per_level() -> u32 {
    500
}
fn default_max_level() -> u32 {
    100
}
fn default_badge_metric() -> BadgeMetric {
    BadgeMetric::BestStreak
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_level: default_xp_per_level(),
            max_level: default_max_level(),
            badge_metric: default_badge_metric(),
        }
    }
}

/// Persisted gamification state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub level: u32,
    pub current_xp: u32,
    pub total_xp_earned: u64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub current_negative_streak: u32,
    #[serde(default)]
    pub worst_negative_streak: u32,
    #[serde(default)]
    pub unlocked_badges: Vec<String>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            total_xp_earned: 0,
            current_streak: 0,
            best_streak: 0,
            current_negative_streak: 0,
            worst_negative_streak: 0,
            unlocked_badges: Vec::new(),
        }
    }
}

impl UserProgress {
    pub fn has_badge(&self, name: &str) -> bool {
        self.unlocked_badges.iter().any(|b| b == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressionEngine {
    config: ProgressionConfig,
}

impl ProgressionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProgressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn xp_for_next_level(&self, level: u32) -> u32 {
        level.saturating_mul(self.config.xp_per_level)
    }

    /// 0..=100, where 100 means the level cap has been reached.
    pub fn progress_percentage(&self, progress: &UserProgress) -> u32 {
        if progress.level >= self.config.max_level {
            return 100;
        }
        let required = self.xp_for_next_level(progress.level);
        if required == 0 {
            return 0;
        }
        ((progress.current_xp as u64 * 100) / required as u64).min(100) as u32
    }

    /// Add XP, consuming it level by level. Returns the number of levels gained.
    pub fn add_xp(&self, progress: &mut UserProgress, amount: u32) -> u32 {
        let start_level = progress.level;
        progress.current_xp = progress.current_xp.saturating_add(amount);
        progress.total_xp_earned = progress.total_xp_earned.saturating_add(amount as u64);

        while progress.level < self.config.max_level {
            let required = self.xp_for_next_level(progress.level);
            if required == 0 || progress.current_xp < required {
                break;
            }
            progress.current_xp -= required;
            progress.level += 1;
        }

        if progress.level >= self.config.max_level {
            progress.level = self.config.max_level;
            progress.current_xp = 0;
        }

        progress.level.saturating_sub(start_level)
    }

    /// Remove XP from the current level only; never levels down.
    pub fn remove_xp(&self, progress: &mut UserProgress, amount: u32) {
        progress.current_xp = progress.current_xp.saturating_sub(amount);
    }

    pub fn increment_streak(&self, progress: &mut UserProgress) {
        progress.current_streak = progress.current_streak.saturating_add(1);
        progress.best_streak = progress.best_streak.max(progress.current_streak);
        progress.current_negative_streak = 0;
    }

    pub fn break_streak(&self, progress: &mut UserProgress) {
        progress.current_streak = 0;
        progress.current_negative_streak = progress.current_negative_streak.saturating_add(1);
        progress.worst_negative_streak = progress
            .worst_negative_streak
            .max(progress.current_negative_streak);
    }

    /// Unlock every badge whose threshold is met and return the new ones,
    /// positive table first, each in ascending threshold order.
    pub fn check_and_unlock_badges(&self, progress: &mut UserProgress) -> Vec<&'static Badge> {
        let positive_metric = match self.config.badge_metric {
            BadgeMetric::CurrentStreak => progress.current_streak,
            BadgeMetric::BestStreak => progress.best_streak,
        };
        let negative_metric = progress.worst_negative_streak;

        let mut unlocked = Vec::new();
        let tables = [
            (POSITIVE_BADGES, positive_metric),
            (NEGATIVE_BADGES, negative_metric),
        ];
        for (table, metric) in tables {
            for badge in table.iter().take_while(|b| b.threshold <= metric) {
                if !progress.has_badge(badge.name) {
                    progress.unlocked_badges.push(badge.name.to_string());
                    unlocked.push(badge);
                }
            }
        }
        unlocked
    }
}

//! Best-effort remote mirror of progression totals.
//!
//! The local settings are authoritative; the leaderboard only ever receives
//! snapshots. Publishing is fire-and-forget, see [`LeaderboardSink`].

mod client;

pub use client::{LeaderboardClient, TokioLeaderboardSink};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progression::UserProgress;
use crate::settings::UserIdentity;
use crate::statistics::{CueStatistic, OutcomeCounts};

/// One user's row. Field names match the existing remote documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub level: u32,
    #[serde(rename = "TotalXP")]
    pub total_xp: u64,
    pub completed_cues: usize,
    pub dismissed_cues: usize,
    pub last_updated: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn snapshot(
        identity: &UserIdentity,
        progress: &UserProgress,
        statistics: &[CueStatistic],
        now: DateTime<Utc>,
    ) -> Self {
        let completed = statistics.iter().filter(|s| s.completed).count();
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.trim().to_string(),
            level: progress.level,
            total_xp: progress.total_xp_earned,
            completed_cues: completed,
            dismissed_cues: statistics.len() - completed,
            last_updated: now,
        }
    }

    pub fn counts(&self) -> OutcomeCounts {
        OutcomeCounts {
            completed: self.completed_cues,
            dismissed: self.dismissed_cues,
        }
    }
}

/// Receives snapshots to publish. Implementations must return immediately.
pub trait LeaderboardSink {
    fn publish(&self, entry: LeaderboardEntry);
}

/// Level descending, then total XP descending.
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| {
        b.level
            .cmp(&a.level)
            .then_with(|| b.total_xp.cmp(&a.total_xp))
    });
    entries
}

/// 1-based position of `user_id` in ranked order.
pub fn rank_of(ranked: &[LeaderboardEntry], user_id: &str) -> Option<usize> {
    ranked
        .iter()
        .position(|e| e.user_id == user_id)
        .map(|i| i + 1)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cue::{Cue, DeskPosition};
use crate::scheduler::{SchedulerState, TimerKind};

/// Every notification the core sends to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SchedulerStarted {
        exercise_interval_min: u32,
        position_interval_min: u32,
        at: DateTime<Utc>,
    },
    SchedulerStopped {
        at: DateTime<Utc>,
    },
    SchedulerPaused {
        /// `None` for an indefinite pause.
        until: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    SchedulerResumed {
        at: DateTime<Utc>,
    },
    /// A timed pause expired and the scheduler resumed on its own.
    PauseEnded {
        at: DateTime<Utc>,
    },
    /// A cue should be shown.
    CueReady {
        cue: Cue,
        manual: bool,
        /// Which timer produced the cue; `None` for manual triggers.
        timer: Option<TimerKind>,
        /// Interval (minutes) that elapsed before this cue.
        interval_min: u32,
        at: DateTime<Utc>,
    },
    CueCompleted {
        cue_id: uuid::Uuid,
        xp_delta: i64,
        at: DateTime<Utc>,
    },
    CueDismissed {
        cue_id: uuid::Uuid,
        xp_delta: i64,
        at: DateTime<Utc>,
    },
    /// The countdown ran out while the user was active.
    CueTimedOut {
        cue_id: uuid::Uuid,
        xp_delta: i64,
        streak_broken: bool,
        at: DateTime<Utc>,
    },
    LevelUp {
        level: u32,
        at: DateTime<Utc>,
    },
    BadgesUnlocked {
        badges: Vec<BadgeNotice>,
        at: DateTime<Utc>,
    },
    PositionChanged {
        position: DeskPosition,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SchedulerState,
        exercise_remaining_secs: u64,
        position_remaining_secs: u64,
        paused_until: Option<DateTime<Utc>>,
        cue_countdown_secs: Option<u32>,
        at: DateTime<Utc>,
    },
}

/// Payload for an unlocked badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeNotice {
    pub name: String,
    pub threshold: u32,
    pub negative: bool,
}

impl From<&crate::progression::Badge> for BadgeNotice {
    fn from(badge: &crate::progression::Badge) -> Self {
        Self {
            name: badge.name.to_string(),
            threshold: badge.threshold,
            negative: badge.is_negative(),
        }
    }
}

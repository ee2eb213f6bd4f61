//! # ErgoCue Core Library
//!
//! This library provides the core logic for ErgoCue, a desk-ergonomics
//! reminder. It schedules movement cues, scores how the user responds to
//! them, and keeps XP, levels, streaks and badges. The `ergocue` CLI is a
//! thin shell over the same library.
//!
//! ## Architecture
//!
//! - **Scheduler**: Two wall-clock timers (exercise and position change) that
//!   require the caller to periodically invoke `tick()`
//! - **Coordinator**: Owns the cue on screen and its activity-gated countdown
//! - **Progression**: XP, level, streak and badge state machine
//! - **Storage**: JSON documents for settings and statistics
//! - **Leaderboard**: Best-effort remote mirror of progression totals
//!
//! ## Key Components
//!
//! - [`CueScheduler`]: Dual-timer state machine
//! - [`CueCoordinator`]: Cue lifecycle and scoring
//! - [`ProgressionEngine`]: XP and badge rules
//! - [`Store`]: Persistence gateway

pub mod coordinator;
pub mod cue;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod progression;
pub mod scheduler;
pub mod settings;
pub mod statistics;
pub mod storage;
pub mod xp;

pub use coordinator::{
    ActivityProbe, AlwaysActive, CueCoordinator, CueOutcome, CueResolution, IdleThreshold,
};
pub use cue::{default_cues, Cue, CueType, DeskPosition};
pub use error::{ConfigError, CoreError, LeaderboardError, Result, ValidationError};
pub use events::{BadgeNotice, Event};
pub use leaderboard::{LeaderboardClient, LeaderboardEntry, LeaderboardSink, TokioLeaderboardSink};
pub use progression::{Badge, BadgeCategory, ProgressionConfig, ProgressionEngine, UserProgress};
pub use scheduler::{CueScheduler, SchedulerState, TimerKind};
pub use settings::{IntervalSettings, Settings, SharedSettings, UserIdentity};
pub use statistics::{CueStatistic, StatisticsSummary};
pub use storage::{JsonStore, MemoryStore, Store};
pub use xp::{XpCalculator, XpConfig};

//! Cue scheduling: when the next cue fires and which one it is.

mod engine;
pub mod selection;

pub use engine::{pause_duration, CueScheduler, SchedulerState, TimerKind, MAX_PAUSE_MINUTES};

//! Dual-timer cue scheduler.
//!
//! Like the countdown in the coordinator, the scheduler is a wall-clock state
//! machine with no internal threads: the event loop calls [`CueScheduler::tick`]
//! (or `tick_at` with an explicit instant) and receives the events that fired.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Paused -> Running
//!               ^          |
//!               +----------+  (timed pause expiry)
//! ```
//!
//! Pausing discards elapsed time; resuming draws fresh intervals for both
//! timers.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::selection::{select_exercise, select_position_change};
use crate::cue::DeskPosition;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::settings::{Settings, SharedSettings};
use crate::storage::Store;

/// Longest pause the user may request.
pub const MAX_PAUSE_MINUTES: u32 = 8 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Exercise,
    Position,
}

/// Validate a user-entered pause length.
pub fn pause_duration(minutes: u32) -> Result<Duration, ValidationError> {
    if minutes == 0 {
        return Err(ValidationError::EmptyPause);
    }
    if minutes > MAX_PAUSE_MINUTES {
        return Err(ValidationError::PauseTooLong);
    }
    Ok(Duration::minutes(minutes as i64))
}

#[derive(Debug, Clone, Copy)]
struct CueTimer {
    interval_min: u32,
    started_at: DateTime<Utc>,
}

impl CueTimer {
    fn due_at(&self) -> DateTime<Utc> {
        self.started_at + Duration::minutes(self.interval_min as i64)
    }

    fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.due_at() - now).max(Duration::zero())
    }
}

pub struct CueScheduler {
    settings: SharedSettings,
    store: Arc<dyn Store>,
    rng: Mcg128Xsl64,
    state: SchedulerState,
    exercise: Option<CueTimer>,
    position: Option<CueTimer>,
    paused_until: Option<DateTime<Utc>>,
    last_exercise: Option<Uuid>,
    last_position: Option<Uuid>,
    // Last-shown ids before the most recent pick, for `cue_not_shown`.
    prev_exercise: Option<Uuid>,
    prev_position: Option<Uuid>,
}

impl CueScheduler {
    /// Create a stopped scheduler.
    pub fn new(settings: SharedSettings, store: Arc<dyn Store>) -> Self {
        Self::with_rng(settings, store, Mcg128Xsl64::from_entropy())
    }

    /// Create a stopped scheduler with reproducible interval draws and picks.
    pub fn with_seed(settings: SharedSettings, store: Arc<dyn Store>, seed: u64) -> Self {
        Self::with_rng(settings, store, Mcg128Xsl64::seed_from_u64(seed))
    }

    fn with_rng(settings: SharedSettings, store: Arc<dyn Store>, rng: Mcg128Xsl64) -> Self {
        Self {
            settings,
            store,
            rng,
            state: SchedulerState::Stopped,
            exercise: None,
            position: None,
            paused_until: None,
            last_exercise: None,
            last_position: None,
            prev_exercise: None,
            prev_position: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == SchedulerState::Paused
    }

    /// Auto-resume instant of a timed pause.
    pub fn paused_until(&self) -> Option<DateTime<Utc>> {
        self.paused_until
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// Currently drawn interval for a timer, in minutes.
    pub fn interval_min(&self, kind: TimerKind) -> Option<u32> {
        self.timer(kind).map(|t| t.interval_min)
    }

    /// Time until a timer fires; zero when not running.
    pub fn remaining(&self, kind: TimerKind, now: DateTime<Utc>) -> Duration {
        if self.state != SchedulerState::Running {
            return Duration::zero();
        }
        self.timer(kind)
            .map(|t| t.remaining(now))
            .unwrap_or_else(Duration::zero)
    }

    fn timer(&self, kind: TimerKind) -> Option<&CueTimer> {
        match kind {
            TimerKind::Exercise => self.exercise.as_ref(),
            TimerKind::Position => self.position.as_ref(),
        }
    }

    /// Build a state snapshot event. The coordinator fills in its countdown.
    pub fn snapshot(&self, now: DateTime<Utc>, cue_countdown_secs: Option<u32>) -> Event {
        Event::StateSnapshot {
            state: self.state,
            exercise_remaining_secs: self.remaining(TimerKind::Exercise, now).num_seconds() as u64,
            position_remaining_secs: self.remaining(TimerKind::Position, now).num_seconds() as u64,
            paused_until: self.paused_until,
            cue_countdown_secs,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(Utc::now())
    }

    /// Arm both timers with fresh intervals. No-op while already running.
    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state == SchedulerState::Running {
            return None;
        }
        self.arm(now);
        self.state = SchedulerState::Running;
        self.paused_until = None;
        let exercise = self.exercise.map(|t| t.interval_min).unwrap_or_default();
        let position = self.position.map(|t| t.interval_min).unwrap_or_default();
        info!(exercise_min = exercise, position_min = position, "scheduler started");
        Some(Event::SchedulerStarted {
            exercise_interval_min: exercise,
            position_interval_min: position,
            at: now,
        })
    }

    /// Stop both timers; nothing fires until the next `start`.
    pub fn stop(&mut self) -> Option<Event> {
        if self.state == SchedulerState::Stopped {
            return None;
        }
        self.state = SchedulerState::Stopped;
        self.exercise = None;
        self.position = None;
        self.paused_until = None;
        Some(Event::SchedulerStopped { at: Utc::now() })
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(Utc::now())
    }

    /// Pause indefinitely. Cancels any pending auto-resume.
    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.enter_pause(None, now)
    }

    /// Pause and auto-resume once `duration` has elapsed.
    pub fn pause_for(&mut self, duration: Duration, now: DateTime<Utc>) -> Option<Event> {
        self.enter_pause(Some(now + duration), now)
    }

    fn enter_pause(
        &mut self,
        until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        if self.state == SchedulerState::Stopped {
            return None;
        }
        self.state = SchedulerState::Paused;
        self.exercise = None;
        self.position = None;
        self.paused_until = until;
        info!(until = ?until, "scheduler paused");
        Some(Event::SchedulerPaused { until, at: now })
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(Utc::now())
    }

    /// Leave a pause with freshly drawn intervals.
    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != SchedulerState::Paused {
            return None;
        }
        self.paused_until = None;
        self.arm(now);
        self.state = SchedulerState::Running;
        info!("scheduler resumed");
        Some(Event::SchedulerResumed { at: now })
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(Utc::now())
    }

    /// Advance to `now`. Each timer fires at most once per call.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();

        if self.state == SchedulerState::Paused {
            match self.paused_until {
                Some(until) if now >= until => {
                    self.resume_at(now);
                    events.push(Event::PauseEnded { at: now });
                }
                _ => return events,
            }
        }

        if self.state != SchedulerState::Running {
            return events;
        }

        for kind in [TimerKind::Exercise, TimerKind::Position] {
            let Some(timer) = self.timer(kind).copied() else {
                continue;
            };
            if now < timer.due_at() {
                continue;
            }
            if let Some(event) = self.fire(kind, timer.interval_min, now) {
                events.push(event);
            }
            self.rearm(kind, now);
        }

        events
    }

    /// Pick an exercise cue immediately, leaving both timers untouched.
    pub fn trigger_now(&mut self) -> Option<Event> {
        self.trigger_now_at(Utc::now())
    }

    pub fn trigger_now_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let interval_min = self
            .exercise
            .map(|t| t.interval_min)
            .unwrap_or_else(|| self.settings.borrow().exercise.average());
        let settings = self.settings.borrow();
        let cue = select_exercise(&settings, self.last_exercise, &mut self.rng)?.clone();
        drop(settings);

        self.mark_shown(TimerKind::Exercise, cue.id);
        debug!(cue = %cue.title, "manual trigger");
        Some(Event::CueReady {
            cue,
            manual: true,
            timer: None,
            interval_min,
            at: now,
        })
    }

    /// Replace and persist the settings. A running scheduler restarts with
    /// fresh draws; otherwise the change applies at the next start or resume.
    pub fn update_settings(
        &mut self,
        settings: Settings,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>> {
        self.store.save_settings(&settings)?;
        *self.settings.borrow_mut() = settings;
        if self.state != SchedulerState::Running {
            return Ok(None);
        }
        self.stop();
        Ok(self.start_at(now))
    }

    /// Undo the last-shown bookkeeping for a `CueReady` the presentation
    /// layer refused, so the refused cue stays eligible for the next pick.
    pub fn cue_not_shown(&mut self, event: &Event) {
        let Event::CueReady { cue, timer, .. } = event else {
            return;
        };
        let kind = timer.unwrap_or(TimerKind::Exercise);
        let (last, prev) = match kind {
            TimerKind::Exercise => (&mut self.last_exercise, self.prev_exercise),
            TimerKind::Position => (&mut self.last_position, self.prev_position),
        };
        if *last == Some(cue.id) {
            *last = prev;
            debug!(cue = %cue.title, "cue not shown, pick rolled back");
        }
    }

    /// Record the user's new desk position and persist it.
    pub fn update_position(&mut self, position: DeskPosition, now: DateTime<Utc>) -> Result<Event> {
        let mut settings = self.settings.borrow_mut();
        settings.current_position = position;
        self.store.save_settings(&settings)?;
        Ok(Event::PositionChanged { position, at: now })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self, now: DateTime<Utc>) {
        self.rearm(TimerKind::Exercise, now);
        self.rearm(TimerKind::Position, now);
    }

    fn rearm(&mut self, kind: TimerKind, now: DateTime<Utc>) {
        let settings = self.settings.borrow();
        let interval_min = match kind {
            TimerKind::Exercise => settings.exercise.draw(&mut self.rng),
            TimerKind::Position => settings.position.draw(&mut self.rng),
        }
        .max(1);
        drop(settings);

        let timer = Some(CueTimer {
            interval_min,
            started_at: now,
        });
        match kind {
            TimerKind::Exercise => self.exercise = timer,
            TimerKind::Position => self.position = timer,
        }
        debug!(?kind, interval_min, "timer armed");
    }

    fn mark_shown(&mut self, kind: TimerKind, id: Uuid) {
        match kind {
            TimerKind::Exercise => {
                self.prev_exercise = self.last_exercise.replace(id);
            }
            TimerKind::Position => {
                self.prev_position = self.last_position.replace(id);
            }
        }
    }

    fn fire(&mut self, kind: TimerKind, interval_min: u32, now: DateTime<Utc>) -> Option<Event> {
        let settings = self.settings.borrow();
        let picked = match kind {
            TimerKind::Exercise => select_exercise(&settings, self.last_exercise, &mut self.rng),
            TimerKind::Position => {
                select_position_change(&settings, self.last_position, &mut self.rng)
            }
        };
        let Some(cue) = picked.cloned() else {
            debug!(?kind, "no eligible cues, skipping tick");
            return None;
        };
        drop(settings);

        self.mark_shown(kind, cue.id);
        info!(?kind, cue = %cue.title, "cue fired");
        Some(Event::CueReady {
            cue,
            manual: false,
            timer: Some(kind),
            interval_min,
            at: now,
        })
    }
}

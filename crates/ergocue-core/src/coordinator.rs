//! Cue lifecycle: one cue on screen at a time, resolved exactly once.
//!
//! ## State Transitions
//!
//! ```text
//! Shown -> Completed
//!       -> Dismissed
//!       -> TimedOut   (countdown reached zero while the user was active)
//! ```
//!
//! The countdown only advances while the [`ActivityProbe`] reports the user
//! as active; otherwise it is frozen. Like the scheduler, the coordinator
//! owns no threads: the event loop calls [`CueCoordinator::tick_countdown`]
//! once per second.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cue::{Cue, DeskPosition};
use crate::error::{CoreError, Result};
use crate::events::{BadgeNotice, Event};
use crate::leaderboard::{LeaderboardEntry, LeaderboardSink};
use crate::progression::ProgressionEngine;
use crate::settings::SharedSettings;
use crate::statistics::CueStatistic;
use crate::storage::Store;
use crate::xp::XpCalculator;

/// Seconds a cue stays on screen before timing out.
pub const COUNTDOWN_SECS: u32 = 300;

/// Input idle time after which the user counts as away.
pub const IDLE_AFTER_MINUTES: i64 = 5;

/// Reports whether someone is at the keyboard.
pub trait ActivityProbe {
    fn is_user_active(&self) -> bool;
}

/// Probe for environments without input tracking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActive;

impl ActivityProbe for AlwaysActive {
    fn is_user_active(&self) -> bool {
        true
    }
}

/// Active while the last recorded input is recent enough.
///
/// Clones share the same last-input instant, so the event loop can keep one
/// handle to record input while the coordinator owns another.
#[derive(Debug, Clone)]
pub struct IdleThreshold {
    last_input: Rc<Cell<DateTime<Utc>>>,
    threshold: Duration,
}

impl IdleThreshold {
    pub fn new(last_input: DateTime<Utc>) -> Self {
        Self::with_threshold(last_input, Duration::minutes(IDLE_AFTER_MINUTES))
    }

    pub fn with_threshold(last_input: DateTime<Utc>, threshold: Duration) -> Self {
        Self {
            last_input: Rc::new(Cell::new(last_input)),
            threshold,
        }
    }

    pub fn record_input(&self, at: DateTime<Utc>) {
        self.last_input.set(at);
    }

    pub fn last_input(&self) -> DateTime<Utc> {
        self.last_input.get()
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now - self.last_input.get() <= self.threshold
    }
}

impl ActivityProbe for IdleThreshold {
    fn is_user_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueOutcome {
    Completed,
    Dismissed,
    TimedOut,
}

/// Everything that changed when a cue was resolved.
#[derive(Debug, Clone)]
pub struct CueResolution {
    pub cue: Cue,
    pub outcome: CueOutcome,
    pub manual: bool,
    /// Signed XP change; zero for manual cues.
    pub xp_delta: i64,
    pub level_before: u32,
    pub level_after: u32,
    pub badges: Vec<BadgeNotice>,
    /// Set when a completed position-change cue moved the user.
    pub new_position: Option<DeskPosition>,
    /// The closed record; `None` for manual cues.
    pub statistic: Option<CueStatistic>,
    pub events: Vec<Event>,
}

impl CueResolution {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

#[derive(Debug, Clone)]
struct ActiveCue {
    cue: Cue,
    manual: bool,
    interval_min: u32,
    statistic: CueStatistic,
    remaining_secs: u32,
    frozen: bool,
}

pub struct CueCoordinator {
    settings: SharedSettings,
    store: Arc<dyn Store>,
    xp: XpCalculator,
    probe: Box<dyn ActivityProbe>,
    sink: Option<Box<dyn LeaderboardSink>>,
    countdown_secs: u32,
    active: Option<ActiveCue>,
}

impl CueCoordinator {
    pub fn new(settings: SharedSettings, store: Arc<dyn Store>) -> Self {
        Self {
            settings,
            store,
            xp: XpCalculator::new(),
            probe: Box::new(AlwaysActive),
            sink: None,
            countdown_secs: COUNTDOWN_SECS,
            active: None,
        }
    }

    pub fn with_xp_calculator(mut self, xp: XpCalculator) -> Self {
        self.xp = xp;
        self
    }

    pub fn with_activity_probe(mut self, probe: impl ActivityProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn with_leaderboard_sink(mut self, sink: impl LeaderboardSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn with_countdown(mut self, secs: u32) -> Self {
        self.countdown_secs = secs.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn active_cue(&self) -> Option<&Cue> {
        self.active.as_ref().map(|a| &a.cue)
    }

    pub fn is_showing(&self) -> bool {
        self.active.is_some()
    }

    /// Seconds left on the countdown of the cue on screen.
    pub fn remaining_secs(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.remaining_secs)
    }

    /// Whether the last countdown tick found the user inactive.
    pub fn is_frozen(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.frozen)
    }

    pub fn xp_calculator(&self) -> &XpCalculator {
        &self.xp
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Put a cue on screen and start its countdown.
    ///
    /// # Errors
    /// Returns [`CoreError::CueAlreadyActive`] if a cue is already showing.
    pub fn present(
        &mut self,
        cue: Cue,
        manual: bool,
        interval_min: u32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.active.is_some() {
            return Err(CoreError::CueAlreadyActive);
        }
        info!(cue = %cue.title, cue_type = %cue.cue_type, manual, "cue shown");
        self.active = Some(ActiveCue {
            statistic: CueStatistic::shown(&cue, now),
            cue,
            manual,
            interval_min,
            remaining_secs: self.countdown_secs,
            frozen: false,
        });
        Ok(())
    }

    /// Present the cue carried by a `CueReady` event; other events are ignored.
    ///
    /// Returns whether a cue was put on screen.
    pub fn accept(&mut self, event: &Event) -> Result<bool> {
        match event {
            Event::CueReady {
                cue,
                manual,
                interval_min,
                at,
                ..
            } => {
                self.present(cue.clone(), *manual, *interval_min, *at)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn tick_countdown(&mut self) -> Option<CueResolution> {
        self.tick_countdown_at(Utc::now())
    }

    /// Advance the countdown by one second if the user is active.
    ///
    /// Returns the resolution when the countdown runs out.
    pub fn tick_countdown_at(&mut self, now: DateTime<Utc>) -> Option<CueResolution> {
        let active_user = self.probe.is_user_active();
        let active = self.active.as_mut()?;

        if !active_user {
            if !active.frozen {
                debug!(remaining = active.remaining_secs, "countdown frozen");
            }
            active.frozen = true;
            return None;
        }

        active.frozen = false;
        active.remaining_secs = active.remaining_secs.saturating_sub(1);
        if active.remaining_secs > 0 {
            return None;
        }
        self.resolve(CueOutcome::TimedOut, now)
    }

    pub fn complete(&mut self) -> Result<CueResolution> {
        self.complete_at(Utc::now())
    }

    /// The user did the cue.
    ///
    /// # Errors
    /// Returns [`CoreError::NoActiveCue`] if nothing is showing.
    pub fn complete_at(&mut self, now: DateTime<Utc>) -> Result<CueResolution> {
        self.resolve(CueOutcome::Completed, now)
            .ok_or(CoreError::NoActiveCue)
    }

    pub fn dismiss(&mut self) -> Result<CueResolution> {
        self.dismiss_at(Utc::now())
    }

    /// The user skipped the cue.
    ///
    /// # Errors
    /// Returns [`CoreError::NoActiveCue`] if nothing is showing.
    pub fn dismiss_at(&mut self, now: DateTime<Utc>) -> Result<CueResolution> {
        self.resolve(CueOutcome::Dismissed, now)
            .ok_or(CoreError::NoActiveCue)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn resolve(&mut self, outcome: CueOutcome, now: DateTime<Utc>) -> Option<CueResolution> {
        let ActiveCue {
            cue,
            manual,
            interval_min,
            statistic,
            ..
        } = self.active.take()?;
        let completed = outcome == CueOutcome::Completed;
        let engine = ProgressionEngine::with_config(self.settings.borrow().progression.clone());

        let mut settings = self.settings.borrow_mut();
        let level_before = settings.progress.level;
        let mut xp_delta = 0;
        let mut badges = Vec::new();
        let mut closed = None;

        if !manual {
            let record = if completed {
                statistic.complete(now)
            } else {
                statistic.dismiss(now)
            };
            if let Err(e) = self.store.append_statistic(record.clone()) {
                warn!(error = %e, "failed to record statistic");
            }
            closed = Some(record);

            xp_delta = self.xp.xp_delta(cue.cue_type, interval_min, completed);
            let magnitude = u32::try_from(xp_delta.unsigned_abs()).unwrap_or(u32::MAX);
            if completed {
                engine.add_xp(&mut settings.progress, magnitude);
                engine.increment_streak(&mut settings.progress);
            } else {
                engine.remove_xp(&mut settings.progress, magnitude);
                engine.break_streak(&mut settings.progress);
            }
            badges = engine
                .check_and_unlock_badges(&mut settings.progress)
                .into_iter()
                .map(BadgeNotice::from)
                .collect();
        }

        let new_position = if completed {
            cue.cue_type.target_position()
        } else {
            None
        };
        if let Some(position) = new_position {
            settings.current_position = position;
        }

        if !manual || new_position.is_some() {
            if let Err(e) = self.store.save_settings(&settings) {
                warn!(error = %e, "failed to persist settings");
            }
        }

        let level_after = settings.progress.level;
        let entry = (!manual && settings.identity.can_publish()).then(|| {
            LeaderboardEntry::snapshot(
                &settings.identity,
                &settings.progress,
                &self.store.load_statistics(),
                now,
            )
        });
        drop(settings);

        if let (Some(sink), Some(entry)) = (&self.sink, entry) {
            sink.publish(entry);
        }

        let mut events = vec![match outcome {
            CueOutcome::Completed => Event::CueCompleted {
                cue_id: cue.id,
                xp_delta,
                at: now,
            },
            CueOutcome::Dismissed => Event::CueDismissed {
                cue_id: cue.id,
                xp_delta,
                at: now,
            },
            CueOutcome::TimedOut => Event::CueTimedOut {
                cue_id: cue.id,
                xp_delta,
                streak_broken: !manual,
                at: now,
            },
        }];
        if let Some(position) = new_position {
            events.push(Event::PositionChanged { position, at: now });
        }
        if level_after > level_before {
            events.push(Event::LevelUp {
                level: level_after,
                at: now,
            });
        }
        if !badges.is_empty() {
            events.push(Event::BadgesUnlocked {
                badges: badges.clone(),
                at: now,
            });
        }

        info!(cue = %cue.title, ?outcome, manual, xp_delta, level = level_after, "cue resolved");
        Some(CueResolution {
            cue,
            outcome,
            manual,
            xp_delta,
            level_before,
            level_after,
            badges,
            new_position,
            statistic: closed,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::CueType;
    use crate::settings::Settings;
    use crate::storage::MemoryStore;
    use std::cell::RefCell;

    struct Toggle(Rc<Cell<bool>>);

    impl ActivityProbe for Toggle {
        fn is_user_active(&self) -> bool {
            self.0.get()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Rc<RefCell<Vec<LeaderboardEntry>>>);

    impl LeaderboardSink for RecordingSink {
        fn publish(&self, entry: LeaderboardEntry) {
            self.0.borrow_mut().push(entry);
        }
    }

    fn setup(settings: Settings) -> (SharedSettings, Arc<MemoryStore>, CueCoordinator) {
        let shared = settings.into_shared();
        let store = Arc::new(MemoryStore::new());
        let coordinator = CueCoordinator::new(shared.clone(), store.clone());
        (shared, store, coordinator)
    }

    #[test]
    fn only_one_cue_at_a_time() {
        let (_, _, mut c) = setup(Settings::default());
        let now = Utc::now();
        let cue = Cue::new(CueType::SittingStretch, "Neck", "");
        c.present(cue.clone(), false, 30, now).unwrap();
        assert!(matches!(
            c.present(cue, false, 30, now),
            Err(CoreError::CueAlreadyActive)
        ));
    }

    #[test]
    fn resolving_without_cue_is_an_error() {
        let (_, _, mut c) = setup(Settings::default());
        assert!(matches!(c.complete_at(Utc::now()), Err(CoreError::NoActiveCue)));
        assert!(matches!(c.dismiss_at(Utc::now()), Err(CoreError::NoActiveCue)));
        assert!(c.tick_countdown_at(Utc::now()).is_none());
    }

    #[test]
    fn completion_awards_xp_and_streak() {
        let (shared, store, mut c) = setup(Settings::default());
        let now = Utc::now();
        c.present(Cue::new(CueType::StandingStretch, "Reach", ""), false, 30, now)
            .unwrap();
        let res = c.complete_at(now).unwrap();

        assert_eq!(res.outcome, CueOutcome::Completed);
        assert_eq!(res.xp_delta, 25);
        let progress = shared.borrow().progress.clone();
        assert_eq!(progress.current_xp, 25);
        assert_eq!(progress.current_streak, 1);
        assert!(progress.has_badge("First Step"));
        assert_eq!(store.load_statistics().len(), 1);
        assert!(store.load_statistics()[0].completed);
        assert_eq!(store.saved_settings().unwrap().progress.current_xp, 25);
        assert!(!c.is_showing());
    }

    #[test]
    fn completed_position_cue_moves_user() {
        let (shared, _, mut c) = setup(Settings::default());
        let now = Utc::now();
        c.present(Cue::new(CueType::DeskStanding, "Stand", ""), false, 60, now)
            .unwrap();
        let res = c.complete_at(now).unwrap();
        assert_eq!(res.new_position, Some(DeskPosition::Standing));
        assert_eq!(shared.borrow().current_position, DeskPosition::Standing);
        assert!(res
            .events
            .iter()
            .any(|e| matches!(e, Event::PositionChanged { position: DeskPosition::Standing, .. })));
    }

    #[test]
    fn manual_cues_skip_statistics_and_xp() {
        let (shared, store, mut c) = setup(Settings::default());
        let now = Utc::now();
        c.present(Cue::new(CueType::FloorStretch, "Hip", ""), true, 30, now)
            .unwrap();
        let res = c.complete_at(now).unwrap();
        assert_eq!(res.xp_delta, 0);
        assert!(res.statistic.is_none());
        assert!(res.badges.is_empty());
        assert!(store.load_statistics().is_empty());
        assert_eq!(shared.borrow().progress.current_streak, 0);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn level_up_is_reported() {
        let mut settings = Settings::default();
        settings.progress.current_xp = 490;
        let (_, _, mut c) = setup(settings);
        let now = Utc::now();
        c.present(Cue::new(CueType::SittingStretch, "Neck", ""), false, 30, now)
            .unwrap();
        let res = c.complete_at(now).unwrap();
        assert!(res.leveled_up());
        assert_eq!(res.level_after, 2);
        assert!(res
            .events
            .iter()
            .any(|e| matches!(e, Event::LevelUp { level: 2, .. })));
    }

    #[test]
    fn countdown_freezes_while_inactive() {
        let active = Rc::new(Cell::new(true));
        let (_, _, c) = setup(Settings::default());
        let mut c = c
            .with_activity_probe(Toggle(active.clone()))
            .with_countdown(3);
        let now = Utc::now();
        c.present(Cue::new(CueType::SittingStretch, "Neck", ""), false, 30, now)
            .unwrap();

        assert!(c.tick_countdown_at(now).is_none());
        assert_eq!(c.remaining_secs(), Some(2));

        active.set(false);
        for _ in 0..10 {
            assert!(c.tick_countdown_at(now).is_none());
        }
        assert!(c.is_frozen());
        assert_eq!(c.remaining_secs(), Some(2));

        active.set(true);
        assert!(c.tick_countdown_at(now).is_none());
        assert!(!c.is_frozen());
        let res = c.tick_countdown_at(now).unwrap();
        assert_eq!(res.outcome, CueOutcome::TimedOut);
        assert!(matches!(
            res.events[0],
            Event::CueTimedOut { streak_broken: true, .. }
        ));
    }

    #[test]
    fn timeout_scores_like_dismissal() {
        let mut settings = Settings::default();
        settings.progress.current_xp = 100;
        settings.progress.current_streak = 3;
        let (shared, store, c) = setup(settings);
        let mut c = c.with_countdown(1);
        let now = Utc::now();
        c.present(Cue::new(CueType::StandingStretch, "Reach", ""), false, 30, now)
            .unwrap();
        let res = c.tick_countdown_at(now).unwrap();
        assert_eq!(res.xp_delta, -12);
        let progress = shared.borrow().progress.clone();
        assert_eq!(progress.current_xp, 88);
        assert_eq!(progress.current_streak, 0);
        assert_eq!(progress.current_negative_streak, 1);
        assert!(!store.load_statistics()[0].completed);
    }

    #[test]
    fn publishes_only_when_opted_in() {
        let sink = RecordingSink::default();
        let (shared, _, c) = setup(Settings::default());
        let mut c = c.with_leaderboard_sink(sink.clone());
        let now = Utc::now();

        c.present(Cue::new(CueType::SittingStretch, "Neck", ""), false, 30, now)
            .unwrap();
        c.complete_at(now).unwrap();
        assert!(sink.0.borrow().is_empty());

        {
            let mut s = shared.borrow_mut();
            s.identity.leaderboard_enabled = true;
            s.identity.username = "desk-hero".into();
        }
        c.present(Cue::new(CueType::SittingStretch, "Neck", ""), false, 30, now)
            .unwrap();
        c.dismiss_at(now).unwrap();

        let published = sink.0.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].username, "desk-hero");
        assert_eq!(published[0].completed_cues, 1);
        assert_eq!(published[0].dismissed_cues, 1);
    }

    #[test]
    fn accepts_cue_ready_events() {
        let (_, _, mut c) = setup(Settings::default());
        let now = Utc::now();
        assert!(!c.accept(&Event::SchedulerStopped { at: now }).unwrap());
        let event = Event::CueReady {
            cue: Cue::new(CueType::DeskSitting, "Sit", ""),
            manual: false,
            timer: None,
            interval_min: 90,
            at: now,
        };
        assert!(c.accept(&event).unwrap());
        assert_eq!(c.active_cue().map(|c| c.title.as_str()), Some("Sit"));
        assert!(c.accept(&event).is_err());
    }

    #[test]
    fn idle_threshold_tracks_last_input() {
        let start = Utc::now();
        let probe = IdleThreshold::new(start);
        let handle = probe.clone();
        assert!(probe.is_active_at(start + Duration::minutes(4)));
        assert!(!probe.is_active_at(start + Duration::minutes(6)));
        handle.record_input(start + Duration::minutes(6));
        assert!(probe.is_active_at(start + Duration::minutes(7)));
    }
}

//! Foreground event loop.
//!
//! Ticks the scheduler and the cue countdown once per second and reads one
//! command per stdin line. Every event is printed to stdout as a JSON line.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use ergocue_core::scheduler::pause_duration;
use ergocue_core::{
    AlwaysActive, CoreError, CueCoordinator, CueScheduler, DeskPosition, Event, IdleThreshold,
    LeaderboardClient, SharedSettings, Store, TokioLeaderboardSink,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::{open_store, CliResult};

#[derive(Args)]
pub struct RunArgs {
    /// Seed for reproducible interval draws and cue picks
    #[arg(long)]
    seed: Option<u64>,
    /// Minutes without input after which the cue countdown freezes.
    /// Only stdin commands count as input.
    #[arg(long, default_value_t = 5)]
    idle_minutes: i64,
    /// Never freeze the cue countdown, so unanswered cues time out
    #[arg(long)]
    always_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineCommand {
    Complete,
    Dismiss,
    Trigger,
    Pause(Option<u32>),
    Resume,
    Position(DeskPosition),
    Status,
    Set(String, String),
    Reload,
    Quit,
}

impl FromStr for LineCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();
        match command.as_str() {
            "complete" | "done" => Ok(Self::Complete),
            "dismiss" | "skip" => Ok(Self::Dismiss),
            "trigger" => Ok(Self::Trigger),
            "pause" => match arg {
                Some(m) => m
                    .parse()
                    .map(|m| Self::Pause(Some(m)))
                    .map_err(|_| format!("invalid pause minutes: {m}")),
                None => Ok(Self::Pause(None)),
            },
            "resume" => Ok(Self::Resume),
            "position" => arg
                .ok_or_else(|| "usage: position <standing|sitting|floor>".to_string())?
                .parse()
                .map(Self::Position),
            "status" => Ok(Self::Status),
            "set" => {
                let usage = || "usage: set <key> <value>".to_string();
                let key = arg.ok_or_else(usage)?;
                let value = words.collect::<Vec<_>>().join(" ");
                if value.is_empty() {
                    return Err(usage());
                }
                Ok(Self::Set(key.to_string(), value))
            }
            "reload" => Ok(Self::Reload),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

pub fn run(args: RunArgs) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(event_loop(args))
}

fn emit(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn emit_all(events: &[Event]) -> CliResult {
    events.iter().try_for_each(emit)
}

/// Hand a scheduler event to the coordinator and print it if it was accepted.
fn dispatch(
    scheduler: &mut CueScheduler,
    coordinator: &mut CueCoordinator,
    event: &Event,
) -> CliResult {
    match coordinator.accept(event) {
        Ok(_) => emit(event),
        Err(CoreError::CueAlreadyActive) => {
            warn!("cue already on screen, dropping new cue");
            scheduler.cue_not_shown(event);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Build the coordinator. Unless `--always-active` is given, the countdown
/// follows `input`, which the loop feeds with every stdin command.
fn build_coordinator(
    args: &RunArgs,
    settings: SharedSettings,
    store: Arc<dyn Store>,
    input: &IdleThreshold,
) -> CueCoordinator {
    let coordinator = CueCoordinator::new(settings, store);
    if args.always_active {
        coordinator.with_activity_probe(AlwaysActive)
    } else {
        coordinator.with_activity_probe(input.clone())
    }
}

async fn event_loop(args: RunArgs) -> CliResult {
    let store = open_store()?;
    let settings = store.load_settings();

    let sink = match settings.identity.leaderboard_url.as_deref() {
        Some(url) => match LeaderboardClient::new(url) {
            Ok(client) => Some(TokioLeaderboardSink::new(
                client,
                tokio::runtime::Handle::current(),
            )),
            Err(e) => {
                warn!(error = %e, "leaderboard disabled");
                None
            }
        },
        None => None,
    };

    let shared = settings.into_shared();
    let mut scheduler = match args.seed {
        Some(seed) => CueScheduler::with_seed(shared.clone(), store.clone(), seed),
        None => CueScheduler::new(shared.clone(), store.clone()),
    };
    let input =
        IdleThreshold::with_threshold(Utc::now(), Duration::minutes(args.idle_minutes.max(1)));
    let mut coordinator = build_coordinator(&args, shared.clone(), store.clone(), &input);
    if let Some(sink) = sink {
        coordinator = coordinator.with_leaderboard_sink(sink);
    }

    if let Some(event) = scheduler.start_at(Utc::now()) {
        emit(&event)?;
    }

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Utc::now();
                if let Some(resolution) = coordinator.tick_countdown_at(now) {
                    emit_all(&resolution.events)?;
                }
                for event in scheduler.tick_at(now) {
                    dispatch(&mut scheduler, &mut coordinator, &event)?;
                }
            }
            segment = lines.next_segment(), if stdin_open => {
                let bytes = match segment {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => {
                        info!("stdin closed, continuing without commands");
                        stdin_open = false;
                        continue;
                    }
                    Err(e) => {
                        warn!(error = %e, "stdin unreadable, continuing without commands");
                        stdin_open = false;
                        continue;
                    }
                };
                let line = String::from_utf8_lossy(&bytes);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let now = Utc::now();
                input.record_input(now);
                match line.parse::<LineCommand>() {
                    Ok(LineCommand::Quit) => break,
                    Ok(command) => {
                        let result =
                            handle(command, &*store, &mut scheduler, &mut coordinator, now);
                        if let Err(e) = result {
                            eprintln!("error: {e}");
                        }
                    }
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if let Some(event) = scheduler.stop() {
        emit(&event)?;
    }
    Ok(())
}

fn handle(
    command: LineCommand,
    store: &dyn Store,
    scheduler: &mut CueScheduler,
    coordinator: &mut CueCoordinator,
    now: DateTime<Utc>,
) -> CliResult {
    match command {
        LineCommand::Complete => emit_all(&coordinator.complete_at(now)?.events)?,
        LineCommand::Dismiss => emit_all(&coordinator.dismiss_at(now)?.events)?,
        LineCommand::Trigger => match scheduler.trigger_now_at(now) {
            Some(event) => dispatch(scheduler, coordinator, &event)?,
            None => return Err("no enabled exercise cues".into()),
        },
        LineCommand::Pause(minutes) => {
            let event = match minutes {
                Some(m) => scheduler.pause_for(pause_duration(m)?, now),
                None => scheduler.pause_at(now),
            };
            if let Some(event) = event {
                emit(&event)?;
            }
        }
        LineCommand::Resume => {
            if let Some(event) = scheduler.resume_at(now) {
                emit(&event)?;
            }
        }
        LineCommand::Position(position) => emit(&scheduler.update_position(position, now)?)?,
        LineCommand::Status => emit(&scheduler.snapshot(now, coordinator.remaining_secs()))?,
        LineCommand::Set(key, value) => {
            let mut edited = scheduler.settings().borrow().clone();
            edited.set(&key, &value)?;
            if let Some(event) = scheduler.update_settings(edited, now)? {
                emit(&event)?;
            }
        }
        LineCommand::Reload => {
            // Progress is owned by this loop; everything else comes from disk.
            let mut reloaded = store.load_settings();
            reloaded.validate()?;
            reloaded.progress = scheduler.settings().borrow().progress.clone();
            if let Some(event) = scheduler.update_settings(reloaded, now)? {
                emit(&event)?;
            }
        }
        LineCommand::Quit => {}
    }
    Ok(())
}

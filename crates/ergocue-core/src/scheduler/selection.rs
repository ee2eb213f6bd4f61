//! Which cue to show when a timer fires.
//!
//! Both categories exclude the cue shown last unless that would leave nothing
//! to pick, then choose uniformly among the rest.

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::cue::Cue;
use crate::settings::Settings;

/// Enabled exercise cues suited to the current desk position.
///
/// The position filter applies only while the current position is marked
/// available and has at least one enabled exercise; otherwise every enabled
/// exercise is a candidate.
pub fn exercise_candidates(settings: &Settings) -> Vec<&Cue> {
    let exercises: Vec<&Cue> = settings
        .cues
        .iter()
        .filter(|c| c.enabled && c.cue_type.is_exercise())
        .collect();

    let current = settings.current_position;
    if !settings.available_positions.is_available(current) {
        return exercises;
    }

    let matching: Vec<&Cue> = exercises
        .iter()
        .copied()
        .filter(|c| c.cue_type.position() == current)
        .collect();
    if matching.is_empty() {
        exercises
    } else {
        matching
    }
}

/// Enabled position-change cues whose target position is available.
pub fn position_candidates(settings: &Settings) -> Vec<&Cue> {
    settings
        .cues
        .iter()
        .filter(|c| c.enabled)
        .filter(|c| {
            c.cue_type
                .target_position()
                .is_some_and(|p| settings.available_positions.is_available(p))
        })
        .collect()
}

pub fn select_exercise<'a, R: Rng + ?Sized>(
    settings: &'a Settings,
    last_shown: Option<Uuid>,
    rng: &mut R,
) -> Option<&'a Cue> {
    pick_avoiding(exercise_candidates(settings), last_shown, rng)
}

pub fn select_position_change<'a, R: Rng + ?Sized>(
    settings: &'a Settings,
    last_shown: Option<Uuid>,
    rng: &mut R,
) -> Option<&'a Cue> {
    pick_avoiding(position_candidates(settings), last_shown, rng)
}

fn pick_avoiding<'a, R: Rng + ?Sized>(
    candidates: Vec<&'a Cue>,
    last_shown: Option<Uuid>,
    rng: &mut R,
) -> Option<&'a Cue> {
    let fresh: Vec<&Cue> = match last_shown {
        Some(last) => candidates.iter().copied().filter(|c| c.id != last).collect(),
        None => Vec::new(),
    };
    let pool = if fresh.is_empty() { &candidates } else { &fresh };
    pool.choose(rng).copied()
}

//! Application settings.
//!
//! One `Settings` value exists per process. The application shell owns it and
//! hands a [`SharedSettings`] handle to the scheduler and coordinator, which
//! all run on the same event-loop thread.
//!
//! Stored as JSON at `<data dir>/settings.json`, see [`crate::storage`].

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cue::{default_cues, Cue, CueType, DeskPosition};
use crate::error::{ConfigError, IntervalKind, ValidationError};
use crate::progression::{ProgressionConfig, UserProgress};

/// Single-thread shared handle to the process-wide settings.
pub type SharedSettings = Rc<RefCell<Settings>>;

/// Interval bounds for one of the two cue timers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSettings {
    pub min_minutes: u32,
    pub max_minutes: u32,
    #[serde(default = "default_true")]
    pub randomize: bool,
}

impl IntervalSettings {
    pub fn new(min_minutes: u32, max_minutes: u32, randomize: bool) -> Self {
        Self {
            min_minutes,
            max_minutes,
            randomize,
        }
    }

    pub fn fixed(minutes: u32) -> Self {
        Self::new(minutes, minutes, false)
    }

    /// Uniform in `[min, max]` when randomized, otherwise `min`.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.randomize && self.max_minutes > self.min_minutes {
            rng.gen_range(self.min_minutes..=self.max_minutes)
        } else {
            self.min_minutes
        }
    }

    /// Midpoint of the bounds, used for XP previews.
    pub fn average(&self) -> u32 {
        if self.randomize {
            (self.min_minutes + self.max_minutes.max(self.min_minutes)) / 2
        } else {
            self.min_minutes
        }
    }

    fn validate(&self, kind: IntervalKind) -> Result<(), ValidationError> {
        if self.min_minutes < 1 {
            return Err(ValidationError::MinimumInterval(kind));
        }
        if self.randomize && self.max_minutes < self.min_minutes {
            return Err(ValidationError::MaximumBelowMinimum(kind));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAvailability {
    #[serde(default = "default_true")]
    pub standing: bool,
    #[serde(default = "default_true")]
    pub sitting: bool,
    #[serde(default = "default_true")]
    pub floor: bool,
}

impl PositionAvailability {
    pub fn is_available(&self, position: DeskPosition) -> bool {
        match position {
            DeskPosition::Standing => self.standing,
            DeskPosition::Sitting => self.sitting,
            DeskPosition::Floor => self.floor,
        }
    }
}

impl Default for PositionAvailability {
    fn default() -> Self {
        Self {
            standing: true,
            sitting: true,
            floor: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub leaderboard_enabled: bool,
    /// Base URL of the remote leaderboard store; sync is off when unset.
    #[serde(default)]
    pub leaderboard_url: Option<String>,
}

impl UserIdentity {
    pub fn can_publish(&self) -> bool {
        self.leaderboard_enabled && !self.username.trim().is_empty()
    }
}

impl Default for UserIdentity {
    fn default() -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            username: String::new(),
            leaderboard_enabled: false,
            leaderboard_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_exercise")]
    pub exercise: IntervalSettings,
    #[serde(default = "default_position")]
    pub position: IntervalSettings,
    #[serde(default)]
    pub available_positions: PositionAvailability,
    #[serde(default = "default_current_position")]
    pub current_position: DeskPosition,
    #[serde(default = "default_cues")]
    pub cues: Vec<Cue>,
    #[serde(default)]
    pub progress: UserProgress,
    #[serde(default)]
    pub identity: UserIdentity,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub progression: ProgressionConfig,
}

fn default_true() -> bool {
    true
}
fn default_exercise() -> IntervalSettings {
    IntervalSettings::new(30, 45, true)
}
fn default_position() -> IntervalSettings {
    IntervalSettings::new(60, 120, true)
}
fn default_current_position() -> DeskPosition {
    DeskPosition::Sitting
}
fn default_language() -> String {
    "auto".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exercise: default_exercise(),
            position: default_position(),
            available_positions: PositionAvailability::default(),
            current_position: default_current_position(),
            cues: default_cues(),
            progress: UserProgress::default(),
            identity: UserIdentity::default(),
            language: default_language(),
            progression: ProgressionConfig::default(),
        }
    }
}

impl Settings {
    pub fn into_shared(self) -> SharedSettings {
        Rc::new(RefCell::new(self))
    }

    /// Check everything the settings dialog would reject.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.exercise.validate(IntervalKind::Exercise)?;
        self.position.validate(IntervalKind::Position)?;
        if self.identity.leaderboard_enabled && self.identity.username.trim().is_empty() {
            return Err(ValidationError::UsernameRequired);
        }
        if self.progression.xp_per_level == 0 {
            return Err(ValidationError::XpPerLevel);
        }
        if self.progression.max_level < 1 {
            return Err(ValidationError::MaxLevel);
        }
        Ok(())
    }

    /// Interval bounds governing cues of this type.
    pub fn intervals_for(&self, cue_type: CueType) -> &IntervalSettings {
        if cue_type.is_position_change() {
            &self.position
        } else {
            &self.exercise
        }
    }

    // ── Cue list ─────────────────────────────────────────────────────

    pub fn find_cue(&self, id: Uuid) -> Option<&Cue> {
        self.cues.iter().find(|c| c.id == id)
    }

    pub fn add_cue(&mut self, cue: Cue) -> Result<Uuid, ValidationError> {
        if cue.title.trim().is_empty() {
            return Err(ValidationError::EmptyCueTitle);
        }
        let id = cue.id;
        self.cues.push(cue);
        Ok(id)
    }

    pub fn remove_cue(&mut self, id: Uuid) -> Result<Cue, ValidationError> {
        let idx = self
            .cues
            .iter()
            .position(|c| c.id == id)
            .ok_or(ValidationError::UnknownCue(id))?;
        Ok(self.cues.remove(idx))
    }

    pub fn set_cue_enabled(&mut self, id: Uuid, enabled: bool) -> Result<(), ValidationError> {
        let cue = self
            .cues
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ValidationError::UnknownCue(id))?;
        cue.enabled = enabled;
        Ok(())
    }

    /// Replace every cue with the factory set. Returns the new count.
    pub fn reset_cues(&mut self) -> usize {
        self.cues = default_cues();
        self.cues.len()
    }

    // ── Dot-path access ──────────────────────────────────────────────

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(e.to_string()))?,
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Get a value as string by dot-separated key, e.g. `exercise.min_minutes`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. The edit is applied only if the
    /// resulting settings still validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the key's type, or the edited settings fail validation.
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let edited: Settings = serde_json::from_value(json).map_err(|e| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        edited.validate()?;
        *self = edited;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    #[test]
    fn default_settings_validate() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.exercise, IntervalSettings::new(30, 45, true));
        assert_eq!(s.position, IntervalSettings::new(60, 120, true));
        assert_eq!(s.current_position, DeskPosition::Sitting);
        assert_eq!(s.language, "auto");
    }

    #[test]
    fn draw_stays_within_bounds() {
        let mut rng = Mcg128Xsl64::seed_from_u64(7);
        let interval = IntervalSettings::new(10, 12, true);
        for _ in 0..200 {
            let m = interval.draw(&mut rng);
            assert!((10..=12).contains(&m));
        }
        assert_eq!(IntervalSettings::new(10, 50, false).draw(&mut rng), 10);
    }

    #[test]
    fn validation_rejects_bad_intervals() {
        let mut s = Settings::default();
        s.exercise.min_minutes = 0;
        assert_eq!(
            s.validate(),
            Err(ValidationError::MinimumInterval(IntervalKind::Exercise))
        );

        let mut s = Settings::default();
        s.position = IntervalSettings::new(60, 30, true);
        assert_eq!(
            s.validate(),
            Err(ValidationError::MaximumBelowMinimum(IntervalKind::Position))
        );

        // Fixed intervals ignore the maximum.
        s.position.randomize = false;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn leaderboard_requires_username() {
        let mut s = Settings::default();
        s.identity.leaderboard_enabled = true;
        s.identity.username = "   ".into();
        assert_eq!(s.validate(), Err(ValidationError::UsernameRequired));
        s.identity.username = "ana".into();
        assert!(s.validate().is_ok());
        assert!(s.identity.can_publish());
    }

    #[test]
    fn dot_path_get_and_set() {
        let mut s = Settings::default();
        assert_eq!(s.get("exercise.min_minutes").as_deref(), Some("30"));
        assert_eq!(s.get("available_positions.floor").as_deref(), Some("true"));
        assert!(s.get("exercise.nope").is_none());

        s.set("exercise.max_minutes", "50").unwrap();
        assert_eq!(s.exercise.max_minutes, 50);
        s.set("current_position", "floor").unwrap();
        assert_eq!(s.current_position, DeskPosition::Floor);
    }

    #[test]
    fn set_rejects_unknown_keys_and_invalid_edits() {
        let mut s = Settings::default();
        assert!(matches!(
            s.set("exercise.bogus", "1"),
            Err(crate::CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(matches!(
            s.set("exercise.randomize", "maybe"),
            Err(crate::CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            s.set("exercise.max_minutes", "5"),
            Err(crate::CoreError::Validation(
                ValidationError::MaximumBelowMinimum(IntervalKind::Exercise)
            ))
        ));
        // Rejected edits leave settings untouched.
        assert_eq!(s.exercise.max_minutes, 45);
    }

    #[test]
    fn progression_limits_are_validated() {
        let mut s = Settings::default();
        assert!(matches!(
            s.set("progression.max_level", "0"),
            Err(crate::CoreError::Validation(ValidationError::MaxLevel))
        ));
        assert!(matches!(
            s.set("progression.xp_per_level", "0"),
            Err(crate::CoreError::Validation(ValidationError::XpPerLevel))
        ));
        assert_eq!(s.progression, ProgressionConfig::default());

        s.set("progression.xp_per_level", "250").unwrap();
        assert_eq!(s.progression.xp_per_level, 250);
    }

    #[test]
    fn cue_list_edits() {
        let mut s = Settings::default();
        let before = s.cues.len();
        let id = s
            .add_cue(Cue::new(CueType::FloorStretch, "Cobra", "Press up gently"))
            .unwrap();
        assert_eq!(s.cues.len(), before + 1);
        s.set_cue_enabled(id, false).unwrap();
        assert!(!s.find_cue(id).unwrap().enabled);
        assert_eq!(s.remove_cue(id).unwrap().title, "Cobra");
        assert!(s.remove_cue(id).is_err());
        assert!(s.add_cue(Cue::new(CueType::FloorStretch, " ", "")).is_err());
        assert_eq!(s.reset_cues(), before);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{"current_position":"standing"}"#).unwrap();
        assert_eq!(s.current_position, DeskPosition::Standing);
        assert_eq!(s.exercise.min_minutes, 30);
        assert!(!s.cues.is_empty());
        assert_eq!(s.progress.level, 1);
    }
}

//! Core error types for ergocue-core.
//!
//! Nothing in the scheduling or progression path is fatal: these errors
//! surface at the edges (settings edits, storage, explicit leaderboard
//! fetches, and coordinator misuse by the presentation layer).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ergocue-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors raised at the settings-edit boundary
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Leaderboard errors (only surfaced for explicit fetches)
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),

    /// The coordinator already has a cue on screen
    #[error("A cue is already being shown")]
    CueAlreadyActive,

    /// A complete/dismiss command arrived with nothing on screen
    #[error("No cue is currently being shown")]
    NoActiveCue,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to save configuration
    #[error("Failed to save {what} to {path}: {message}")]
    SaveFailed {
        what: &'static str,
        path: PathBuf,
        message: String,
    },

    /// Unknown dot-path key
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    /// Value could not be parsed into the key's type
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Which of the two interval pairs a validation message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalKind {
    Exercise,
    Position,
}

impl std::fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntervalKind::Exercise => f.write_str("exercise"),
            IntervalKind::Position => f.write_str("position"),
        }
    }
}

/// Validation errors. The messages are shown to the user verbatim.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid minimum {0} interval (at least 1 minute).")]
    MinimumInterval(IntervalKind),

    #[error("Maximum {0} interval must be greater than or equal to minimum interval.")]
    MaximumBelowMinimum(IntervalKind),

    #[error("Please enter a username to enable the leaderboard.")]
    UsernameRequired,

    #[error("Please enter a duration greater than 0")]
    EmptyPause,

    #[error("Maximum pause duration is 8 hours")]
    PauseTooLong,

    #[error("Cue title must not be empty")]
    EmptyCueTitle,

    #[error("No cue with id {0}")]
    UnknownCue(uuid::Uuid),

    #[error("XP per level must be at least 1")]
    XpPerLevel,

    #[error("Maximum level must be at least 1")]
    MaxLevel,
}

/// Leaderboard errors.
#[derive(Error, Debug)]
pub enum LeaderboardError {
    /// Transport failure or non-success status
    #[error("Unable to reach the leaderboard. Please check your internet connection.")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The leaderboard base URL is malformed
    #[error("Invalid leaderboard URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Opted out, or no username
    #[error("Leaderboard is disabled")]
    Disabled,
}

impl From<reqwest::Error> for LeaderboardError {
    fn from(err: reqwest::Error) -> Self {
        LeaderboardError::Unavailable(Box::new(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_interval() {
        assert_eq!(
            ValidationError::MinimumInterval(IntervalKind::Exercise).to_string(),
            "Please enter a valid minimum exercise interval (at least 1 minute)."
        );
        assert_eq!(
            ValidationError::MaximumBelowMinimum(IntervalKind::Position).to_string(),
            "Maximum position interval must be greater than or equal to minimum interval."
        );
    }

    #[test]
    fn leaderboard_errors_surface_generic_message() {
        let err = LeaderboardError::Unavailable("connection refused".into());
        let core: CoreError = err.into();
        assert_eq!(
            core.to_string(),
            "Unable to reach the leaderboard. Please check your internet connection."
        );
    }
}

//! Error types.
//!
//! Only genuinely exceptional situations are errors here: malformed input
//! text, unreadable configuration files, and explicit edits that reference
//! things that do not exist. Rule outcomes (rejected moves, batch
//! violations) are plain values; see [`crate::editing`] and
//! [`crate::validation`].

use thiserror::Error;

use crate::validation::ValidationError;

/// A `"HH:MM"` string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time of day '{input}': {reason}")]
pub struct TimeParseError {
    /// The rejected input.
    pub input: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

impl TimeParseError {
    pub(crate) fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Tournament configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid tournament configuration: {}", summarize(.0))]
    Invalid(Vec<ValidationError>),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// An explicit schedule edit could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("game '{0}' not found")]
    GameNotFound(String),

    #[error("referee '{0}' not found")]
    RefereeNotFound(String),

    #[error("referee '{referee_id}' is affiliated with a team playing in game '{game_id}'")]
    RefereeIneligible {
        referee_id: String,
        game_id: String,
    },
}

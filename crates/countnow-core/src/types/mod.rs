//! # Core Type Definitions
//!
//! This module contains the shared types for the CountNow core:
//! - Subject identifiers (`SubjectId`)
//! - Players and their tallies (`Player`)
//! - Semantic counter events (`CounterEvent`)
//! - The consumer callback interface (`CounterSink`)
//! - Error types (`CountNowError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they key a `BTreeMap`
//! - Use saturating arithmetic for counters to prevent overflow

use crate::primitives::MAX_NAME_LENGTH;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// SUBJECT IDENTIFIER
// =============================================================================

/// Identifier of the counter a control is bound to (usually a player id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub String);

impl SubjectId {
    /// Create a new subject id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// PLAYER
// =============================================================================

/// A participant on the scoreboard together with their current tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: SubjectId,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub count: u32,
}

impl Player {
    /// Create a player with a zero tally.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        emoji: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: SubjectId::new(id),
            name: name.into(),
            emoji: emoji.into(),
            color: color.into(),
            count: 0,
        }
    }

    /// Label shown in logs and results: `"<emoji> <name>"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }
}

/// Validate and normalize a display name.
///
/// Names are trimmed; empty names and names longer than `MAX_NAME_LENGTH`
/// characters are rejected.
pub fn normalize_name(raw: &str) -> Result<String, CountNowError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CountNowError::InvalidInput("name must not be empty".to_string()));
    }
    let chars = trimmed.chars().count();
    if chars > MAX_NAME_LENGTH {
        return Err(CountNowError::InvalidInput(format!(
            "name length {} exceeds maximum {} characters",
            chars, MAX_NAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// COUNTER EVENTS
// =============================================================================

/// Semantic output of a counter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterEvent {
    Increment,
    Decrement,
}

impl CounterEvent {
    /// Signed change this event applies to a tally.
    #[must_use]
    pub const fn delta(self) -> i32 {
        match self {
            Self::Increment => 1,
            Self::Decrement => -1,
        }
    }
}

/// Consumer of counter events.
///
/// Controls invoke these synchronously as soon as they decide an event
/// occurred. The implementor owns the actual tally and is responsible for
/// mutating and persisting it; `current_count` lets the decrement control
/// skip requests that would go below zero.
pub trait CounterSink {
    /// One increment for `subject`.
    fn on_increment(&mut self, subject: &SubjectId);

    /// One decrement for `subject`. Implementors clamp at zero.
    fn on_decrement(&mut self, subject: &SubjectId);

    /// Current tally for `subject` (0 when unknown).
    fn current_count(&self, subject: &SubjectId) -> u32;
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the CountNow core.
///
/// Input handling (gestures, timers) is infallible; these cover record
/// validation and storage only.
#[derive(Debug, Error)]
pub enum CountNowError {
    /// A record or request failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested record does not exist (or is not visible to the caller).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The record already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_label_joins_emoji_and_name() {
        let player = Player::new("mom", "Mom", "👩", "#FF8A80");
        assert_eq!(player.label(), "👩 Mom");
        assert_eq!(player.count, 0);
    }

    #[test]
    fn normalize_name_trims() {
        assert_eq!(normalize_name("  Dad ").expect("valid"), "Dad");
    }

    #[test]
    fn normalize_name_rejects_blank() {
        assert!(matches!(
            normalize_name("   "),
            Err(CountNowError::InvalidInput(_))
        ));
    }

    #[test]
    fn normalize_name_counts_characters_not_bytes() {
        let name = "할".repeat(MAX_NAME_LENGTH);
        assert!(normalize_name(&name).is_ok());
        let too_long = "할".repeat(MAX_NAME_LENGTH + 1);
        assert!(normalize_name(&too_long).is_err());
    }

    #[test]
    fn counter_event_delta() {
        assert_eq!(CounterEvent::Increment.delta(), 1);
        assert_eq!(CounterEvent::Decrement.delta(), -1);
    }
}

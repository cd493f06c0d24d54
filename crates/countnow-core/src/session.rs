//! # Sessions
//!
//! Saved count sessions and the device-local recent history.
//!
//! A session is either a single free-running counter (`Solo`) or a room of
//! players (`Multi`). Rows wrap a session with creation and update stamps in
//! unix milliseconds; upserting by code keeps `created_at` and refreshes
//! `updated_at`.

use crate::primitives::{MAX_PLAYERS, MAX_SESSIONS, MAX_TITLE_LENGTH};
use crate::types::{CountNowError, Player};
use serde::{Deserialize, Serialize};

// =============================================================================
// SESSION
// =============================================================================

/// What a session counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBody {
    Solo { count: u32 },
    Multi { players: Vec<Player> },
}

/// A saved count, keyed by its room code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSession {
    pub code: String,
    pub title: Option<String>,
    pub body: SessionBody,
}

impl CountSession {
    #[must_use]
    pub fn solo(code: impl Into<String>, title: Option<String>, count: u32) -> Self {
        Self {
            code: code.into(),
            title,
            body: SessionBody::Solo { count },
        }
    }

    #[must_use]
    pub fn multi(code: impl Into<String>, title: Option<String>, players: Vec<Player>) -> Self {
        Self {
            code: code.into(),
            title,
            body: SessionBody::Multi { players },
        }
    }

    /// `"solo"` or `"multi"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self.body {
            SessionBody::Solo { .. } => "solo",
            SessionBody::Multi { .. } => "multi",
        }
    }

    /// Solo count, or the sum of all player tallies.
    #[must_use]
    pub fn total(&self) -> u64 {
        match &self.body {
            SessionBody::Solo { count } => u64::from(*count),
            SessionBody::Multi { players } => players.iter().map(|p| u64::from(p.count)).sum(),
        }
    }

    /// Players of a multi session, empty for solo.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        match &self.body {
            SessionBody::Solo { .. } => &[],
            SessionBody::Multi { players } => players,
        }
    }

    /// Check code, title and roster limits. Blank titles become `None`.
    pub fn validate(mut self) -> Result<Self, CountNowError> {
        if self.code.trim().is_empty() {
            return Err(CountNowError::InvalidInput("session code must not be empty".to_string()));
        }
        self.title = match self.title.take() {
            Some(t) if t.trim().is_empty() => None,
            Some(t) => {
                let t = t.trim().to_string();
                if t.chars().count() > MAX_TITLE_LENGTH {
                    return Err(CountNowError::InvalidInput(format!(
                        "title exceeds maximum {} characters",
                        MAX_TITLE_LENGTH
                    )));
                }
                Some(t)
            }
            None => None,
        };
        if let SessionBody::Multi { players } = &self.body {
            if players.is_empty() {
                return Err(CountNowError::InvalidInput(
                    "a multi session needs at least one player".to_string(),
                ));
            }
            if players.len() > MAX_PLAYERS {
                return Err(CountNowError::InvalidInput(format!(
                    "a session holds at most {} players",
                    MAX_PLAYERS
                )));
            }
            for (i, p) in players.iter().enumerate() {
                if players[..i].iter().any(|q| q.id == p.id) {
                    return Err(CountNowError::InvalidInput(format!(
                        "duplicate player id: {}",
                        p.id
                    )));
                }
            }
        }
        Ok(self)
    }
}

// =============================================================================
// STORED ROW
// =============================================================================

/// A session with its persistence stamps (unix ms).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRow {
    pub session: CountSession,
    pub created_at: u64,
    pub updated_at: u64,
}

impl SessionRow {
    /// Build the row that replaces `previous` (if any) at `now_ms`.
    #[must_use]
    pub fn upsert(previous: Option<&SessionRow>, session: CountSession, now_ms: u64) -> Self {
        Self {
            session,
            created_at: previous.map(|p| p.created_at).unwrap_or(now_ms),
            updated_at: now_ms,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.session.code
    }
}

/// Order rows newest-updated first and keep the most recent `MAX_SESSIONS`.
///
/// Ties on `updated_at` fall back to code order so the listing is stable.
#[must_use]
pub fn most_recent(mut rows: Vec<SessionRow>) -> Vec<SessionRow> {
    rows.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.session.code.cmp(&b.session.code))
    });
    rows.truncate(MAX_SESSIONS);
    rows
}

// =============================================================================
// RECENT HISTORY
// =============================================================================

/// Device-local history of the last sessions, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSessions {
    entries: Vec<SessionRow>,
}

impl RecentSessions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[SessionRow] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&SessionRow> {
        self.entries.iter().find(|r| r.code() == code)
    }

    /// Replace the row with the same code in place, or insert at the front.
    /// The history is then trimmed to `MAX_SESSIONS`.
    pub fn upsert(&mut self, session: CountSession, now_ms: u64) -> &SessionRow {
        let index = match self.entries.iter().position(|r| r.code() == session.code) {
            Some(i) => {
                self.entries[i] = SessionRow::upsert(Some(&self.entries[i]), session, now_ms);
                i
            }
            None => {
                self.entries.insert(0, SessionRow::upsert(None, session, now_ms));
                0
            }
        };
        self.entries.truncate(MAX_SESSIONS);
        &self.entries[index.min(self.entries.len() - 1)]
    }

    /// Remove by code. Returns whether a row was removed.
    pub fn delete(&mut self, code: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|r| r.code() != code);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// CHANGE FEED
// =============================================================================

/// Kind of change published for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Upserted,
    Deleted,
}

/// One change to a stored session, as seen by realtime subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    pub code: String,
    pub kind: ChangeKind,
    /// The new row for upserts, `None` for deletes.
    pub row: Option<SessionRow>,
}

impl SessionChange {
    #[must_use]
    pub fn upserted(row: SessionRow) -> Self {
        Self {
            code: row.session.code.clone(),
            kind: ChangeKind::Upserted,
            row: Some(row),
        }
    }

    #[must_use]
    pub fn deleted(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind: ChangeKind::Deleted,
            row: None,
        }
    }

    /// Whether a subscriber watching `code` should see this change.
    #[must_use]
    pub fn concerns(&self, code: &str) -> bool {
        self.code == code
    }
}

// =============================================================================
// TESTS
// =============================================================================

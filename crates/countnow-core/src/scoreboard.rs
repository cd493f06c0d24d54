//! # Scoreboard
//!
//! The consumer side of the counter callbacks: per-player tallies plus the
//! log of applied changes.
//!
//! - Increments saturate; decrements clamp at zero.
//! - A decrement on a zero tally changes nothing and logs nothing.
//! - The log is newest-first and stamped with elapsed game time (`MM:SS`),
//!   which the host advances with [`Scoreboard::set_elapsed`].

use crate::countdown::format_clock;
use crate::primitives::COLLAPSED_LOG_ENTRIES;
use crate::ranking::{RankedResult, rank};
use crate::types::{CounterEvent, CounterSink, Player, SubjectId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// One applied tally change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub subject: SubjectId,
    pub label: String,
    pub delta: i32,
    pub timestamp: String,
}

/// Players, tallies and change log for one game.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    players: Vec<Player>,
    log: VecDeque<LogEntry>,
    next_entry: u64,
    elapsed: Duration,
}

impl Scoreboard {
    /// Create a scoreboard. Tallies are kept as given.
    #[must_use]
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            players,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player(&self, id: &SubjectId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Tally for `id`, 0 for unknown players.
    #[must_use]
    pub fn count(&self, id: &SubjectId) -> u32 {
        self.player(id).map(|p| p.count).unwrap_or(0)
    }

    /// Sum of all tallies.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.players.iter().map(|p| u64::from(p.count)).sum()
    }

    /// Set the elapsed game time used to stamp new log entries.
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Apply one event to `id`. Returns whether anything changed.
    pub fn apply(&mut self, id: &SubjectId, event: CounterEvent) -> bool {
        let Some(player) = self.players.iter_mut().find(|p| &p.id == id) else {
            tracing::debug!(subject = %id, "event for unknown player dropped");
            return false;
        };
        match event {
            CounterEvent::Increment => player.count = player.count.saturating_add(1),
            CounterEvent::Decrement => {
                if player.count == 0 {
                    return false;
                }
                player.count -= 1;
            }
        }
        let entry = LogEntry {
            id: self.next_entry,
            subject: player.id.clone(),
            label: player.label(),
            delta: event.delta(),
            timestamp: format_clock(self.elapsed.as_secs()),
        };
        self.next_entry = self.next_entry.saturating_add(1);
        self.log.push_front(entry);
        true
    }

    /// Full change log, newest first.
    #[must_use]
    pub fn log(&self) -> &VecDeque<LogEntry> {
        &self.log
    }

    /// Log entries to display: all when expanded, the latest few otherwise.
    pub fn visible_log(&self, expanded: bool) -> impl Iterator<Item = &LogEntry> {
        let take = if expanded {
            self.log.len()
        } else {
            COLLAPSED_LOG_ENTRIES
        };
        self.log.iter().take(take)
    }

    /// Play again: zero every tally and clear the log.
    pub fn reset(&mut self) {
        for player in &mut self.players {
            player.count = 0;
        }
        self.log.clear();
        self.elapsed = Duration::ZERO;
    }

    /// Ranked results for the current tallies.
    #[must_use]
    pub fn results(&self) -> Vec<RankedResult> {
        rank(&self.players)
    }

    /// Consume the scoreboard, returning the players with their tallies.
    #[must_use]
    pub fn into_players(self) -> Vec<Player> {
        self.players
    }
}

impl CounterSink for Scoreboard {
    fn on_increment(&mut self, subject: &SubjectId) {
        self.apply(subject, CounterEvent::Increment);
    }

    fn on_decrement(&mut self, subject: &SubjectId) {
        self.apply(subject, CounterEvent::Decrement);
    }

    fn current_count(&self, subject: &SubjectId) -> u32 {
        self.count(subject)
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # Countdown
//!
//! Game timer driven by a one-second repeating timer.
//!
//! - A zero-length countdown means "no limit": it never runs and never
//!   completes.
//! - Completion is reported exactly once; the ticker is released at that
//!   point.
//! - Pausing releases the ticker; resuming starts a fresh one, so a partial
//!   second is dropped.

use crate::primitives::{COUNTDOWN_TICK, WARNING_SECONDS};
use crate::scheduler::{Scheduler, TimerId};
use serde::{Deserialize, Serialize};

/// Format seconds as `MM:SS`.
#[must_use]
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownEvent {
    Tick { remaining: u32 },
    Completed,
}

#[derive(Debug)]
pub struct Countdown {
    total: u32,
    remaining: u32,
    paused: bool,
    completed: bool,
    ticker: Option<TimerId>,
}

impl Countdown {
    #[must_use]
    pub fn new(total_secs: u32) -> Self {
        Self {
            total: total_secs,
            remaining: total_secs,
            paused: false,
            completed: false,
            ticker: None,
        }
    }

    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.total == 0
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Last-seconds warning state.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.remaining > 0 && self.remaining <= WARNING_SECONDS
    }

    /// Remaining time as `MM:SS`.
    #[must_use]
    pub fn display(&self) -> String {
        format_clock(u64::from(self.remaining))
    }

    /// Start ticking. No-op when unlimited, paused, completed or already running.
    pub fn start(&mut self, sched: &mut impl Scheduler) {
        if self.is_unlimited() || self.paused || self.completed || self.ticker.is_some() {
            return;
        }
        self.ticker = Some(sched.schedule_repeating(COUNTDOWN_TICK));
    }

    /// Toggle pause. Returns the new paused state.
    pub fn toggle_pause(&mut self, sched: &mut impl Scheduler) -> bool {
        if self.paused {
            self.paused = false;
            self.start(sched);
        } else {
            self.paused = true;
            self.release(sched);
        }
        self.paused
    }

    /// Restore the full time and start again.
    pub fn reset(&mut self, sched: &mut impl Scheduler) {
        self.release(sched);
        self.remaining = self.total;
        self.paused = false;
        self.completed = false;
        self.start(sched);
    }

    /// Release the ticker on teardown.
    pub fn stop(&mut self, sched: &mut impl Scheduler) {
        self.release(sched);
    }

    /// A timer fired. Returns `None` for timers this countdown does not hold.
    pub fn on_timer(&mut self, id: TimerId, sched: &mut impl Scheduler) -> Option<CountdownEvent> {
        if self.ticker != Some(id) {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.release(sched);
            self.completed = true;
            tracing::info!(total = self.total, "countdown completed");
            return Some(CountdownEvent::Completed);
        }
        Some(CountdownEvent::Tick {
            remaining: self.remaining,
        })
    }

    fn release(&mut self, sched: &mut impl Scheduler) {
        if let Some(id) = self.ticker.take() {
            sched.cancel(id);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

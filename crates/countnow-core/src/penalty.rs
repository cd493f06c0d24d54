//! # Penalty Roulette
//!
//! After the results screen the group can draw a random penalty. A spin
//! flips through the list every [`PENALTY_FRAME_INTERVAL`] and settles after
//! [`PENALTY_SPIN_DURATION`] on the entry chosen by caller-supplied entropy.

use crate::primitives::{PENALTY_FRAME_INTERVAL, PENALTY_SPIN_DURATION};
use crate::scheduler::{Scheduler, TimerId};
use serde::Serialize;

pub const PENALTIES: [&str; 10] = [
    "Fetch everyone a glass of water 💧",
    "Dance for 10 seconds 💃",
    "Do your cutest impression 😘",
    "Sing one line of a song 🎤",
    "Five push-ups 💪",
    "Wink three times 😉",
    "Take a deep bow 🙇",
    "Show off a hidden talent 🎭",
    "Cook a quick snack 🍳",
    "On cleanup duty 🧹",
];

/// Pick a penalty directly from entropy.
#[must_use]
pub fn draw(entropy: u64) -> &'static str {
    PENALTIES[(entropy % PENALTIES.len() as u64) as usize]
}

/// What a spin timer produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinEvent {
    Frame(&'static str),
    Settled(&'static str),
}

#[derive(Debug, Default)]
pub struct PenaltyWheel {
    frame_ticker: Option<TimerId>,
    stop_timer: Option<TimerId>,
    frame: usize,
    pick: u64,
    display: Option<&'static str>,
    selected: Option<&'static str>,
}

impl PenaltyWheel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_spinning(&self) -> bool {
        self.stop_timer.is_some()
    }

    /// Entry currently shown, `None` before the first frame.
    #[must_use]
    pub fn display(&self) -> Option<&'static str> {
        self.display
    }

    /// Final penalty of the last completed spin.
    #[must_use]
    pub fn selected(&self) -> Option<&'static str> {
        self.selected
    }

    /// Start a spin. Ignored (returns `false`) while a spin is running.
    pub fn spin(&mut self, sched: &mut impl Scheduler, entropy: u64) -> bool {
        if self.is_spinning() {
            return false;
        }
        self.frame = 0;
        self.pick = entropy;
        self.display = None;
        self.selected = None;
        self.frame_ticker = Some(sched.schedule_repeating(PENALTY_FRAME_INTERVAL));
        self.stop_timer = Some(sched.schedule_once(PENALTY_SPIN_DURATION));
        true
    }

    /// A timer fired. Returns `None` for timers this wheel does not hold.
    pub fn on_timer(&mut self, id: TimerId, sched: &mut impl Scheduler) -> Option<SpinEvent> {
        if self.stop_timer == Some(id) {
            self.release(sched);
            let chosen = draw(self.pick);
            self.display = Some(chosen);
            self.selected = Some(chosen);
            return Some(SpinEvent::Settled(chosen));
        }
        if self.frame_ticker == Some(id) {
            let shown = PENALTIES[self.frame % PENALTIES.len()];
            self.frame = self.frame.wrapping_add(1);
            self.display = Some(shown);
            return Some(SpinEvent::Frame(shown));
        }
        None
    }

    /// Abandon a spin on close.
    pub fn stop(&mut self, sched: &mut impl Scheduler) {
        self.release(sched);
    }

    fn release(&mut self, sched: &mut impl Scheduler) {
        if let Some(id) = self.frame_ticker.take() {
            sched.cancel(id);
        }
        if let Some(id) = self.stop_timer.take() {
            sched.cancel(id);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use std::time::Duration;

    #[test]
    fn spin_cycles_then_settles_on_pick() {
        let mut sched = ManualScheduler::new();
        let mut wheel = PenaltyWheel::new();
        assert!(wheel.spin(&mut sched, 13));

        let mut frames = 0;
        let mut settled = None;
        sched.run_until(Duration::from_secs(5), |s, id| match wheel.on_timer(id, s) {
            Some(SpinEvent::Frame(_)) => frames += 1,
            Some(SpinEvent::Settled(p)) => settled = Some(p),
            None => {}
        });

        // the ticker was allocated first, so its 2000 ms frame precedes the stop
        assert_eq!(frames, 20);
        assert_eq!(settled, Some(PENALTIES[3]));
        assert_eq!(wheel.selected(), Some(PENALTIES[3]));
        assert!(!wheel.is_spinning());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn respin_is_ignored_while_spinning() {
        let mut sched = ManualScheduler::new();
        let mut wheel = PenaltyWheel::new();
        assert!(wheel.spin(&mut sched, 0));
        assert!(!wheel.spin(&mut sched, 1));
        assert_eq!(sched.pending(), 2);
    }

    #[test]
    fn first_frames_walk_the_list() {
        let mut sched = ManualScheduler::new();
        let mut wheel = PenaltyWheel::new();
        wheel.spin(&mut sched, 0);
        sched.run_until(Duration::from_millis(200), |s, id| {
            wheel.on_timer(id, s);
        });
        assert_eq!(wheel.display(), Some(PENALTIES[1]));
        assert!(wheel.selected().is_none());
    }

    #[test]
    fn draw_wraps_entropy() {
        assert_eq!(draw(10), PENALTIES[0]);
        assert_eq!(draw(u64::MAX), PENALTIES[(u64::MAX % 10) as usize]);
    }
}

//! # Scheduler
//!
//! The host scheduling primitive consumed by every time-driven component:
//! "run once after N" and "run repeatedly every N", each returning a handle
//! that can be canceled.
//!
//! Components never block and never read a wall clock. They ask the
//! scheduler for timers and react when the host reports a firing through
//! their own `on_timer(id, ..)` entry point. Ids that the component no
//! longer holds are ignored, so a cancel is effective immediately even if
//! the host already queued the callback.
//!
//! `ManualScheduler` is a deterministic virtual clock used by tests and by
//! the CLI replay command.

use std::collections::BTreeMap;
use std::time::Duration;

/// Smallest period a repeating timer may have.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a scheduled timer.
///
/// Ids are allocated monotonically and never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Host scheduling primitive.
pub trait Scheduler {
    /// Current time on this scheduler's clock.
    fn now(&self) -> Duration;

    /// Fire once after `delay`.
    fn schedule_once(&mut self, delay: Duration) -> TimerId;

    /// Fire every `interval`, first firing one interval from now.
    fn schedule_repeating(&mut self, interval: Duration) -> TimerId;

    /// Cancel a timer. Unknown or already-finished ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    deadline: Duration,
    period: Option<Duration>,
}

/// Deterministic virtual-time scheduler.
///
/// Time only moves inside [`ManualScheduler::run_until`], which fires due
/// timers one at a time in `(deadline, id)` order. The callback receives the
/// scheduler itself, so dispatched handlers may schedule or cancel timers;
/// a timer canceled during dispatch never fires afterward.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, PendingTimer>,
}

impl ManualScheduler {
    /// Create a scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Check whether a timer is still live.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Earliest deadline among live timers.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.values().map(|t| t.deadline).min()
    }

    /// Advance the clock to `until`, firing every timer due on the way.
    ///
    /// Returns the number of firings dispatched.
    pub fn run_until(
        &mut self,
        until: Duration,
        mut on_fire: impl FnMut(&mut Self, TimerId),
    ) -> usize {
        let mut fired = 0;
        while let Some(id) = self.pop_due(until) {
            fired += 1;
            on_fire(self, id);
        }
        if until > self.now {
            self.now = until;
        }
        fired
    }

    /// Advance the clock by `by`, firing every timer due on the way.
    pub fn advance(&mut self, by: Duration, on_fire: impl FnMut(&mut Self, TimerId)) -> usize {
        let until = self.now.saturating_add(by);
        self.run_until(until, on_fire)
    }

    fn allocate(&mut self, timer: PendingTimer) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.timers.insert(id, timer);
        id
    }

    /// Remove (or re-arm) the earliest timer due at or before `until`.
    fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        let (id, deadline) = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= until)
            .min_by_key(|(id, t)| (t.deadline, **id))
            .map(|(id, t)| (*id, t.deadline))?;

        if deadline > self.now {
            self.now = deadline;
        }

        match self.timers.get(&id).and_then(|t| t.period) {
            Some(period) => {
                if let Some(timer) = self.timers.get_mut(&id) {
                    timer.deadline = deadline.saturating_add(period);
                }
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some(id)
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        let deadline = self.now.saturating_add(delay);
        self.allocate(PendingTimer {
            deadline,
            period: None,
        })
    }

    fn schedule_repeating(&mut self, interval: Duration) -> TimerId {
        let period = interval.max(MIN_PERIOD);
        let deadline = self.now.saturating_add(period);
        self.allocate(PendingTimer {
            deadline,
            period: Some(period),
        })
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let mut sched = ManualScheduler::new();
        let id = sched.schedule_once(ms(500));

        let mut fired = Vec::new();
        sched.run_until(ms(499), |s, t| fired.push((s.now(), t)));
        assert!(fired.is_empty());

        sched.run_until(ms(2000), |s, t| fired.push((s.now(), t)));
        assert_eq!(fired, vec![(ms(500), id)]);
        assert!(!sched.is_pending(id));
        assert_eq!(sched.now(), ms(2000));
    }

    #[test]
    fn repeating_rearms_by_one_period() {
        let mut sched = ManualScheduler::new();
        let id = sched.schedule_repeating(ms(200));

        let mut times = Vec::new();
        sched.run_until(ms(1000), |s, _| times.push(s.now()));
        assert_eq!(times, vec![ms(200), ms(400), ms(600), ms(800), ms(1000)]);
        assert!(sched.is_pending(id));
    }

    #[test]
    fn cancel_during_dispatch_stops_later_firings() {
        let mut sched = ManualScheduler::new();
        let ticker = sched.schedule_repeating(ms(100));
        let stopper = sched.schedule_once(ms(250));

        let mut ticks = 0;
        sched.run_until(ms(1000), |s, id| {
            if id == ticker {
                ticks += 1;
            } else if id == stopper {
                s.cancel(ticker);
            }
        });
        assert_eq!(ticks, 2);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn timers_scheduled_during_dispatch_start_from_dispatch_time() {
        let mut sched = ManualScheduler::new();
        let first = sched.schedule_once(ms(500));

        let mut fired = Vec::new();
        sched.run_until(ms(1000), |s, id| {
            fired.push((s.now(), id));
            if id == first {
                s.schedule_repeating(ms(200));
            }
        });
        let times: Vec<_> = fired.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![ms(500), ms(700), ms(900)]);
    }

    #[test]
    fn equal_deadlines_fire_in_allocation_order() {
        let mut sched = ManualScheduler::new();
        let a = sched.schedule_once(ms(100));
        let b = sched.schedule_once(ms(100));

        let mut order = Vec::new();
        sched.run_until(ms(100), |_, id| order.push(id));
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut sched = ManualScheduler::new();
        sched.schedule_repeating(Duration::ZERO);
        let fired = sched.run_until(ms(5), |_, _| {});
        assert_eq!(fired, 5);
    }

    #[test]
    fn cancel_unknown_id_is_noop() {
        let mut sched = ManualScheduler::new();
        sched.cancel(TimerId(42));
        assert_eq!(sched.pending(), 0);
    }
}

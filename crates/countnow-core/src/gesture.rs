//! # Press-Repeat Gesture Recognizer
//!
//! Classifies a press/release cycle on a counter control as a **tap**
//! (one increment, emitted at release) or a **hold** (one increment when the
//! hold threshold elapses, then one per repeat interval until release).
//!
//! ## State
//!
//! The state is derived from the two timer slots the recognizer owns:
//!
//! | hold timer | repeat timer | state                   |
//! |------------|--------------|-------------------------|
//! | empty      | empty        | `Idle`                  |
//! | armed      | empty        | `ArmedWaitingThreshold` |
//! | empty      | armed        | `Repeating`             |
//!
//! At most one of the slots is ever filled. Every path back to `Idle`
//! cancels both slots before returning.
//!
//! One recognizer exists per rendered counter. Instances share nothing; a
//! page-hidden broadcast is delivered to each of them independently.

use crate::primitives::{HOLD_THRESHOLD, REPEAT_INTERVAL};
use crate::scheduler::{Scheduler, TimerId};
use crate::types::{CounterSink, SubjectId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

/// Observable recognizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    Idle,
    ArmedWaitingThreshold,
    Repeating,
}

/// Timing parameters of a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureTiming {
    pub hold_threshold: Duration,
    pub repeat_interval: Duration,
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self {
            hold_threshold: HOLD_THRESHOLD,
            repeat_interval: REPEAT_INTERVAL,
        }
    }
}

/// Per-control press-repeat state machine.
#[derive(Debug)]
pub struct PressRepeatRecognizer {
    subject: SubjectId,
    timing: GestureTiming,
    hold_timer: Option<TimerId>,
    repeat_timer: Option<TimerId>,
}

impl PressRepeatRecognizer {
    /// Create an idle recognizer with the default timing.
    #[must_use]
    pub fn new(subject: SubjectId) -> Self {
        Self::with_timing(subject, GestureTiming::default())
    }

    /// Create an idle recognizer with custom timing.
    #[must_use]
    pub fn with_timing(subject: SubjectId, timing: GestureTiming) -> Self {
        Self {
            subject,
            timing,
            hold_timer: None,
            repeat_timer: None,
        }
    }

    /// The counter this recognizer drives.
    #[must_use]
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    #[must_use]
    pub fn timing(&self) -> GestureTiming {
        self.timing
    }

    /// Current state, derived from the timer slots.
    #[must_use]
    pub fn state(&self) -> GestureState {
        match (self.hold_timer, self.repeat_timer) {
            (Some(_), _) => GestureState::ArmedWaitingThreshold,
            (None, Some(_)) => GestureState::Repeating,
            (None, None) => GestureState::Idle,
        }
    }

    /// Check whether `id` is one of the timers this recognizer holds.
    #[must_use]
    pub fn owns_timer(&self, id: TimerId) -> bool {
        self.hold_timer == Some(id) || self.repeat_timer == Some(id)
    }

    /// Press started.
    ///
    /// Arms the hold timer unless a timer or interval is already pending, in
    /// which case the duplicate start is ignored. Returns `true` if this call
    /// armed the recognizer.
    pub fn on_press_start(&mut self, sched: &mut impl Scheduler) -> bool {
        if self.hold_timer.is_some() || self.repeat_timer.is_some() {
            trace!(subject = %self.subject, "duplicate press start ignored");
            return false;
        }
        self.hold_timer = Some(sched.schedule_once(self.timing.hold_threshold));
        trace!(subject = %self.subject, "armed");
        true
    }

    /// Press released.
    ///
    /// - `ArmedWaitingThreshold`: this was a tap, emit exactly one increment.
    /// - `Repeating`: stop; the repeats already fired, emit nothing.
    /// - `Idle`: nothing to do.
    pub fn on_press_end(&mut self, sched: &mut impl Scheduler, sink: &mut impl CounterSink) {
        let was = self.state();
        self.clear(sched);
        match was {
            GestureState::ArmedWaitingThreshold => {
                debug!(subject = %self.subject, "tap");
                sink.on_increment(&self.subject);
            }
            GestureState::Repeating => {
                debug!(subject = %self.subject, "hold released");
            }
            GestureState::Idle => {}
        }
    }

    /// Press canceled (leave, cancel, page hidden).
    ///
    /// Unconditionally returns to `Idle` without a final increment. Safe to
    /// call any number of times.
    pub fn on_press_cancel(&mut self, sched: &mut impl Scheduler) {
        if self.state() != GestureState::Idle {
            debug!(subject = %self.subject, state = ?self.state(), "press canceled");
        }
        self.clear(sched);
    }

    /// Release every timer on unmount.
    pub fn teardown(&mut self, sched: &mut impl Scheduler) {
        self.clear(sched);
    }

    /// A timer fired.
    ///
    /// Firings of timers this recognizer no longer holds are ignored.
    pub fn on_timer(
        &mut self,
        id: TimerId,
        sched: &mut impl Scheduler,
        sink: &mut impl CounterSink,
    ) {
        if self.hold_timer == Some(id) {
            self.hold_timer = None;
            self.repeat_timer = Some(sched.schedule_repeating(self.timing.repeat_interval));
            debug!(subject = %self.subject, "hold threshold reached");
            sink.on_increment(&self.subject);
        } else if self.repeat_timer == Some(id) {
            trace!(subject = %self.subject, "repeat");
            sink.on_increment(&self.subject);
        }
    }

    fn clear(&mut self, sched: &mut impl Scheduler) {
        if let Some(id) = self.hold_timer.take() {
            sched.cancel(id);
        }
        if let Some(id) = self.repeat_timer.take() {
            sched.cancel(id);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

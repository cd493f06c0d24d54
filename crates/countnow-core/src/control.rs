//! # Counter Control
//!
//! The input boundary in front of a [`PressRepeatRecognizer`].
//!
//! Hosts deliver raw input from whichever event models they have (mouse,
//! touch, pointer); the control folds them into the three press signals the
//! recognizer understands and routes the separate decrement region on its
//! own path.
//!
//! ## Mapping
//!
//! | raw input                         | effect                                  |
//! |-----------------------------------|-----------------------------------------|
//! | down on `Press`                   | press start                             |
//! | down on `Decrement`               | decrement request (never a press start) |
//! | up (any model)                    | press end                               |
//! | leave / cancel / move outside     | press cancel                            |
//! | document up                       | press cancel (silent stop)              |
//! | page hidden                       | press cancel                            |
//!
//! ## Gesture ownership
//!
//! The first down of a gesture owns it; downs from other models are ignored
//! until the gesture ends. The decrement region sits outside that rule and
//! stays available while a press is armed or repeating. A release while a
//! decrement is held is credited to the decrement first. After a touch or pointer gesture ends, mouse downs
//! are ignored for [`GHOST_MOUSE_WINDOW`] because browsers synthesize
//! compatibility mouse events for the same physical tap.
//!
//! Hosts must deliver a control's own `Up` before the `DocumentUp` for the
//! same release.

use crate::gesture::{GestureState, GestureTiming, PressRepeatRecognizer};
use crate::primitives::GHOST_MOUSE_WINDOW;
use crate::scheduler::{Scheduler, TimerId};
use crate::types::{CounterSink, SubjectId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// Input event model a raw event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputModel {
    Mouse,
    Touch,
    Pointer,
}

/// Hit region of a counter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Main area: tap or hold to increment.
    Press,
    /// Separate decrement button.
    Decrement,
}

/// Raw input as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawInput {
    Down { model: InputModel, region: Region },
    Up { model: InputModel },
    Move { model: InputModel, inside: bool },
    Leave { model: InputModel },
    Cancel { model: InputModel },
    /// Release observed by the page-level listener.
    DocumentUp,
    /// The page lost visibility.
    PageHidden,
}

/// Abstract press signal fed to the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressSignal {
    Start,
    End,
    Cancel,
}

/// What a control did with one raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Forwarded to the recognizer.
    Press(PressSignal),
    /// Routed to the decrement path (applied only when the count is above zero).
    Decrement { applied: bool },
    /// Dropped (duplicate start, ghost mouse event, move inside).
    Ignored,
}

/// A counter control: one recognizer plus its input boundary.
#[derive(Debug)]
pub struct CounterControl {
    recognizer: PressRepeatRecognizer,
    /// Model that owns the press in progress.
    active: Option<InputModel>,
    /// Model holding the decrement region down.
    decrement: Option<InputModel>,
    /// Mouse downs before this instant are treated as synthesized.
    ghost_until: Option<Duration>,
}

impl CounterControl {
    #[must_use]
    pub fn new(subject: SubjectId) -> Self {
        Self::with_timing(subject, GestureTiming::default())
    }

    #[must_use]
    pub fn with_timing(subject: SubjectId, timing: GestureTiming) -> Self {
        Self {
            recognizer: PressRepeatRecognizer::with_timing(subject, timing),
            active: None,
            decrement: None,
            ghost_until: None,
        }
    }

    #[must_use]
    pub fn subject(&self) -> &SubjectId {
        self.recognizer.subject()
    }

    #[must_use]
    pub fn state(&self) -> GestureState {
        self.recognizer.state()
    }

    /// Check whether a timer firing belongs to this control.
    #[must_use]
    pub fn owns_timer(&self, id: TimerId) -> bool {
        self.recognizer.owns_timer(id)
    }

    /// Handle one raw input event.
    pub fn handle(
        &mut self,
        input: RawInput,
        sched: &mut impl Scheduler,
        sink: &mut impl CounterSink,
    ) -> Disposition {
        match input {
            RawInput::Down { model, region } => self.down(model, region, sched, sink),
            RawInput::Up { model } => {
                if self.decrement == Some(model) {
                    self.decrement = None;
                    self.arm_ghost_window(model, sched);
                    trace!(subject = %self.subject(), ?model, "decrement released");
                    return Disposition::Ignored;
                }
                self.recognizer.on_press_end(sched, sink);
                if let Some(owner) = self.active.take() {
                    self.arm_ghost_window(owner, sched);
                }
                trace!(subject = %self.subject(), ?model, "release");
                Disposition::Press(PressSignal::End)
            }
            RawInput::Move { inside: true, .. } => Disposition::Ignored,
            RawInput::Move { inside: false, .. }
            | RawInput::Leave { .. }
            | RawInput::Cancel { .. }
            | RawInput::DocumentUp => {
                self.decrement = None;
                if self.active.is_none() && self.state() == GestureState::Idle {
                    return Disposition::Ignored;
                }
                self.cancel(sched);
                Disposition::Press(PressSignal::Cancel)
            }
            RawInput::PageHidden => {
                self.cancel(sched);
                self.decrement = None;
                self.ghost_until = None;
                Disposition::Press(PressSignal::Cancel)
            }
        }
    }

    /// Independent decrement action.
    ///
    /// Emits one decrement when the subject's count is above zero. Returns
    /// whether a decrement was emitted.
    pub fn on_decrement_request(&mut self, sink: &mut impl CounterSink) -> bool {
        let subject = self.recognizer.subject();
        if sink.current_count(subject) == 0 {
            return false;
        }
        sink.on_decrement(subject);
        true
    }

    /// Forward a timer firing to the recognizer.
    pub fn on_timer(
        &mut self,
        id: TimerId,
        sched: &mut impl Scheduler,
        sink: &mut impl CounterSink,
    ) {
        self.recognizer.on_timer(id, sched, sink);
    }

    /// Release every timer on unmount.
    pub fn teardown(&mut self, sched: &mut impl Scheduler) {
        self.recognizer.teardown(sched);
        self.active = None;
        self.decrement = None;
    }

    fn down(
        &mut self,
        model: InputModel,
        region: Region,
        sched: &mut impl Scheduler,
        sink: &mut impl CounterSink,
    ) -> Disposition {
        if model == InputModel::Mouse && self.ghost_until.is_some_and(|t| sched.now() < t) {
            trace!(subject = %self.subject(), "synthesized mouse down ignored");
            return Disposition::Ignored;
        }
        match region {
            Region::Decrement => {
                if self.decrement.is_some() {
                    return Disposition::Ignored;
                }
                self.decrement = Some(model);
                Disposition::Decrement {
                    applied: self.on_decrement_request(sink),
                }
            }
            Region::Press => {
                if self.active.is_some() {
                    return Disposition::Ignored;
                }
                self.active = Some(model);
                if self.recognizer.on_press_start(sched) {
                    Disposition::Press(PressSignal::Start)
                } else {
                    Disposition::Ignored
                }
            }
        }
    }

    fn arm_ghost_window(&mut self, model: InputModel, sched: &mut impl Scheduler) {
        if model != InputModel::Mouse {
            self.ghost_until = Some(sched.now().saturating_add(GHOST_MOUSE_WINDOW));
        }
    }

    fn cancel(&mut self, sched: &mut impl Scheduler) {
        self.recognizer.on_press_cancel(sched);
        self.active = None;
    }
}

// =============================================================================
// TESTS
// =============================================================================

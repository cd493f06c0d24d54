//! # Press Scenarios
//!
//! End-to-end timelines on the virtual clock: raw input in, counter events
//! out, checked against the exact times they were emitted.

use countnow_core::{
    CounterControl, CounterSink, GestureState, InputModel, ManualScheduler, Player,
    PressRepeatRecognizer, RawInput, Region, Scheduler, Scoreboard, SubjectId,
};
use std::time::Duration;

// =============================================================================
// HELPERS
// =============================================================================

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Sink that records when each event arrived.
#[derive(Default)]
struct Recorder {
    now: Duration,
    increments: Vec<u64>,
    decrements: Vec<u64>,
}

impl CounterSink for Recorder {
    fn on_increment(&mut self, _subject: &SubjectId) {
        self.increments.push(self.now.as_millis() as u64);
    }

    fn on_decrement(&mut self, _subject: &SubjectId) {
        self.decrements.push(self.now.as_millis() as u64);
    }

    fn current_count(&self, _subject: &SubjectId) -> u32 {
        (self.increments.len() - self.decrements.len()) as u32
    }
}

fn run_recognizer(
    sched: &mut ManualScheduler,
    recognizer: &mut PressRepeatRecognizer,
    rec: &mut Recorder,
    until: u64,
) {
    sched.run_until(ms(until), |s, id| {
        rec.now = s.now();
        recognizer.on_timer(id, s, rec);
    });
    rec.now = sched.now();
}

fn touch_down() -> RawInput {
    RawInput::Down {
        model: InputModel::Touch,
        region: Region::Press,
    }
}

fn touch_up() -> RawInput {
    RawInput::Up {
        model: InputModel::Touch,
    }
}

// =============================================================================
// RECOGNIZER TIMELINES
// =============================================================================

#[test]
fn hold_for_1100ms_emits_four_increments() {
    let mut sched = ManualScheduler::new();
    let mut recognizer = PressRepeatRecognizer::new(SubjectId::new("solo"));
    let mut rec = Recorder::default();

    recognizer.on_press_start(&mut sched);
    run_recognizer(&mut sched, &mut recognizer, &mut rec, 1100);
    recognizer.on_press_end(&mut sched, &mut rec);
    run_recognizer(&mut sched, &mut recognizer, &mut rec, 5000);

    assert_eq!(rec.increments, vec![500, 700, 900, 1100]);
    assert_eq!(recognizer.state(), GestureState::Idle);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn quick_tap_emits_once_at_release() {
    let mut sched = ManualScheduler::new();
    let mut recognizer = PressRepeatRecognizer::new(SubjectId::new("solo"));
    let mut rec = Recorder::default();

    recognizer.on_press_start(&mut sched);
    run_recognizer(&mut sched, &mut recognizer, &mut rec, 50);
    recognizer.on_press_end(&mut sched, &mut rec);
    run_recognizer(&mut sched, &mut recognizer, &mut rec, 5000);

    assert_eq!(rec.increments, vec![50]);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn release_just_before_threshold_is_a_tap() {
    let mut sched = ManualScheduler::new();
    let mut recognizer = PressRepeatRecognizer::new(SubjectId::new("solo"));
    let mut rec = Recorder::default();

    recognizer.on_press_start(&mut sched);
    run_recognizer(&mut sched, &mut recognizer, &mut rec, 499);
    recognizer.on_press_end(&mut sched, &mut rec);
    run_recognizer(&mut sched, &mut recognizer, &mut rec, 2000);

    assert_eq!(rec.increments, vec![499]);
}

#[test]
fn duplicate_press_start_does_not_rearm() {
    let mut sched = ManualScheduler::new();
    let mut recognizer = PressRepeatRecognizer::new(SubjectId::new("solo"));
    let mut rec = Recorder::default();

    assert!(recognizer.on_press_start(&mut sched));
    run_recognizer(&mut sched, &mut recognizer, &mut rec, 300);
    assert!(!recognizer.on_press_start(&mut sched));
    run_recognizer(&mut sched, &mut recognizer, &mut rec, 500);

    // the original threshold still fires at 500
    assert_eq!(rec.increments, vec![500]);
    assert_eq!(recognizer.state(), GestureState::Repeating);
}

// =============================================================================
// CONTROL TIMELINES
// =============================================================================

#[test]
fn page_hidden_before_threshold_emits_nothing() {
    let mut sched = ManualScheduler::new();
    let mut control = CounterControl::new(SubjectId::new("solo"));
    let mut rec = Recorder::default();

    control.handle(touch_down(), &mut sched, &mut rec);
    sched.run_until(ms(300), |s, id| {
        rec.now = s.now();
        control.on_timer(id, s, &mut rec);
    });
    control.handle(RawInput::PageHidden, &mut sched, &mut rec);
    sched.run_until(ms(5000), |s, id| {
        control.on_timer(id, s, &mut rec);
    });

    assert!(rec.increments.is_empty());
    assert_eq!(control.state(), GestureState::Idle);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn page_hidden_stops_every_control() {
    let mut sched = ManualScheduler::new();
    let mut board = Scoreboard::new(vec![
        Player::new("a", "Mom", "👩", "#FF8A80"),
        Player::new("b", "Dad", "👨", "#80D8FF"),
    ]);
    let mut controls = vec![
        CounterControl::new(SubjectId::new("a")),
        CounterControl::new(SubjectId::new("b")),
    ];

    for control in &mut controls {
        control.handle(touch_down(), &mut sched, &mut board);
    }
    sched.run_until(ms(700), |s, id| {
        for control in controls.iter_mut() {
            if control.owns_timer(id) {
                control.on_timer(id, s, &mut board);
            }
        }
    });
    for control in &mut controls {
        control.handle(RawInput::PageHidden, &mut sched, &mut board);
    }
    sched.run_until(ms(5000), |s, id| {
        for control in controls.iter_mut() {
            control.on_timer(id, s, &mut board);
        }
    });

    // 500 and 700 for each
    assert_eq!(board.count(&SubjectId::new("a")), 2);
    assert_eq!(board.count(&SubjectId::new("b")), 2);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn touch_hold_with_compat_mouse_counts_once_per_step() {
    let mut sched = ManualScheduler::new();
    let mut control = CounterControl::new(SubjectId::new("solo"));
    let mut rec = Recorder::default();

    control.handle(touch_down(), &mut sched, &mut rec);
    sched.run_until(ms(600), |s, id| {
        rec.now = s.now();
        control.on_timer(id, s, &mut rec);
    });
    rec.now = sched.now();
    control.handle(touch_up(), &mut sched, &mut rec);
    // browser-synthesized mouse pair for the same tap
    control.handle(
        RawInput::Down {
            model: InputModel::Mouse,
            region: Region::Press,
        },
        &mut sched,
        &mut rec,
    );
    control.handle(
        RawInput::Up {
            model: InputModel::Mouse,
        },
        &mut sched,
        &mut rec,
    );
    sched.run_until(ms(3000), |s, id| {
        rec.now = s.now();
        control.on_timer(id, s, &mut rec);
    });

    assert_eq!(rec.increments, vec![500]);
}

#[test]
fn decrement_region_is_independent_of_hold() {
    let mut sched = ManualScheduler::new();
    let mut control = CounterControl::new(SubjectId::new("solo"));
    let mut rec = Recorder::default();

    control.handle(touch_down(), &mut sched, &mut rec);
    rec.now = ms(100);
    control.handle(touch_up(), &mut sched, &mut rec);
    assert_eq!(rec.increments.len(), 1);

    assert!(control.on_decrement_request(&mut rec));
    assert!(!control.on_decrement_request(&mut rec));
    assert_eq!(rec.decrements.len(), 1);
    assert_eq!(control.state(), GestureState::Idle);
}

#[test]
fn decrement_button_works_during_a_hold() {
    let mut sched = ManualScheduler::new();
    let mut control = CounterControl::new(SubjectId::new("solo"));
    let mut rec = Recorder::default();

    control.handle(touch_down(), &mut sched, &mut rec);
    sched.run_until(ms(700), |s, id| {
        rec.now = s.now();
        control.on_timer(id, s, &mut rec);
    });
    assert_eq!(rec.increments, vec![500, 700]);

    control.handle(
        RawInput::Down {
            model: InputModel::Touch,
            region: Region::Decrement,
        },
        &mut sched,
        &mut rec,
    );
    assert_eq!(rec.decrements.len(), 1);
    assert_eq!(control.state(), GestureState::Repeating);

    control.handle(touch_up(), &mut sched, &mut rec);
    sched.run_until(ms(900), |s, id| {
        rec.now = s.now();
        control.on_timer(id, s, &mut rec);
    });
    control.handle(touch_up(), &mut sched, &mut rec);

    assert_eq!(rec.increments, vec![500, 700, 900]);
    assert_eq!(control.state(), GestureState::Idle);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn document_release_while_armed_is_silent() {
    let mut sched = ManualScheduler::new();
    let mut control = CounterControl::new(SubjectId::new("solo"));
    let mut rec = Recorder::default();

    control.handle(touch_down(), &mut sched, &mut rec);
    sched.run_until(ms(300), |s, id| {
        rec.now = s.now();
        control.on_timer(id, s, &mut rec);
    });
    assert_eq!(control.state(), GestureState::ArmedWaitingThreshold);

    control.handle(RawInput::DocumentUp, &mut sched, &mut rec);
    sched.run_until(ms(5000), |s, id| {
        rec.now = s.now();
        control.on_timer(id, s, &mut rec);
    });

    // no tap either: the release happened outside the control
    assert!(rec.increments.is_empty());
    assert_eq!(control.state(), GestureState::Idle);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn scoreboard_stamps_follow_game_clock() {
    let mut sched = ManualScheduler::new();
    let mut board = Scoreboard::new(vec![Player::new("a", "Mom", "👩", "#FF8A80")]);
    let mut control = CounterControl::new(SubjectId::new("a"));

    sched.run_until(Duration::from_secs(61), |_, _| {});
    board.set_elapsed(sched.now());
    control.handle(touch_down(), &mut sched, &mut board);
    control.handle(touch_up(), &mut sched, &mut board);

    let entry = &board.log()[0];
    assert_eq!(entry.timestamp, "01:01");
    assert_eq!(entry.label, "👩 Mom");
    assert_eq!(entry.delta, 1);
}

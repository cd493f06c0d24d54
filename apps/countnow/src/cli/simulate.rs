//! # Input Replay
//!
//! Replays a scripted sequence of raw input events through one counter
//! control on the virtual clock and records what the control emitted.
//!
//! ## Script format
//!
//! Comma-separated `<event>[:<model>]@<ms>` steps, times non-decreasing:
//!
//! ```text
//! down:touch@0,up:touch@1100,down:mouse@1110,up:mouse@1120
//! ```
//!
//! | event    | raw input                          |
//! |----------|------------------------------------|
//! | `down`   | press on the main region           |
//! | `dec`    | press on the decrement button      |
//! | `up`     | release                            |
//! | `in`     | move inside the hit area           |
//! | `out`    | move outside the hit area          |
//! | `leave`  | pointer left the control           |
//! | `cancel` | gesture canceled by the platform   |
//! | `docup`  | release seen by the page listener  |
//! | `hidden` | page lost visibility               |
//!
//! The model is `mouse` (default), `touch` or `pointer`.

use countnow_core::{
    CountNowError, CounterControl, CounterEvent, CounterSink, InputModel, ManualScheduler, Player,
    RawInput, Region, Scheduler, Scoreboard, SubjectId,
};
use serde::Serialize;
use std::time::Duration;

/// Subject id of the simulated counter.
const SUBJECT: &str = "solo";

/// One timed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStep {
    pub at_ms: u64,
    pub input: RawInput,
}

/// One emitted counter event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Emitted {
    pub at_ms: u64,
    pub event: CounterEvent,
    /// Tally after the event.
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replay {
    pub events: Vec<Emitted>,
    pub final_count: u32,
    /// Virtual time the replay stopped at.
    pub ended_at_ms: u64,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_model(raw: Option<&str>) -> Result<InputModel, CountNowError> {
    match raw {
        None | Some("mouse") => Ok(InputModel::Mouse),
        Some("touch") => Ok(InputModel::Touch),
        Some("pointer") => Ok(InputModel::Pointer),
        Some(other) => Err(CountNowError::InvalidInput(format!(
            "unknown input model '{}'",
            other
        ))),
    }
}

fn parse_step(raw: &str) -> Result<ScriptStep, CountNowError> {
    let (event, at) = raw
        .split_once('@')
        .ok_or_else(|| CountNowError::InvalidInput(format!("step '{}' has no '@<ms>'", raw)))?;
    let at_ms = at
        .trim()
        .parse::<u64>()
        .map_err(|e| CountNowError::InvalidInput(format!("bad time in '{}': {}", raw, e)))?;

    let (name, model) = match event.trim().split_once(':') {
        Some((name, model)) => (name, Some(model)),
        None => (event.trim(), None),
    };
    let model = parse_model(model)?;

    let input = match name {
        "down" => RawInput::Down {
            model,
            region: Region::Press,
        },
        "dec" => RawInput::Down {
            model,
            region: Region::Decrement,
        },
        "up" => RawInput::Up { model },
        "in" => RawInput::Move {
            model,
            inside: true,
        },
        "out" => RawInput::Move {
            model,
            inside: false,
        },
        "leave" => RawInput::Leave { model },
        "cancel" => RawInput::Cancel { model },
        "docup" => RawInput::DocumentUp,
        "hidden" => RawInput::PageHidden,
        other => {
            return Err(CountNowError::InvalidInput(format!(
                "unknown event '{}'",
                other
            )));
        }
    };
    Ok(ScriptStep { at_ms, input })
}

/// Parse a replay script.
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>, CountNowError> {
    let steps = script
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_step)
        .collect::<Result<Vec<_>, _>>()?;

    if steps.is_empty() {
        return Err(CountNowError::InvalidInput("script is empty".to_string()));
    }
    if steps.windows(2).any(|w| w[1].at_ms < w[0].at_ms) {
        return Err(CountNowError::InvalidInput(
            "step times must not go backwards".to_string(),
        ));
    }
    Ok(steps)
}

// =============================================================================
// REPLAY
// =============================================================================

/// Scoreboard sink that also remembers when each event happened.
struct Tape {
    board: Scoreboard,
    subject: SubjectId,
    now_ms: u64,
    events: Vec<Emitted>,
}

impl Tape {
    fn push(&mut self, event: CounterEvent) {
        self.board.apply(&self.subject, event);
        self.events.push(Emitted {
            at_ms: self.now_ms,
            event,
            count: self.board.count(&self.subject),
        });
    }
}

impl CounterSink for Tape {
    fn on_increment(&mut self, _subject: &SubjectId) {
        self.push(CounterEvent::Increment);
    }

    fn on_decrement(&mut self, _subject: &SubjectId) {
        self.push(CounterEvent::Decrement);
    }

    fn current_count(&self, subject: &SubjectId) -> u32 {
        self.board.count(subject)
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}

/// Fire every timer due up to `until_ms`, stamping emitted events with the
/// firing time.
fn fire_until(
    until_ms: u64,
    control: &mut CounterControl,
    sched: &mut ManualScheduler,
    tape: &mut Tape,
) {
    sched.run_until(Duration::from_millis(until_ms), |s, id| {
        tape.now_ms = millis(s.now());
        control.on_timer(id, s, tape);
    });
    tape.now_ms = until_ms;
}

/// Run `steps` through a fresh control, then let timers run for `settle_ms`
/// past the last step before tearing the control down.
pub fn replay(steps: &[ScriptStep], settle_ms: u64) -> Replay {
    let subject = SubjectId::new(SUBJECT);
    let mut control = CounterControl::new(subject.clone());
    let mut sched = ManualScheduler::new();
    let mut tape = Tape {
        board: Scoreboard::new(vec![Player::new(SUBJECT, "Count", "🔢", "#FF6B6B")]),
        subject,
        now_ms: 0,
        events: Vec::new(),
    };

    for step in steps {
        fire_until(step.at_ms, &mut control, &mut sched, &mut tape);
        let disposition = control.handle(step.input, &mut sched, &mut tape);
        tracing::debug!(at_ms = step.at_ms, input = ?step.input, ?disposition, "replayed");
    }

    let last = steps.last().map_or(0, |s| s.at_ms);
    let end = last.saturating_add(settle_ms);
    fire_until(end, &mut control, &mut sched, &mut tape);
    control.teardown(&mut sched);

    Replay {
        final_count: tape.board.count(&tape.subject),
        events: tape.events,
        ended_at_ms: end,
    }
}

// =============================================================================
// TESTS
// =============================================================================

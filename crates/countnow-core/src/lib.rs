//! # countnow-core
//!
//! The deterministic counting engine for CountNow.
//!
//! This crate turns raw press input into counter events and keeps the
//! records a counting session produces:
//! - `gesture` / `control`: tap vs. hold recognition with auto-repeat
//! - `scoreboard` / `ranking`: tallies, change log, results
//! - `countdown` / `penalty`: timer-driven game helpers
//! - `session` / `participants` / `profile` / `store`: saved records
//!
//! ## Architectural Constraints
//!
//! - Has NO async and NO network dependencies
//! - Never reads a clock: time comes from a [`Scheduler`], timestamps and
//!   entropy are passed in by the caller
//! - Integer arithmetic only

// =============================================================================
// MODULES
// =============================================================================

pub mod codes;
pub mod control;
pub mod countdown;
pub mod gesture;
pub mod participants;
pub mod penalty;
pub mod presets;
pub mod primitives;
pub mod profile;
pub mod ranking;
pub mod scheduler;
pub mod scoreboard;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CountNowError, CounterEvent, CounterSink, Player, SubjectId, normalize_name};

// =============================================================================
// RE-EXPORTS: Input Handling
// =============================================================================

pub use control::{CounterControl, Disposition, InputModel, PressSignal, RawInput, Region};
pub use gesture::{GestureState, GestureTiming, PressRepeatRecognizer};
pub use scheduler::{ManualScheduler, Scheduler, TimerId};

// =============================================================================
// RE-EXPORTS: Game
// =============================================================================

pub use countdown::{Countdown, CountdownEvent, format_clock};
pub use penalty::{PENALTIES, PenaltyWheel, SpinEvent};
pub use presets::{PRESET_LABELS, PresetLabel, SetupRoster};
pub use ranking::{RankedResult, rank, winner};
pub use scoreboard::{LogEntry, Scoreboard};

// =============================================================================
// RE-EXPORTS: Records
// =============================================================================

pub use participants::{CustomParticipant, NewParticipant, ParticipantPatch};
pub use profile::{NewProfile, ProfilePatch, UserProfile};
pub use session::{ChangeKind, CountSession, RecentSessions, SessionBody, SessionChange, SessionRow};
pub use storage::{MemoryStore, RecordStore, RedbStore};
pub use store::{StorageBackend, Store};

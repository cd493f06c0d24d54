//! # Innate Primitives
//!
//! Hardcoded runtime constants for the CountNow CORE.
//!
//! These values are compiled into the binary and are immutable at runtime.
//!
//! ## Primitives
//!
//! 1. **Gesture Primitives**: the hold threshold and repeat interval that
//!    separate a tap from a hold.
//! 2. **Game Primitives**: countdown options, warning window, penalty spin.
//! 3. **Record Limits**: history size, name lengths, code lengths.

use std::time::Duration;

// =============================================================================
// GESTURE PRIMITIVES
// =============================================================================

/// Press duration that separates a tap from a hold.
///
/// - Released before this elapses: exactly one increment, at release.
/// - Still held when this elapses: one increment immediately, then repeats.
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(500);

/// Delay between auto-increments while a hold is repeating.
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(200);

/// Window after a touch or pointer gesture during which synthesized
/// compatibility mouse events are ignored.
pub const GHOST_MOUSE_WINDOW: Duration = Duration::from_millis(800);

// =============================================================================
// GAME PRIMITIVES
// =============================================================================

/// Countdown choices offered when setting up a room, in seconds.
///
/// `0` means no time limit.
pub const TIMER_OPTIONS: [u32; 5] = [0, 60, 180, 300, 600];

/// Default game length in seconds.
pub const DEFAULT_GAME_SECONDS: u32 = 180;

/// Remaining seconds at or below which the countdown is in its warning state.
pub const WARNING_SECONDS: u32 = 30;

/// Countdown tick period.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// How often the penalty roulette changes its displayed entry while spinning.
pub const PENALTY_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Total spin time before the roulette settles.
pub const PENALTY_SPIN_DURATION: Duration = Duration::from_millis(2000);

/// Number of event log entries visible while the log is collapsed.
pub const COLLAPSED_LOG_ENTRIES: usize = 3;

// =============================================================================
// RECORD LIMITS
// =============================================================================

/// Maximum number of sessions kept in the recent-session history.
pub const MAX_SESSIONS: usize = 10;

/// Rows not updated within this age are removed by a bulk clear.
pub const CLEAR_SESSIONS_AGE: Duration = Duration::from_secs(60 * 60);

/// Length of a room code.
pub const ROOM_CODE_LENGTH: usize = 6;

/// Length of a locally generated participant id.
pub const LOCAL_ID_LENGTH: usize = 9;

/// Maximum length (in characters) of a player or participant name.
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum length (in characters) of a session title.
pub const MAX_TITLE_LENGTH: usize = 64;

/// Maximum number of players in a single multi-player session.
pub const MAX_PLAYERS: usize = 24;

/// Maximum number of participants accepted by one bulk import.
pub const MAX_IMPORT_BATCH: usize = 200;

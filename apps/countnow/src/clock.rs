//! # Wall Clock and Entropy
//!
//! The core never reads a clock or a random source; the app hands it these.

use chrono::Utc;
use uuid::Uuid;

/// Current time in unix milliseconds.
#[must_use]
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// 64 random bits for room codes and penalty draws.
#[must_use]
pub fn entropy() -> u64 {
    Uuid::new_v4().as_u128() as u64
}

/// Fresh record id.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

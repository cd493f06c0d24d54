//! # Codes
//!
//! Room codes, local participant ids and share links. Entropy comes from
//! the caller so the core stays deterministic.

use crate::primitives::{LOCAL_ID_LENGTH, ROOM_CODE_LENGTH};

const BASE36_UPPER: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BASE36_LOWER: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn base36(mut entropy: u64, len: usize, alphabet: &[u8; 36]) -> String {
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        out.push(char::from(alphabet[(entropy % 36) as usize]));
        entropy /= 36;
    }
    out
}

/// Six uppercase base-36 characters.
#[must_use]
pub fn room_code(entropy: u64) -> String {
    base36(entropy, ROOM_CODE_LENGTH, BASE36_UPPER)
}

/// Nine lowercase base-36 characters.
#[must_use]
pub fn local_id(entropy: u64) -> String {
    base36(entropy, LOCAL_ID_LENGTH, BASE36_LOWER)
}

/// Whether `code` looks like a room code.
#[must_use]
pub fn is_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LENGTH && code.bytes().all(|b| BASE36_UPPER.contains(&b))
}

/// Link a second device opens to join the room.
#[must_use]
pub fn share_url(public_url: &str, code: &str) -> String {
    format!("{}/room/{}", public_url.trim_end_matches('/'), code)
}

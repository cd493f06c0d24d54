//! # Custom Participants
//!
//! Reusable participant labels a user saved. Records are owned by a user id;
//! a user never sees or edits another user's records.

use crate::types::{CountNowError, normalize_name};
use serde::{Deserialize, Serialize};

/// A saved participant label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomParticipant {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub is_favorite: bool,
    pub usage_count: u32,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Fields for a new participant (also the bulk import entry shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub name: String,
    pub emoji: String,
    pub color: String,
}

/// Partial update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

fn check_nonblank(field: &str, value: &str) -> Result<(), CountNowError> {
    if value.trim().is_empty() {
        return Err(CountNowError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl CustomParticipant {
    /// Build a fresh record with zero usage.
    pub fn create(
        id: impl Into<String>,
        user_id: impl Into<String>,
        fields: NewParticipant,
        now_ms: u64,
    ) -> Result<Self, CountNowError> {
        let name = normalize_name(&fields.name)?;
        check_nonblank("emoji", &fields.emoji)?;
        check_nonblank("color", &fields.color)?;
        Ok(Self {
            id: id.into(),
            user_id: user_id.into(),
            name,
            emoji: fields.emoji,
            color: fields.color,
            is_favorite: false,
            usage_count: 0,
            created_at: now_ms,
            updated_at: now_ms,
        })
    }

    /// Apply a partial update. Nothing changes if any field is invalid.
    pub fn apply_patch(&mut self, patch: ParticipantPatch, now_ms: u64) -> Result<(), CountNowError> {
        let name = patch.name.as_deref().map(normalize_name).transpose()?;
        if let Some(emoji) = &patch.emoji {
            check_nonblank("emoji", emoji)?;
        }
        if let Some(color) = &patch.color {
            check_nonblank("color", color)?;
        }
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(emoji) = patch.emoji {
            self.emoji = emoji;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(fav) = patch.is_favorite {
            self.is_favorite = fav;
        }
        self.updated_at = now_ms;
        Ok(())
    }

    /// Count one more use in a room.
    pub fn record_use(&mut self, now_ms: u64) {
        self.usage_count = self.usage_count.saturating_add(1);
        self.updated_at = now_ms;
    }
}

/// Most used first; ties keep insertion order by creation time then id.
pub fn sort_by_usage(list: &mut [CustomParticipant]) {
    list.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str) -> NewParticipant {
        NewParticipant {
            name: name.to_string(),
            emoji: "🐱".to_string(),
            color: "#FFAB91".to_string(),
        }
    }

    #[test]
    fn create_trims_and_zeroes_usage() {
        let p = CustomParticipant::create("a", "u1", fields("  Kitty "), 10).expect("valid");
        assert_eq!(p.name, "Kitty");
        assert_eq!(p.usage_count, 0);
        assert!(!p.is_favorite);
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn create_rejects_blank_fields() {
        assert!(CustomParticipant::create("a", "u1", fields(""), 0).is_err());
        let mut f = fields("Kitty");
        f.emoji = " ".to_string();
        assert!(CustomParticipant::create("a", "u1", f, 0).is_err());
    }

    #[test]
    fn invalid_patch_changes_nothing() {
        let mut p = CustomParticipant::create("a", "u1", fields("Kitty"), 0).expect("valid");
        let patch = ParticipantPatch {
            emoji: Some("🐶".to_string()),
            name: Some("   ".to_string()),
            ..ParticipantPatch::default()
        };
        assert!(p.apply_patch(patch, 5).is_err());
        assert_eq!(p.emoji, "🐱");
        assert_eq!(p.updated_at, 0);
    }

    #[test]
    fn patch_updates_given_fields() {
        let mut p = CustomParticipant::create("a", "u1", fields("Kitty"), 0).expect("valid");
        let patch = ParticipantPatch {
            is_favorite: Some(true),
            ..ParticipantPatch::default()
        };
        p.apply_patch(patch, 7).expect("valid");
        assert!(p.is_favorite);
        assert_eq!(p.name, "Kitty");
        assert_eq!(p.updated_at, 7);
    }

    #[test]
    fn usage_ordering() {
        let mut a = CustomParticipant::create("a", "u1", fields("A"), 0).expect("valid");
        let b = CustomParticipant::create("b", "u1", fields("B"), 1).expect("valid");
        let mut c = CustomParticipant::create("c", "u1", fields("C"), 2).expect("valid");
        a.record_use(3);
        c.record_use(4);
        c.record_use(5);
        let mut list = vec![a, b, c];
        sort_by_usage(&mut list);
        let ids: Vec<_> = list.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}

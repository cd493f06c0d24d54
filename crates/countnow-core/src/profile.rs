//! # Profiles
//!
//! One profile per signed-in user.

use crate::types::{CountNowError, normalize_name};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROFILE_EMOJI: &str = "😊";
pub const DEFAULT_PROFILE_COLOR: &str = "#FF6B6B";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub display_name: Option<String>,
    pub emoji: String,
    pub color: String,
    pub avatar_url: Option<String>,
    pub referral_code: Option<String>,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Onboarding input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl UserProfile {
    /// Build a profile. A missing display name falls back to the name;
    /// missing emoji and color take the defaults.
    pub fn create(id: impl Into<String>, input: NewProfile, now_ms: u64) -> Result<Self, CountNowError> {
        let name = normalize_name(&input.name)?;
        let display_name = match filled(input.display_name) {
            Some(d) => normalize_name(&d)?,
            None => name.clone(),
        };
        Ok(Self {
            id: id.into(),
            email: input.email,
            name,
            display_name: Some(display_name),
            emoji: filled(input.emoji).unwrap_or_else(|| DEFAULT_PROFILE_EMOJI.to_string()),
            color: filled(input.color).unwrap_or_else(|| DEFAULT_PROFILE_COLOR.to_string()),
            avatar_url: None,
            referral_code: None,
            created_at: now_ms,
            updated_at: now_ms,
        })
    }

    /// Name shown to others.
    #[must_use]
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Apply a partial update. A blank display name resets it to the name.
    pub fn apply_patch(&mut self, patch: ProfilePatch, now_ms: u64) -> Result<(), CountNowError> {
        let name = patch.name.as_deref().map(normalize_name).transpose()?;
        let display_name = match patch.display_name {
            Some(d) if d.trim().is_empty() => Some(None),
            Some(d) => Some(Some(normalize_name(&d)?)),
            None => None,
        };
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(display_name) = display_name {
            self.display_name = display_name.or_else(|| Some(self.name.clone()));
        }
        if let Some(emoji) = filled(patch.emoji) {
            self.emoji = emoji;
        }
        if let Some(color) = filled(patch.color) {
            self.color = color;
        }
        if let Some(url) = patch.avatar_url {
            self.avatar_url = filled(Some(url));
        }
        self.updated_at = now_ms;
        Ok(())
    }
}

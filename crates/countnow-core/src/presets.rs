//! # Presets
//!
//! Built-in participant labels and the room setup roster.

use crate::primitives::MAX_PLAYERS;
use crate::types::{CountNowError, Player, SubjectId, normalize_name};
use serde::Serialize;

/// Category a preset label is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetGroup {
    Family,
    Friends,
    Work,
    School,
    Animals,
}

/// A selectable participant label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetLabel {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    pub group: PresetGroup,
}

const fn label(
    id: &'static str,
    name: &'static str,
    emoji: &'static str,
    color: &'static str,
    group: PresetGroup,
) -> PresetLabel {
    PresetLabel {
        id,
        name,
        emoji,
        color,
        group,
    }
}

pub const PRESET_LABELS: [PresetLabel; 24] = [
    label("mom", "Mom", "👩", "#FF8A80", PresetGroup::Family),
    label("dad", "Dad", "👨", "#80D8FF", PresetGroup::Family),
    label("sister", "Big Sister", "👧", "#CE93D8", PresetGroup::Family),
    label("brother", "Big Brother", "👦", "#A7FFEB", PresetGroup::Family),
    label("younger-sister", "Little Sister", "👧", "#FFB3E6", PresetGroup::Family),
    label("younger-brother", "Little Brother", "👦", "#B3E0FF", PresetGroup::Family),
    label("grandma", "Grandma", "👵", "#FFD4B3", PresetGroup::Family),
    label("grandpa", "Grandpa", "👴", "#C5E1A5", PresetGroup::Family),
    label("friend1", "Friend 1", "😊", "#FFCC80", PresetGroup::Friends),
    label("friend2", "Friend 2", "😄", "#B39DDB", PresetGroup::Friends),
    label("friend3", "Friend 3", "🙂", "#90CAF9", PresetGroup::Friends),
    label("friend4", "Friend 4", "😃", "#A5D6A7", PresetGroup::Friends),
    label("team-lead", "Team Lead", "👔", "#81C784", PresetGroup::Work),
    label("manager", "Manager", "💼", "#64B5F6", PresetGroup::Work),
    label("colleague1", "Colleague 1", "👥", "#FFB74D", PresetGroup::Work),
    label("colleague2", "Colleague 2", "🤝", "#F06292", PresetGroup::Work),
    label("teacher", "Teacher", "👨‍🏫", "#4DB6AC", PresetGroup::School),
    label("student1", "No. 1", "1️⃣", "#FFE082", PresetGroup::School),
    label("student2", "No. 2", "2️⃣", "#BCAAA4", PresetGroup::School),
    label("student3", "No. 3", "3️⃣", "#CE93D8", PresetGroup::School),
    label("cat", "Cat", "🐱", "#FFAB91", PresetGroup::Animals),
    label("dog", "Dog", "🐶", "#80DEEA", PresetGroup::Animals),
    label("rabbit", "Rabbit", "🐰", "#F48FB1", PresetGroup::Animals),
    label("bear", "Bear", "🐻", "#FFCC80", PresetGroup::Animals),
];

/// Colors offered for manually added players, in assignment order.
pub const PALETTE: [&str; 6] = [
    "#FF8A80", "#80D8FF", "#A7FFEB", "#CE93D8", "#FFCC80", "#B39DDB",
];

/// Emoji choices for manually added players.
pub const EMOJIS: [&str; 8] = ["👩", "👨", "👧", "👦", "🧒", "👶", "🙋", "🙋‍♂️"];

#[must_use]
pub fn preset(id: &str) -> Option<&'static PresetLabel> {
    PRESET_LABELS.iter().find(|l| l.id == id)
}

/// Players for the selected preset ids, in preset-list order.
///
/// Unknown ids are rejected; duplicates collapse.
pub fn players_from_presets(selected: &[&str]) -> Result<Vec<Player>, CountNowError> {
    if let Some(unknown) = selected.iter().find(|id| preset(id).is_none()) {
        return Err(CountNowError::InvalidInput(format!(
            "unknown preset label: {}",
            unknown
        )));
    }
    if selected.is_empty() {
        return Err(CountNowError::InvalidInput(
            "select at least one participant".to_string(),
        ));
    }
    Ok(PRESET_LABELS
        .iter()
        .filter(|l| selected.contains(&l.id))
        .map(|l| Player::new(l.id, l.name, l.emoji, l.color))
        .collect())
}

/// First palette color no player uses yet, or the first palette color.
#[must_use]
pub fn next_palette_color(players: &[Player]) -> &'static str {
    PALETTE
        .iter()
        .find(|c| !players.iter().any(|p| p.color == **c))
        .copied()
        .unwrap_or(PALETTE[0])
}

/// Players being assembled for a room before the game starts.
#[derive(Debug, Clone, Default)]
pub struct SetupRoster {
    players: Vec<Player>,
}

impl SetupRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Add a player with the next free palette color.
    pub fn add(&mut self, id: impl Into<String>, name: &str, emoji: &str) -> Result<&Player, CountNowError> {
        let name = normalize_name(name)?;
        if self.players.len() >= MAX_PLAYERS {
            return Err(CountNowError::InvalidInput(format!(
                "a room holds at most {} players",
                MAX_PLAYERS
            )));
        }
        let id = SubjectId::new(id);
        if self.players.iter().any(|p| p.id == id) {
            return Err(CountNowError::Conflict(format!("player {} already added", id)));
        }
        let color = next_palette_color(&self.players);
        self.players.push(Player {
            id,
            name,
            emoji: emoji.to_string(),
            color: color.to_string(),
            count: 0,
        });
        let last = self.players.len() - 1;
        Ok(&self.players[last])
    }

    /// Remove a player. Returns whether it was present.
    pub fn remove(&mut self, id: &SubjectId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| &p.id != id);
        self.players.len() != before
    }

    /// Recolor a player. Returns whether it was present.
    pub fn set_color(&mut self, id: &SubjectId, color: &str) -> bool {
        match self.players.iter_mut().find(|p| &p.id == id) {
            Some(player) => {
                player.color = color.to_string();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn into_players(self) -> Vec<Player> {
        self.players
    }
}

// =============================================================================
// TESTS
// =============================================================================

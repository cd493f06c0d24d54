//! # Ranking
//!
//! Turns tallies into the results screen.
//!
//! Players are ordered by count, highest first; ties keep their original
//! order. Ranks follow competition ranking: tied players share the rank of
//! the first of them and the next distinct count skips ahead ("1, 2, 2, 4").

use crate::types::{Player, SubjectId};
use serde::{Deserialize, Serialize};

/// One row of the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedResult {
    pub id: SubjectId,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub count: u32,
    pub rank: u32,
    /// Bar length relative to the top count, 0..=100.
    pub bar_percent: u8,
}

/// Rank players by count.
#[must_use]
pub fn rank(players: &[Player]) -> Vec<RankedResult> {
    let mut ordered: Vec<&Player> = players.iter().collect();
    // sort_by is stable: equal counts keep their input order
    ordered.sort_by(|a, b| b.count.cmp(&a.count));

    let max = ordered.first().map(|p| p.count).unwrap_or(0);
    let mut results: Vec<RankedResult> = Vec::with_capacity(ordered.len());

    for (index, player) in ordered.iter().enumerate() {
        let rank = match results.last() {
            Some(prev) if prev.count == player.count => prev.rank,
            _ => index as u32 + 1,
        };
        results.push(RankedResult {
            id: player.id.clone(),
            name: player.name.clone(),
            emoji: player.emoji.clone(),
            color: player.color.clone(),
            count: player.count,
            rank,
            bar_percent: bar_percent(player.count, max),
        });
    }
    results
}

/// First rank-1 result, if any.
#[must_use]
pub fn winner(results: &[RankedResult]) -> Option<&RankedResult> {
    results.iter().find(|r| r.rank == 1)
}

fn bar_percent(count: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    (u64::from(count) * 100 / u64::from(max)) as u8
}

// =============================================================================
// TESTS
// =============================================================================

//! Round: one stage of single-elimination play with four disjoint player groups.

use crate::models::game::{Match, MatchStatus};
use crate::models::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for a round.
pub type RoundId = Uuid;

/// Lifecycle state of a round.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Created; no matches formed yet.
    #[default]
    Pending,
    /// At least one match has been formed.
    Active,
    /// Frozen.
    Completed,
}

/// One bracket stage: active players, matches, winners, losers.
///
/// A player is in at most one of the three player lists at any instant;
/// paired players stay in `players` until their match completes (their match
/// holds pairing-time snapshots, not the live entries).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    /// 1-based position in the bracket.
    pub number: usize,
    /// Technical name, always "Round {number}".
    pub name: String,
    /// Organizer-assigned name shown in the UI.
    pub display_name: String,
    /// Active participants assigned to this round (paired or not).
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    /// Match winners not yet moved onward.
    pub winners: Vec<Player>,
    /// Players eliminated in this round.
    pub losers: Vec<Player>,
    pub status: RoundStatus,
    /// Once set, every mutation of this round is rejected.
    pub is_frozen: bool,
}

impl Round {
    /// Create an empty pending round at the given bracket position.
    pub fn new(number: usize, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            name: format!("Round {number}"),
            display_name: display_name.into(),
            players: Vec::new(),
            matches: Vec::new(),
            winners: Vec::new(),
            losers: Vec::new(),
            status: RoundStatus::Pending,
            is_frozen: false,
        }
    }

    /// Ids of active players not referenced by any match in this round.
    pub fn unmatched_player_ids(&self) -> Vec<PlayerId> {
        let paired: HashSet<PlayerId> = self
            .matches
            .iter()
            .flat_map(|m| [m.player1.id, m.player2.id])
            .collect();
        self.players
            .iter()
            .map(|p| p.id)
            .filter(|id| !paired.contains(id))
            .collect()
    }

    /// Whether every match in this round has a completed result.
    pub fn all_matches_completed(&self) -> bool {
        self.matches.iter().all(|m| m.status == MatchStatus::Completed)
    }

    /// Number of matches without a completed result.
    pub fn incomplete_match_count(&self) -> usize {
        self.matches
            .iter()
            .filter(|m| m.status != MatchStatus::Completed)
            .count()
    }

    /// True when the round holds nothing: no players, matches, winners, losers.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
            && self.matches.is_empty()
            && self.winners.is_empty()
            && self.losers.is_empty()
    }

    /// Human-readable summary of what remains in the round (for errors).
    pub fn remaining_summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.players.is_empty() {
            parts.push(format!("{} active player(s)", self.players.len()));
        }
        if !self.matches.is_empty() {
            parts.push(format!("{} match(es)", self.matches.len()));
        }
        if !self.winners.is_empty() {
            parts.push(format!("{} winner(s)", self.winners.len()));
        }
        if !self.losers.is_empty() {
            parts.push(format!("{} loser(s)", self.losers.len()));
        }
        parts.join(", ")
    }
}

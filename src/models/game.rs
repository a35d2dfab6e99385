//! Match: a two-player pairing within a round, with lifecycle and result.

use crate::models::player::{Player, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Lifecycle state of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Active,
    Completed,
}

/// A single match between two players.
///
/// `player1` and `player2` are full snapshots taken at pairing time, so a
/// later winner change never needs to re-fetch player data.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub player1: Player,
    pub player2: Player,
    pub status: MatchStatus,
    /// None until a winner has been selected. Always one of the two players.
    pub winner: Option<PlayerId>,
    /// When the current winner was selected.
    pub won_at: Option<DateTime<Utc>>,
    /// Display only.
    pub table_number: Option<u32>,
}

impl Match {
    /// Pair two distinct players into a pending match.
    pub fn new(player1: Player, player2: Player) -> Self {
        debug_assert_ne!(player1.id, player2.id);
        Self {
            id: Uuid::new_v4(),
            player1,
            player2,
            status: MatchStatus::Pending,
            winner: None,
            won_at: None,
            table_number: None,
        }
    }

    /// Whether the given player is one of the two participants.
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player1.id == player_id || self.player2.id == player_id
    }

    /// The participant opposite to `player_id`, if `player_id` participates.
    pub fn opponent_of(&self, player_id: PlayerId) -> Option<&Player> {
        if self.player1.id == player_id {
            Some(&self.player2)
        } else if self.player2.id == player_id {
            Some(&self.player1)
        } else {
            None
        }
    }
}

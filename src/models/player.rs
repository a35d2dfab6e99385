//! Player data: registration info, container bookkeeping, advancement history.

use crate::models::game::MatchId;
use crate::models::round::RoundId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Skill tier assigned at registration (display/seeding only).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

/// Where a player currently stands in the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Registered, tournament not yet started.
    #[default]
    InLobby,
    /// In the tournament-wide available pool (dashboard).
    Available,
    /// Assigned to a round's active list, not paired.
    InRound,
    /// Paired into a pending or active match.
    InMatch,
    /// In some round's losers list.
    Eliminated,
    /// In some round's winners list.
    Winner,
}

/// Outcome recorded in a player's advancement log.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Won,
    Lost,
    /// A previously recorded win in this round was reversed by a winner change.
    Demoted,
}

/// One entry in a player's append-only advancement log.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AdvancementEntry {
    pub round_id: RoundId,
    pub outcome: RoundOutcome,
    pub at: DateTime<Utc>,
}

/// A registered tournament entrant.
///
/// Winner history is not kept in mutable flags: it is derived from
/// `advancement_log`, which only ever grows, so movement between rounds can
/// never leave it stale.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub email: String,
    pub skill_level: SkillLevel,
    pub profile_pic_url: Option<String>,
    pub status: PlayerStatus,
    /// Round whose container currently holds this player (None on dashboard).
    pub current_round: Option<RoundId>,
    /// Match this player is paired into, while it is not completed.
    pub current_match: Option<MatchId>,
    /// Transient UI selection flag; cleared on every move.
    pub selected: bool,
    pub matches_played: u32,
    pub rounds_won: HashSet<RoundId>,
    pub advancement_log: Vec<AdvancementEntry>,
}

impl Player {
    /// Create a freshly registered player (in the lobby, no history).
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        skill_level: SkillLevel,
        profile_pic_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            skill_level,
            profile_pic_url,
            status: PlayerStatus::InLobby,
            current_round: None,
            current_match: None,
            selected: false,
            matches_played: 0,
            rounds_won: HashSet::new(),
            advancement_log: Vec::new(),
        }
    }

    /// Append an advancement log entry stamped now.
    pub fn record_outcome(&mut self, round_id: RoundId, outcome: RoundOutcome) {
        self.advancement_log.push(AdvancementEntry {
            round_id,
            outcome,
            at: Utc::now(),
        });
        match outcome {
            RoundOutcome::Won => {
                self.rounds_won.insert(round_id);
            }
            RoundOutcome::Demoted => {
                self.rounds_won.remove(&round_id);
            }
            RoundOutcome::Lost => {}
        }
    }

    /// The round where this player most recently won and was not later
    /// demoted out of that win. None if they have no standing win.
    ///
    /// Scans the log newest-first; each `Demoted` entry cancels exactly one
    /// earlier `Won` in the same round.
    pub fn last_winning_round(&self) -> Option<RoundId> {
        let mut demotions: HashMap<RoundId, u32> = HashMap::new();
        for entry in self.advancement_log.iter().rev() {
            match entry.outcome {
                RoundOutcome::Demoted => {
                    *demotions.entry(entry.round_id).or_insert(0) += 1;
                }
                RoundOutcome::Won => {
                    let pending = demotions.entry(entry.round_id).or_insert(0);
                    if *pending > 0 {
                        *pending -= 1;
                    } else {
                        return Some(entry.round_id);
                    }
                }
                RoundOutcome::Lost => {}
            }
        }
        None
    }

    /// Whether this player has a standing round win on record.
    pub fn is_previous_round_winner(&self) -> bool {
        self.last_winning_round().is_some()
    }
}

//! Tournament root aggregate, movement containers, and error taxonomy.

use crate::models::game::{Match, MatchId};
use crate::models::player::{Player, PlayerId, PlayerStatus, SkillLevel};
use crate::models::round::{Round, RoundId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Errors that can occur during tournament operations.
///
/// All of these are recoverable, organizer-visible conditions; the web layer
/// turns them into 400 responses with the `Display` text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Round display name was blank.
    BlankRoundName,
    /// Round display name is already in use.
    DisplayNameTaken(String),
    /// A move was requested with no players selected.
    NoPlayersSelected,
    /// Fewer than 2 players registered when starting the tournament.
    NotEnoughPlayers,
    /// The tournament has already been started.
    AlreadyStarted,
    /// A player with this email is already registered (case-insensitive).
    DuplicateEmail(String),
    /// Mutation attempted on a frozen round.
    FrozenRound { round: String },
    /// Moving the selection into the round's active list would leave an odd count.
    OddPlayerCount {
        round: String,
        current: usize,
        incoming: usize,
    },
    /// Shuffle requested while the unmatched player count is odd.
    OddUnmatchedCount { round: String, unmatched: usize },
    /// A winner was moved to a round earlier than their last winning round.
    InvalidBackwardMove { players: Vec<String>, round: String },
    /// Player moved into a winners list of a round they did not win.
    NotRoundWinner { player: String, round: String },
    /// Player still sits in a pending/active match and cannot be moved.
    PlayerStillInMatch { player: String, round: String },
    /// Freeze requested while some matches lack a result.
    IncompleteMatches { round: String, remaining: usize },
    /// Freeze requested while unpaired players remain in the active list.
    UnmatchedPlayers { round: String, count: usize },
    /// Delete/close requested on a round that still holds something.
    RoundNotEmpty { round: String, remaining: String },
    /// Delete requested on a round that is not the last in the bracket.
    NotLastRound { round: String },
    /// The first (or only) round can never be deleted.
    CannotDeleteFirstRound,
    /// Round id not found (UI/state desync).
    RoundNotFound(RoundId),
    /// Match id not found (UI/state desync).
    MatchNotFound(MatchId),
    /// Player id not found in the expected container (UI/state desync).
    PlayerNotFound(PlayerId),
    /// The named player is not a participant of the match.
    PlayerNotInMatch(PlayerId),
    /// Start requested on a match that is not pending.
    MatchNotPending(MatchId),
    /// Cancel requested on a completed match (use a winner change instead).
    MatchAlreadyCompleted(MatchId),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::BlankRoundName => write!(f, "Round name cannot be blank"),
            TournamentError::DisplayNameTaken(name) => {
                write!(f, "Round name \"{name}\" is already in use")
            }
            TournamentError::NoPlayersSelected => write!(f, "No players selected"),
            TournamentError::NotEnoughPlayers => {
                write!(f, "Need at least 2 registered players to start")
            }
            TournamentError::AlreadyStarted => write!(f, "Tournament has already been started"),
            TournamentError::DuplicateEmail(email) => {
                write!(f, "A player with email {email} is already registered")
            }
            TournamentError::FrozenRound { round } => {
                write!(f, "Round \"{round}\" is frozen and cannot be modified")
            }
            TournamentError::OddPlayerCount {
                round,
                current,
                incoming,
            } => write!(
                f,
                "Moving {incoming} player(s) into \"{round}\" would leave {} active players; an even count is required for pairing",
                current + incoming
            ),
            TournamentError::OddUnmatchedCount { round, unmatched } => write!(
                f,
                "Round \"{round}\" has {unmatched} unmatched player(s); add or remove one before shuffling"
            ),
            TournamentError::InvalidBackwardMove { players, round } => write!(
                f,
                "Cannot move {} to \"{round}\": it is earlier than their last winning round",
                players.join(", ")
            ),
            TournamentError::NotRoundWinner { player, round } => {
                write!(f, "{player} did not win \"{round}\" and cannot join its winners list")
            }
            TournamentError::PlayerStillInMatch { player, round } => write!(
                f,
                "{player} is still in an unfinished match in \"{round}\"; complete or cancel it first"
            ),
            TournamentError::IncompleteMatches { round, remaining } => write!(
                f,
                "Round \"{round}\" has {remaining} match(es) without a result; complete them before freezing"
            ),
            TournamentError::UnmatchedPlayers { round, count } => write!(
                f,
                "Round \"{round}\" has {count} unmatched player(s); pair them or move them out before freezing"
            ),
            TournamentError::RoundNotEmpty { round, remaining } => {
                write!(f, "Round \"{round}\" is not empty ({remaining})")
            }
            TournamentError::NotLastRound { round } => {
                write!(f, "Round \"{round}\" is not the last round and cannot be deleted")
            }
            TournamentError::CannotDeleteFirstRound => {
                write!(f, "The first round can never be deleted")
            }
            TournamentError::RoundNotFound(_) => write!(f, "Round not found"),
            TournamentError::MatchNotFound(_) => write!(f, "Match not found"),
            TournamentError::PlayerNotFound(_) => write!(f, "Player not found"),
            TournamentError::PlayerNotInMatch(_) => {
                write!(f, "Player is not a participant of this match")
            }
            TournamentError::MatchNotPending(_) => {
                write!(f, "Match has already been started or completed")
            }
            TournamentError::MatchAlreadyCompleted(_) => {
                write!(f, "Completed matches cannot be cancelled; change the winner instead")
            }
        }
    }
}

/// A player container that can act as the source or target of a move.
///
/// Replaces the original console's magic strings ("dashboard", round ids)
/// so handling is exhaustive at compile time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "round_id", rename_all = "snake_case")]
pub enum Container {
    /// Tournament-wide available pool.
    Dashboard,
    /// A round's active-players list.
    RoundPlayers(RoundId),
    /// A round's winners list.
    RoundWinners(RoundId),
    /// A round's losers list.
    RoundLosers(RoundId),
}

impl Container {
    /// The round this container belongs to, if any.
    pub fn round_id(&self) -> Option<RoundId> {
        match self {
            Container::Dashboard => None,
            Container::RoundPlayers(id)
            | Container::RoundWinners(id)
            | Container::RoundLosers(id) => Some(*id),
        }
    }
}

/// One entry of the winner ledger: a player's most recent win.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WinnerEntry {
    pub player_id: PlayerId,
    pub player_name: String,
    pub round_id: RoundId,
    pub round_name: String,
    pub won_at: DateTime<Utc>,
    /// 1-based display rank; 1 is the most recent winner.
    pub rank: u32,
    /// Organizer-editable title ("Champion", "Runner-up", ...).
    pub title: Option<String>,
}

/// Full tournament state: player pool, bracket rounds, winner ledger.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    /// Unassigned players: the lobby before start, the dashboard pool after.
    pub available_players: Vec<Player>,
    /// Bracket rounds in creation order (also the forward/backward order).
    pub rounds: Vec<Round>,
    /// Derived standings: one entry per player, most recent win only.
    pub winners_to_display: Vec<WinnerEntry>,
    /// Organizer-assigned display names currently in use.
    pub used_display_names: HashSet<String>,
    /// Currently selected round tab (falls back on delete/close).
    pub selected_round: Option<RoundId>,
    pub started: bool,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new()
    }
}

impl Tournament {
    /// Create an empty tournament accepting registrations.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            available_players: Vec::new(),
            rounds: Vec::new(),
            winners_to_display: Vec::new(),
            used_display_names: HashSet::new(),
            selected_round: None,
            started: false,
        }
    }

    /// Register a player into the lobby. Emails must be unique
    /// (case-insensitive); registration closes once the tournament starts.
    pub fn register_player(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        skill_level: SkillLevel,
        profile_pic_url: Option<String>,
    ) -> Result<PlayerId, TournamentError> {
        if self.started {
            return Err(TournamentError::AlreadyStarted);
        }
        let email = email.into();
        if self
            .available_players
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(&email))
        {
            return Err(TournamentError::DuplicateEmail(email));
        }
        let player = Player::new(name, email, skill_level, profile_pic_url);
        let id = player.id;
        self.available_players.push(player);
        Ok(id)
    }

    /// Round by id.
    pub fn round(&self, round_id: RoundId) -> Result<&Round, TournamentError> {
        self.rounds
            .iter()
            .find(|r| r.id == round_id)
            .ok_or(TournamentError::RoundNotFound(round_id))
    }

    /// Mutable round by id.
    pub fn round_mut(&mut self, round_id: RoundId) -> Result<&mut Round, TournamentError> {
        self.rounds
            .iter_mut()
            .find(|r| r.id == round_id)
            .ok_or(TournamentError::RoundNotFound(round_id))
    }

    /// 0-based bracket position of a round.
    pub fn round_index(&self, round_id: RoundId) -> Result<usize, TournamentError> {
        self.rounds
            .iter()
            .position(|r| r.id == round_id)
            .ok_or(TournamentError::RoundNotFound(round_id))
    }

    /// Locate a match anywhere in the bracket: (round id, match index).
    pub fn locate_match(&self, match_id: MatchId) -> Result<(RoundId, usize), TournamentError> {
        for round in &self.rounds {
            if let Some(idx) = round.matches.iter().position(|m| m.id == match_id) {
                return Ok((round.id, idx));
            }
        }
        Err(TournamentError::MatchNotFound(match_id))
    }

    /// Match by id.
    pub fn game_match(&self, match_id: MatchId) -> Result<&Match, TournamentError> {
        let (round_id, idx) = self.locate_match(match_id)?;
        Ok(&self.round(round_id)?.matches[idx])
    }

    /// Reject if the container's round is frozen.
    fn ensure_container_unfrozen(&self, container: Container) -> Result<(), TournamentError> {
        if let Some(round_id) = container.round_id() {
            let round = self.round(round_id)?;
            if round.is_frozen {
                return Err(TournamentError::FrozenRound {
                    round: round.display_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Read access to a container's player list.
    pub fn container_players(&self, container: Container) -> Result<&Vec<Player>, TournamentError> {
        match container {
            Container::Dashboard => Ok(&self.available_players),
            Container::RoundPlayers(id) => Ok(&self.round(id)?.players),
            Container::RoundWinners(id) => Ok(&self.round(id)?.winners),
            Container::RoundLosers(id) => Ok(&self.round(id)?.losers),
        }
    }

    fn container_players_mut(
        &mut self,
        container: Container,
    ) -> Result<&mut Vec<Player>, TournamentError> {
        match container {
            Container::Dashboard => Ok(&mut self.available_players),
            Container::RoundPlayers(id) => Ok(&mut self.round_mut(id)?.players),
            Container::RoundWinners(id) => Ok(&mut self.round_mut(id)?.winners),
            Container::RoundLosers(id) => Ok(&mut self.round_mut(id)?.losers),
        }
    }

    /// How many containers currently hold this player id (dashboard plus all
    /// round lists). Exactly 1 for every tracked player outside a transfer.
    pub fn containment_count(&self, player_id: PlayerId) -> usize {
        let mut count = self
            .available_players
            .iter()
            .filter(|p| p.id == player_id)
            .count();
        for round in &self.rounds {
            count += round.players.iter().filter(|p| p.id == player_id).count();
            count += round.winners.iter().filter(|p| p.id == player_id).count();
            count += round.losers.iter().filter(|p| p.id == player_id).count();
        }
        count
    }

    /// Move one player between containers. Every movement in the engine
    /// funnels through here: removal happens before insertion, the
    /// conservation invariant is asserted in between, and frozen rounds are
    /// rejected even if a caller forgot its own guard.
    pub fn transfer(
        &mut self,
        player_id: PlayerId,
        from: Container,
        to: Container,
    ) -> Result<(), TournamentError> {
        self.ensure_container_unfrozen(from)?;
        self.ensure_container_unfrozen(to)?;

        let source = self.container_players_mut(from)?;
        let pos = source
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?;
        let mut player = source.remove(pos);

        debug_assert_eq!(
            self.containment_count(player_id),
            0,
            "player must be in no container mid-transfer"
        );

        player.selected = false;
        player.current_match = None;
        match to {
            Container::Dashboard => {
                player.status = PlayerStatus::Available;
                player.current_round = None;
            }
            Container::RoundPlayers(round_id) => {
                player.status = PlayerStatus::InRound;
                player.current_round = Some(round_id);
            }
            Container::RoundWinners(round_id) => {
                player.status = PlayerStatus::Winner;
                player.current_round = Some(round_id);
            }
            Container::RoundLosers(round_id) => {
                player.status = PlayerStatus::Eliminated;
                player.current_round = Some(round_id);
            }
        }
        self.container_players_mut(to)?.push(player);
        Ok(())
    }
}

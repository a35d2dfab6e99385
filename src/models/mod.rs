//! Data structures for the billiards bracket: players, matches, rounds, tournament state.

mod game;
mod player;
mod round;
mod tournament;

pub use game::{Match, MatchId, MatchStatus};
pub use player::{AdvancementEntry, Player, PlayerId, PlayerStatus, RoundOutcome, SkillLevel};
pub use round::{Round, RoundId, RoundStatus};
pub use tournament::{Container, Tournament, TournamentError, TournamentId, WinnerEntry};

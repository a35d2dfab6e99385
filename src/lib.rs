//! Billiards tournament web app: library with models and bracket logic.

pub mod logic;
pub mod models;

pub use logic::{
    cancel_match, close_round, create_round, delete_round, freeze_round, move_players,
    recompute_standings, select_winner, set_winner_title, shuffle_round, standard_display_name,
    start_match, start_tournament,
};
pub use models::{
    AdvancementEntry, Container, Match, MatchId, MatchStatus, Player, PlayerId, PlayerStatus,
    Round, RoundId, RoundOutcome, RoundStatus, SkillLevel, Tournament, TournamentError,
    TournamentId, WinnerEntry,
};

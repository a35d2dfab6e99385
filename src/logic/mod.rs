//! Bracket business logic: round lifecycle, player movement, matches, standings.

mod matches;
mod movement;
mod rounds;
mod standings;

pub use matches::{cancel_match, select_winner, shuffle_round, start_match};
pub use movement::move_players;
pub use rounds::{
    close_round, create_round, delete_round, freeze_round, standard_display_name,
    start_tournament,
};
pub use standings::{recompute_standings, set_winner_title};

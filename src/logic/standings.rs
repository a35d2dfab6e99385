//! Winner ledger: derived standings across all rounds.

use crate::models::{PlayerId, Tournament, TournamentError, WinnerEntry};
use std::collections::HashMap;

/// Rebuild `winners_to_display` from the match records.
///
/// Every completed match contributes its winner; each player keeps only
/// their most recent win (by `won_at`). Entries are ordered newest win
/// first and ranked 1..n; organizer-assigned titles survive by player id.
/// Deriving the ledger from matches makes the one-entry-per-player rule
/// structural rather than maintained at every call site.
pub fn recompute_standings(tournament: &mut Tournament) {
    let titles: HashMap<PlayerId, String> = tournament
        .winners_to_display
        .iter()
        .filter_map(|e| e.title.clone().map(|t| (e.player_id, t)))
        .collect();

    let mut best: HashMap<PlayerId, WinnerEntry> = HashMap::new();
    for round in &tournament.rounds {
        for game in &round.matches {
            let (winner_id, won_at) = match (game.winner, game.won_at) {
                (Some(id), Some(at)) => (id, at),
                _ => continue,
            };
            let name = if game.player1.id == winner_id {
                game.player1.name.clone()
            } else {
                game.player2.name.clone()
            };
            let candidate = WinnerEntry {
                player_id: winner_id,
                player_name: name,
                round_id: round.id,
                round_name: round.display_name.clone(),
                won_at,
                rank: 0,
                title: titles.get(&winner_id).cloned(),
            };
            match best.get(&winner_id) {
                Some(existing) if existing.won_at >= won_at => {}
                _ => {
                    best.insert(winner_id, candidate);
                }
            }
        }
    }

    let mut entries: Vec<WinnerEntry> = best.into_values().collect();
    entries.sort_by(|a, b| b.won_at.cmp(&a.won_at));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
    tournament.winners_to_display = entries;
}

/// Set (or clear, with a blank string) the title on a player's ledger entry.
pub fn set_winner_title(
    tournament: &mut Tournament,
    player_id: PlayerId,
    title: &str,
) -> Result<(), TournamentError> {
    let entry = tournament
        .winners_to_display
        .iter_mut()
        .find(|e| e.player_id == player_id)
        .ok_or(TournamentError::PlayerNotFound(player_id))?;
    let title = title.trim();
    entry.title = if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    };
    Ok(())
}

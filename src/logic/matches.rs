//! Match formation and lifecycle: shuffle, start, winner selection, cancel.

use crate::logic::standings::recompute_standings;
use crate::models::{
    Container, Match, MatchId, MatchStatus, PlayerId, PlayerStatus, RoundId, RoundOutcome,
    RoundStatus, Tournament, TournamentError,
};
use chrono::Utc;
use rand::seq::SliceRandom;

/// Pair a round's unmatched players into new pending matches.
///
/// Only players not already referenced by an existing match are shuffled, so
/// newly added players can be paired without disturbing earlier pairings.
/// The unmatched count must be even. Pairing is a uniform random permutation
/// (unseeded); callers get back the ids of the matches created.
pub fn shuffle_round(
    tournament: &mut Tournament,
    round_id: RoundId,
) -> Result<Vec<MatchId>, TournamentError> {
    let round = tournament.round(round_id)?;
    if round.is_frozen {
        return Err(TournamentError::FrozenRound {
            round: round.display_name.clone(),
        });
    }
    let mut unmatched = round.unmatched_player_ids();
    if unmatched.len() % 2 != 0 {
        return Err(TournamentError::OddUnmatchedCount {
            round: round.display_name.clone(),
            unmatched: unmatched.len(),
        });
    }

    unmatched.shuffle(&mut rand::thread_rng());

    let round = tournament.round_mut(round_id)?;
    let mut created = Vec::with_capacity(unmatched.len() / 2);
    for pair in unmatched.chunks_exact(2) {
        let player1 = round
            .players
            .iter()
            .find(|p| p.id == pair[0])
            .cloned()
            .ok_or(TournamentError::PlayerNotFound(pair[0]))?;
        let player2 = round
            .players
            .iter()
            .find(|p| p.id == pair[1])
            .cloned()
            .ok_or(TournamentError::PlayerNotFound(pair[1]))?;
        let mut game = Match::new(player1, player2);
        game.table_number = Some(round.matches.len() as u32 + 1);
        for &pid in pair {
            if let Some(p) = round.players.iter_mut().find(|p| p.id == pid) {
                p.status = PlayerStatus::InMatch;
                p.current_match = Some(game.id);
            }
        }
        created.push(game.id);
        round.matches.push(game);
    }
    if !created.is_empty() && round.status == RoundStatus::Pending {
        round.status = RoundStatus::Active;
    }
    Ok(created)
}

/// Start a pending match. No side effects on players.
pub fn start_match(tournament: &mut Tournament, match_id: MatchId) -> Result<(), TournamentError> {
    let (round_id, index) = tournament.locate_match(match_id)?;
    let round = tournament.round_mut(round_id)?;
    if round.is_frozen {
        return Err(TournamentError::FrozenRound {
            round: round.display_name.clone(),
        });
    }
    let game = &mut round.matches[index];
    if game.status != MatchStatus::Pending {
        return Err(TournamentError::MatchNotPending(match_id));
    }
    game.status = MatchStatus::Active;
    Ok(())
}

/// Record (or change) the winner of a match.
///
/// First selection completes the match: the winner moves to the round's
/// winners list, the loser to its losers list. Selecting the other player on
/// an already-completed match swaps the two: the previous winner is demoted
/// to the losers list, the previous loser promoted. Selecting the same
/// winner again is a no-op. The winner ledger is recomputed afterwards.
pub fn select_winner(
    tournament: &mut Tournament,
    match_id: MatchId,
    winner_id: PlayerId,
) -> Result<(), TournamentError> {
    let (round_id, index) = tournament.locate_match(match_id)?;
    let round = tournament.round(round_id)?;
    if round.is_frozen {
        return Err(TournamentError::FrozenRound {
            round: round.display_name.clone(),
        });
    }
    let game = &round.matches[index];
    let loser_id = game
        .opponent_of(winner_id)
        .map(|p| p.id)
        .ok_or(TournamentError::PlayerNotInMatch(winner_id))?;
    let previous_winner = game.winner;

    if previous_winner == Some(winner_id) {
        return Ok(());
    }

    // Validate container membership up front so the two transfers below
    // cannot fail halfway through.
    match previous_winner {
        None => {
            for id in [winner_id, loser_id] {
                if !round.players.iter().any(|p| p.id == id) {
                    return Err(TournamentError::PlayerNotFound(id));
                }
            }
        }
        Some(prev) => {
            if !round.winners.iter().any(|p| p.id == prev) {
                return Err(TournamentError::PlayerNotFound(prev));
            }
            if !round.losers.iter().any(|p| p.id == winner_id) {
                return Err(TournamentError::PlayerNotFound(winner_id));
            }
        }
    }

    match previous_winner {
        None => {
            tournament.transfer(
                winner_id,
                Container::RoundPlayers(round_id),
                Container::RoundWinners(round_id),
            )?;
            tournament.transfer(
                loser_id,
                Container::RoundPlayers(round_id),
                Container::RoundLosers(round_id),
            )?;
            stamp_outcome(tournament, round_id, winner_id, RoundOutcome::Won, true)?;
            stamp_outcome(tournament, round_id, loser_id, RoundOutcome::Lost, true)?;
        }
        Some(prev) => {
            tournament.transfer(
                prev,
                Container::RoundWinners(round_id),
                Container::RoundLosers(round_id),
            )?;
            tournament.transfer(
                winner_id,
                Container::RoundLosers(round_id),
                Container::RoundWinners(round_id),
            )?;
            stamp_outcome(tournament, round_id, prev, RoundOutcome::Demoted, false)?;
            stamp_outcome(tournament, round_id, winner_id, RoundOutcome::Won, false)?;
        }
    }

    let round = tournament.round_mut(round_id)?;
    let game = &mut round.matches[index];
    game.winner = Some(winner_id);
    game.won_at = Some(Utc::now());
    game.status = MatchStatus::Completed;

    recompute_standings(tournament);
    Ok(())
}

/// Cancel a not-yet-completed match: the pairing was a mistake, so both
/// participants return to the tournament-wide available pool.
pub fn cancel_match(tournament: &mut Tournament, match_id: MatchId) -> Result<(), TournamentError> {
    let (round_id, index) = tournament.locate_match(match_id)?;
    let round = tournament.round(round_id)?;
    if round.is_frozen {
        return Err(TournamentError::FrozenRound {
            round: round.display_name.clone(),
        });
    }
    let game = &round.matches[index];
    if game.status == MatchStatus::Completed {
        return Err(TournamentError::MatchAlreadyCompleted(match_id));
    }
    let participant_ids = [game.player1.id, game.player2.id];
    for id in participant_ids {
        if !round.players.iter().any(|p| p.id == id) {
            return Err(TournamentError::PlayerNotFound(id));
        }
    }

    tournament.round_mut(round_id)?.matches.remove(index);
    for id in participant_ids {
        tournament.transfer(id, Container::RoundPlayers(round_id), Container::Dashboard)?;
    }
    Ok(())
}

/// Append an advancement entry for a player in one of the round's outcome
/// lists, optionally counting the match as played.
fn stamp_outcome(
    tournament: &mut Tournament,
    round_id: RoundId,
    player_id: PlayerId,
    outcome: RoundOutcome,
    count_match: bool,
) -> Result<(), TournamentError> {
    let round = tournament.round_mut(round_id)?;
    let player = round
        .winners
        .iter_mut()
        .chain(round.losers.iter_mut())
        .find(|p| p.id == player_id)
        .ok_or(TournamentError::PlayerNotFound(player_id))?;
    player.record_outcome(round_id, outcome);
    if count_match {
        player.matches_played += 1;
    }
    Ok(())
}

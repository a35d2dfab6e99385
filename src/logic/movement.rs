//! Player movement between the dashboard pool and round containers.

use crate::models::{
    Container, MatchStatus, PlayerId, RoundId, Tournament, TournamentError,
};

/// Per-player data gathered during validation, before any mutation.
struct PendingMove {
    player_id: PlayerId,
    target: Container,
}

/// Move the selected players from one container to another.
///
/// Validation runs to completion before anything is mutated; on error the
/// tournament is untouched. Rules, in order:
/// - the selection must be non-empty and fully present in the source;
/// - a recorded round winner sent to the dashboard is redirected to the
///   winners list of the round they last won;
/// - players still sitting in an unfinished match cannot be moved;
/// - neither the source round nor any destination round may be frozen;
/// - a destination active list must end up with an even player count
///   (winners/losers lists and the dashboard are exempt);
/// - a winners list only accepts that round's recorded winners;
/// - a player with a standing win cannot be moved to a round earlier than
///   the round they last won.
pub fn move_players(
    tournament: &mut Tournament,
    player_ids: &[PlayerId],
    source: Container,
    target: Container,
) -> Result<(), TournamentError> {
    if player_ids.is_empty() {
        return Err(TournamentError::NoPlayersSelected);
    }

    ensure_unfrozen(tournament, source)?;

    // Selection must be fully present in the source container.
    let source_players = tournament.container_players(source)?;
    let mut selected = Vec::with_capacity(player_ids.len());
    for &id in player_ids {
        let player = source_players
            .iter()
            .find(|p| p.id == id)
            .ok_or(TournamentError::PlayerNotFound(id))?;
        selected.push((id, player.name.clone(), player.last_winning_round()));
    }

    // Players paired into an unfinished match stay put until the match is
    // completed or cancelled.
    if let Container::RoundPlayers(round_id) = source {
        let round = tournament.round(round_id)?;
        for (id, name, _) in &selected {
            let in_open_match = round
                .matches
                .iter()
                .any(|m| m.status != MatchStatus::Completed && m.contains(*id));
            if in_open_match {
                return Err(TournamentError::PlayerStillInMatch {
                    player: name.clone(),
                    round: round.display_name.clone(),
                });
            }
        }
    }

    // Resolve per-player effective targets (dashboard redirect for recorded
    // winners), dropping no-op moves back into the source container.
    let mut pending: Vec<PendingMove> = Vec::with_capacity(selected.len());
    for (id, _, last_win) in &selected {
        let effective = match (target, last_win) {
            (Container::Dashboard, Some(round_id)) => Container::RoundWinners(*round_id),
            _ => target,
        };
        if effective == source {
            continue;
        }
        pending.push(PendingMove {
            player_id: *id,
            target: effective,
        });
    }

    for mv in &pending {
        ensure_unfrozen(tournament, mv.target)?;
    }

    // Parity: the destination active list must end up even.
    if let Container::RoundPlayers(round_id) = target {
        let incoming = pending
            .iter()
            .filter(|mv| mv.target == Container::RoundPlayers(round_id))
            .count();
        let round = tournament.round(round_id)?;
        let current = round.players.len();
        if incoming > 0 && (current + incoming) % 2 != 0 {
            return Err(TournamentError::OddPlayerCount {
                round: round.display_name.clone(),
                current,
                incoming,
            });
        }
    }

    // Winners lists stay truthful: only that round's recorded winners enter.
    for mv in &pending {
        if let Container::RoundWinners(round_id) = mv.target {
            let (_, name, last_win) = selected
                .iter()
                .find(|(id, _, _)| *id == mv.player_id)
                .ok_or(TournamentError::PlayerNotFound(mv.player_id))?;
            if *last_win != Some(round_id) {
                return Err(TournamentError::NotRoundWinner {
                    player: name.clone(),
                    round: tournament.round(round_id)?.display_name.clone(),
                });
            }
        }
    }

    check_backward_moves(tournament, target, &selected)?;

    for mv in &pending {
        tournament.transfer(mv.player_id, source, mv.target)?;
    }
    Ok(())
}

fn ensure_unfrozen(
    tournament: &Tournament,
    container: Container,
) -> Result<(), TournamentError> {
    if let Some(round_id) = container.round_id() {
        let round = tournament.round(round_id)?;
        if round.is_frozen {
            return Err(TournamentError::FrozenRound {
                round: round.display_name.clone(),
            });
        }
    }
    Ok(())
}

/// Reject moves that would place a recorded winner earlier in the bracket
/// than the round where they last won. Gated on the winning-round index
/// alone, so winners parked on the dashboard (e.g. after a cancelled
/// pairing) cannot slip behind their own win either.
fn check_backward_moves(
    tournament: &Tournament,
    target: Container,
    selected: &[(PlayerId, String, Option<RoundId>)],
) -> Result<(), TournamentError> {
    let target_round = match target.round_id() {
        Some(id) => id,
        None => return Ok(()),
    };
    let target_index = tournament.round_index(target_round)?;

    let mut offenders = Vec::new();
    for (_, name, last_win) in selected {
        if let Some(win_round) = last_win {
            let win_index = tournament.round_index(*win_round)?;
            if target_index < win_index {
                offenders.push(name.clone());
            }
        }
    }
    if offenders.is_empty() {
        Ok(())
    } else {
        Err(TournamentError::InvalidBackwardMove {
            players: offenders,
            round: tournament.round(target_round)?.display_name.clone(),
        })
    }
}

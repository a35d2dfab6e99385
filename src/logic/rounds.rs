//! Round lifecycle: start tournament, create, freeze, delete, close.

use crate::models::{
    Container, Round, RoundId, RoundStatus, Tournament, TournamentError,
};

/// Standard placeholder display name for a 1-based bracket position.
pub fn standard_display_name(position: usize) -> String {
    const ORDINALS: [&str; 8] = [
        "First Round",
        "Second Round",
        "Third Round",
        "Fourth Round",
        "Fifth Round",
        "Sixth Round",
        "Seventh Round",
        "Eighth Round",
    ];
    match ORDINALS.get(position.wrapping_sub(1)) {
        Some(name) => (*name).to_string(),
        None => format!("Round {position}"),
    }
}

/// Start the tournament: create the first round pre-seeded with every
/// registered player. The placeholder name is not claimed in the used-names
/// set, so organizer tooling can keep offering the standard names.
pub fn start_tournament(tournament: &mut Tournament) -> Result<RoundId, TournamentError> {
    if tournament.started {
        return Err(TournamentError::AlreadyStarted);
    }
    if tournament.available_players.len() < 2 {
        return Err(TournamentError::NotEnoughPlayers);
    }

    let round = Round::new(1, standard_display_name(1));
    let round_id = round.id;
    tournament.rounds.push(round);

    let ids: Vec<_> = tournament.available_players.iter().map(|p| p.id).collect();
    for id in ids {
        tournament.transfer(id, Container::Dashboard, Container::RoundPlayers(round_id))?;
    }

    tournament.started = true;
    tournament.selected_round = Some(round_id);
    Ok(round_id)
}

/// Append a new empty round with the given display name and select it.
pub fn create_round(
    tournament: &mut Tournament,
    display_name: &str,
) -> Result<RoundId, TournamentError> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(TournamentError::BlankRoundName);
    }
    if tournament.used_display_names.contains(display_name) {
        return Err(TournamentError::DisplayNameTaken(display_name.to_string()));
    }

    let round = Round::new(tournament.rounds.len() + 1, display_name);
    let round_id = round.id;
    tournament.rounds.push(round);
    tournament.used_display_names.insert(display_name.to_string());
    tournament.selected_round = Some(round_id);
    Ok(round_id)
}

/// Freeze a completed round: every match must have a result and no unmatched
/// players may remain. Frozen rounds reject all further mutation.
pub fn freeze_round(tournament: &mut Tournament, round_id: RoundId) -> Result<(), TournamentError> {
    let round = tournament.round(round_id)?;
    if round.is_frozen {
        return Err(TournamentError::FrozenRound {
            round: round.display_name.clone(),
        });
    }
    let remaining = round.incomplete_match_count();
    if remaining > 0 {
        return Err(TournamentError::IncompleteMatches {
            round: round.display_name.clone(),
            remaining,
        });
    }
    let stragglers = round.unmatched_player_ids().len();
    if stragglers > 0 {
        return Err(TournamentError::UnmatchedPlayers {
            round: round.display_name.clone(),
            count: stragglers,
        });
    }

    let round = tournament.round_mut(round_id)?;
    round.is_frozen = true;
    round.status = RoundStatus::Completed;
    Ok(())
}

/// Delete the last round of the bracket. It must be completely empty, and at
/// least one round always remains.
pub fn delete_round(tournament: &mut Tournament, round_id: RoundId) -> Result<(), TournamentError> {
    let index = tournament.round_index(round_id)?;
    if index == 0 {
        return Err(TournamentError::CannotDeleteFirstRound);
    }
    if index != tournament.rounds.len() - 1 {
        return Err(TournamentError::NotLastRound {
            round: tournament.rounds[index].display_name.clone(),
        });
    }
    remove_empty_round(tournament, round_id)
}

/// Close (remove) an empty round at any bracket position.
pub fn close_round(tournament: &mut Tournament, round_id: RoundId) -> Result<(), TournamentError> {
    remove_empty_round(tournament, round_id)
}

fn remove_empty_round(
    tournament: &mut Tournament,
    round_id: RoundId,
) -> Result<(), TournamentError> {
    let index = tournament.round_index(round_id)?;
    let round = &tournament.rounds[index];
    if !round.is_empty() {
        return Err(TournamentError::RoundNotEmpty {
            round: round.display_name.clone(),
            remaining: round.remaining_summary(),
        });
    }

    let removed = tournament.rounds.remove(index);
    tournament.used_display_names.remove(&removed.display_name);

    if tournament.selected_round == Some(round_id) {
        tournament.selected_round = if tournament.rounds.is_empty() {
            None
        } else {
            // Nearest remaining round: the one before, else the new occupant
            // of this position.
            let fallback = index.min(tournament.rounds.len() - 1);
            Some(tournament.rounds[fallback].id)
        };
    }
    Ok(())
}

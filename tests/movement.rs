//! Integration tests for player movement between the dashboard and round lists.

use billiards_tournament_web::{
    cancel_match, create_round, move_players, select_winner, shuffle_round, start_tournament,
    Container, PlayerId, PlayerStatus, RoundId, SkillLevel, Tournament, TournamentError,
};

fn started_tournament(n: usize) -> (Tournament, RoundId) {
    let mut t = Tournament::new();
    for i in 0..n {
        t.register_player(
            format!("P{i}"),
            format!("p{i}@club.test"),
            SkillLevel::Intermediate,
            None,
        )
        .unwrap();
    }
    let round_id = start_tournament(&mut t).unwrap();
    (t, round_id)
}

fn complete_all_matches(t: &mut Tournament, round_id: RoundId) {
    let picks: Vec<_> = t
        .round(round_id)
        .unwrap()
        .matches
        .iter()
        .map(|m| (m.id, m.player1.id))
        .collect();
    for (match_id, winner) in picks {
        select_winner(t, match_id, winner).unwrap();
    }
}

fn winner_ids(t: &Tournament, round_id: RoundId) -> Vec<PlayerId> {
    t.round(round_id).unwrap().winners.iter().map(|p| p.id).collect()
}

fn all_player_ids(t: &Tournament) -> Vec<PlayerId> {
    let mut ids: Vec<_> = t.available_players.iter().map(|p| p.id).collect();
    for r in &t.rounds {
        ids.extend(r.players.iter().map(|p| p.id));
        ids.extend(r.winners.iter().map(|p| p.id));
        ids.extend(r.losers.iter().map(|p| p.id));
    }
    ids
}

#[test]
fn empty_selection_is_rejected() {
    let (mut t, first) = started_tournament(4);
    assert!(matches!(
        move_players(&mut t, &[], Container::RoundPlayers(first), Container::Dashboard),
        Err(TournamentError::NoPlayersSelected)
    ));
}

#[test]
fn selection_must_be_in_source_container() {
    let (mut t, first) = started_tournament(4);
    create_round(&mut t, "Semifinal").unwrap();
    let semi = t.rounds[1].id;
    let some_player = t.round(first).unwrap().players[0].id;
    assert!(matches!(
        move_players(
            &mut t,
            &[some_player],
            Container::RoundPlayers(semi),
            Container::Dashboard
        ),
        Err(TournamentError::PlayerNotFound(_))
    ));
}

#[test]
fn odd_move_into_active_list_is_rejected_then_even_succeeds() {
    let (mut t, first) = started_tournament(8);
    shuffle_round(&mut t, first).unwrap();
    complete_all_matches(&mut t, first);

    create_round(&mut t, "Semifinal").unwrap();
    let semi = t.rounds[1].id;
    let winners = winner_ids(&t, first);
    assert_eq!(winners.len(), 4);

    let err = move_players(
        &mut t,
        &winners[..3],
        Container::RoundWinners(first),
        Container::RoundPlayers(semi),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TournamentError::OddPlayerCount {
            current: 0,
            incoming: 3,
            ..
        }
    ));
    // Nothing was partially applied.
    assert_eq!(t.round(first).unwrap().winners.len(), 4);
    assert!(t.round(semi).unwrap().players.is_empty());

    move_players(
        &mut t,
        &winners,
        Container::RoundWinners(first),
        Container::RoundPlayers(semi),
    )
    .unwrap();
    let semi_round = t.round(semi).unwrap();
    assert_eq!(semi_round.players.len(), 4);
    assert!(t.round(first).unwrap().winners.is_empty());
    for p in &semi_round.players {
        assert_eq!(p.status, PlayerStatus::InRound);
        assert_eq!(p.current_round, Some(semi));
        assert!(!p.selected);
    }
}

#[test]
fn moves_conserve_players_across_containers() {
    let (mut t, first) = started_tournament(8);
    shuffle_round(&mut t, first).unwrap();
    complete_all_matches(&mut t, first);

    create_round(&mut t, "Semifinal").unwrap();
    let semi = t.rounds[1].id;
    let winners = winner_ids(&t, first);
    move_players(
        &mut t,
        &winners,
        Container::RoundWinners(first),
        Container::RoundPlayers(semi),
    )
    .unwrap();

    let ids = all_player_ids(&t);
    assert_eq!(ids.len(), 8);
    for id in ids {
        assert_eq!(t.containment_count(id), 1);
    }
}

#[test]
fn losers_can_be_moved_into_a_later_round() {
    let (mut t, first) = started_tournament(4);
    shuffle_round(&mut t, first).unwrap();
    complete_all_matches(&mut t, first);

    create_round(&mut t, "Consolation").unwrap();
    let consolation = t.rounds[1].id;
    let losers: Vec<_> = t.round(first).unwrap().losers.iter().map(|p| p.id).collect();
    move_players(
        &mut t,
        &losers,
        Container::RoundLosers(first),
        Container::RoundPlayers(consolation),
    )
    .unwrap();
    assert_eq!(t.round(consolation).unwrap().players.len(), 2);
    assert!(t.round(first).unwrap().losers.is_empty());
}

#[test]
fn recorded_winner_sent_to_dashboard_is_redirected_to_their_winners_list() {
    let (mut t, first) = started_tournament(4);
    shuffle_round(&mut t, first).unwrap();
    complete_all_matches(&mut t, first);

    create_round(&mut t, "Semifinal").unwrap();
    let semi = t.rounds[1].id;
    let winners = winner_ids(&t, first);
    move_players(
        &mut t,
        &winners,
        Container::RoundWinners(first),
        Container::RoundPlayers(semi),
    )
    .unwrap();

    // Sending one of them "to the dashboard" must land in First Round's
    // winners list, not the available pool. The resulting odd winners-list
    // count is allowed.
    move_players(
        &mut t,
        &winners[..1],
        Container::RoundPlayers(semi),
        Container::Dashboard,
    )
    .unwrap();
    assert!(t.available_players.is_empty());
    assert_eq!(t.round(first).unwrap().winners.len(), 1);
    assert_eq!(t.round(first).unwrap().winners[0].id, winners[0]);
    assert_eq!(t.round(first).unwrap().winners[0].status, PlayerStatus::Winner);
    assert_eq!(t.round(semi).unwrap().players.len(), 1);
}

#[test]
fn only_recorded_round_winners_enter_a_winners_list() {
    let (mut t, first) = started_tournament(4);
    shuffle_round(&mut t, first).unwrap();
    complete_all_matches(&mut t, first);

    let a_loser = t.round(first).unwrap().losers[0].id;
    assert!(matches!(
        move_players(
            &mut t,
            &[a_loser],
            Container::RoundLosers(first),
            Container::RoundWinners(first)
        ),
        Err(TournamentError::NotRoundWinner { .. })
    ));
}

#[test]
fn winner_cannot_move_earlier_than_their_last_winning_round() {
    let (mut t, first) = started_tournament(8);
    shuffle_round(&mut t, first).unwrap();
    complete_all_matches(&mut t, first);

    create_round(&mut t, "Semifinal").unwrap();
    let semi = t.rounds[1].id;
    let winners = winner_ids(&t, first);
    move_players(
        &mut t,
        &winners,
        Container::RoundWinners(first),
        Container::RoundPlayers(semi),
    )
    .unwrap();
    shuffle_round(&mut t, semi).unwrap();
    complete_all_matches(&mut t, semi);

    // The two semifinal winners last won in the semifinal; First Round is
    // behind that mark.
    let semi_winners = winner_ids(&t, semi);
    assert_eq!(semi_winners.len(), 2);
    let err = move_players(
        &mut t,
        &semi_winners,
        Container::RoundWinners(semi),
        Container::RoundPlayers(first),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TournamentError::InvalidBackwardMove { ref players, .. } if players.len() == 2
    ));
    assert_eq!(t.round(semi).unwrap().winners.len(), 2);
}

#[test]
fn dashboard_winner_still_cannot_move_behind_their_last_win() {
    let (mut t, first) = started_tournament(8);
    shuffle_round(&mut t, first).unwrap();
    complete_all_matches(&mut t, first);

    create_round(&mut t, "Semifinal").unwrap();
    let semi = t.rounds[1].id;
    let first_winners = winner_ids(&t, first);
    move_players(
        &mut t,
        &first_winners,
        Container::RoundWinners(first),
        Container::RoundPlayers(semi),
    )
    .unwrap();
    shuffle_round(&mut t, semi).unwrap();
    complete_all_matches(&mut t, semi);

    // Advance the two semifinal winners to the final and cancel their
    // pairing: cancellation parks them on the dashboard.
    create_round(&mut t, "Final").unwrap();
    let final_round = t.rounds[2].id;
    let semi_winners = winner_ids(&t, semi);
    move_players(
        &mut t,
        &semi_winners,
        Container::RoundWinners(semi),
        Container::RoundPlayers(final_round),
    )
    .unwrap();
    let pairing = shuffle_round(&mut t, final_round).unwrap();
    cancel_match(&mut t, pairing[0]).unwrap();
    assert_eq!(t.available_players.len(), 2);

    // From the dashboard they still cannot land behind their semifinal win.
    let err = move_players(
        &mut t,
        &semi_winners,
        Container::Dashboard,
        Container::RoundPlayers(first),
    )
    .unwrap_err();
    assert!(matches!(err, TournamentError::InvalidBackwardMove { .. }));
    assert_eq!(t.available_players.len(), 2);

    // Their own winning round is not "earlier": the move is allowed.
    move_players(
        &mut t,
        &semi_winners,
        Container::Dashboard,
        Container::RoundPlayers(semi),
    )
    .unwrap();
    assert_eq!(t.round(semi).unwrap().players.len(), 2);
    assert!(t.available_players.is_empty());
}

#[test]
fn players_in_an_unfinished_match_stay_put() {
    let (mut t, first) = started_tournament(4);
    shuffle_round(&mut t, first).unwrap();
    let paired = t.round(first).unwrap().players[0].id;
    assert!(matches!(
        move_players(
            &mut t,
            &[paired],
            Container::RoundPlayers(first),
            Container::Dashboard
        ),
        Err(TournamentError::PlayerStillInMatch { .. })
    ));
}

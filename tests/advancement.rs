//! Integration tests for result reporting, winner propagation and the state controller.

use bracket_engine_web::{
    advance_round, finalize, generate_bracket, report_result, ByePolicy, GameMatch, MatchStatus,
    ParticipantRef, Tournament, TournamentError, TournamentFormat, TournamentStatus,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn generated(n: usize, seed: u64) -> (Tournament, Vec<GameMatch>) {
    let mut t = Tournament::new("Cup", TournamentFormat::Bracket, 64);
    t.status = TournamentStatus::Live;
    let players: Vec<_> = (0..n).map(|i| ParticipantRef::new(format!("P{i}"))).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let g = generate_bracket(&mut t, &players, ByePolicy::TopSeeds, &mut rng, Utc::now()).unwrap();
    (t, g.matches)
}

fn find(matches: &[GameMatch], round: u32, number: u32) -> &GameMatch {
    matches
        .iter()
        .find(|m| m.round == round && m.match_number == number)
        .unwrap()
}

/// Check that every match past round 1 holds exactly the winners of its two feeders.
fn assert_feeders(matches: &[GameMatch]) {
    for m in matches.iter().filter(|m| m.round > 1) {
        let a = find(matches, m.round - 1, 2 * m.match_number - 1);
        let b = find(matches, m.round - 1, 2 * m.match_number);
        assert_eq!(Some(m.player_1_id), a.winner_id);
        assert_eq!(m.player_2_id, b.winner_id);
    }
}

#[derive(Clone, Copy, Debug)]
enum Order {
    Created,
    Reversed,
    DeepestFirst,
}

/// Next pending match to report under `order`.
fn next_pending(matches: &[GameMatch], order: Order) -> Option<uuid::Uuid> {
    let mut pending = matches.iter().filter(|m| !m.is_completed());
    let m = match order {
        Order::Created => pending.next(),
        Order::Reversed => pending.last(),
        Order::DeepestFirst => pending.max_by_key(|m| (m.round, m.match_number)),
    };
    m.map(|m| m.id)
}

#[test]
fn full_brackets_play_out_to_one_champion() {
    for order in [Order::Created, Order::Reversed, Order::DeepestFirst] {
        for n in 2..=20 {
            play_out(n, order);
        }
    }
}

fn play_out(n: usize, order: Order) {
    let (mut t, mut matches) = generated(n, n as u64);
    let size = n.next_power_of_two();

    loop {
        let Some(id) = next_pending(&matches, order) else { break };
        assert!(!t.is_completed(), "completed before the final, n = {n}, {order:?}");
        let outcome = report_result(&mut t, &mut matches, id, 3, 1, Utc::now()).unwrap();
        assert_eq!(outcome.updated.status, MatchStatus::Completed);
        assert_eq!(outcome.updated.winner_id, Some(outcome.updated.player_1_id));
        let is_final = outcome.updated.round == t.total_rounds;
        assert_eq!(outcome.champion.is_some(), is_final);
        assert_feeders(&matches);
    }

    assert_eq!(matches.len(), size - 1, "n = {n}, {order:?}");
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.current_round, t.total_rounds);
    let final_match = find(&matches, t.total_rounds, 1);
    assert_eq!(t.winner_id, final_match.winner_id);
    assert!(t.completed_at.is_some());
}

#[test]
fn next_round_waits_for_sibling_and_keeps_order() {
    let (mut t, mut matches) = generated(4, 11);
    let m1 = find(&matches, 1, 1).clone();
    let m2 = find(&matches, 1, 2).clone();

    // Report the second match first: nothing to create yet.
    let outcome = report_result(&mut t, &mut matches, m2.id, 0, 2, Utc::now()).unwrap();
    assert!(outcome.created.is_empty());
    assert!(!outcome.round_advanced);
    assert_eq!(outcome.updated.winner_id, m2.player_2_id);

    let outcome = report_result(&mut t, &mut matches, m1.id, 5, 4, Utc::now()).unwrap();
    assert_eq!(outcome.created.len(), 1);
    let final_match = &outcome.created[0];
    assert_eq!((final_match.round, final_match.match_number), (2, 1));
    assert_eq!(final_match.player_1_id, m1.player_1_id);
    assert_eq!(final_match.player_2_id, m2.player_2_id);
    assert!(outcome.round_advanced);
    assert_eq!(t.current_round, 2);
}

#[test]
fn bye_fed_match_reported_early_waits_for_the_other_half() {
    // 5 players: matches 1-3 are byes, so round 2 match 1 exists before match 4 is played.
    let (mut t, mut matches) = generated(5, 1);
    let early = find(&matches, 2, 1).clone();
    let last_r1 = find(&matches, 1, 4).id;
    assert!(!find(&matches, 1, 4).is_completed());

    let outcome = report_result(&mut t, &mut matches, early.id, 2, 1, Utc::now()).unwrap();
    assert!(outcome.created.is_empty());
    assert!(outcome.champion.is_none());
    assert!(matches.iter().all(|m| m.round < 3));
    assert_eq!(t.status, TournamentStatus::Live);
    assert!(t.winner_id.is_none());
    assert_eq!(t.current_round, 1);

    let outcome = report_result(&mut t, &mut matches, last_r1, 0, 1, Utc::now()).unwrap();
    assert_eq!(outcome.created.len(), 1);
    let semi = outcome.created[0].clone();
    assert_eq!((semi.round, semi.match_number), (2, 2));
    assert_eq!(t.current_round, 2);

    let outcome = report_result(&mut t, &mut matches, semi.id, 4, 0, Utc::now()).unwrap();
    let final_match = outcome.created[0].clone();
    assert_eq!((final_match.round, final_match.match_number), (3, 1));
    assert_eq!(final_match.player_1_id, early.player_1_id);
    assert_eq!(final_match.player_2_id, Some(semi.player_1_id));
    assert_eq!(t.status, TournamentStatus::Live);

    report_result(&mut t, &mut matches, final_match.id, 1, 0, Utc::now()).unwrap();
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.winner_id, Some(early.player_1_id));
    assert_eq!(matches.len(), 7);
}

#[test]
fn tie_is_rejected_and_match_stays_pending() {
    let (mut t, mut matches) = generated(4, 2);
    let id = find(&matches, 1, 1).id;
    let before = (t.clone(), matches.clone());

    let err = report_result(&mut t, &mut matches, id, 2, 2, Utc::now()).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidScore(_)));
    assert_eq!(find(&matches, 1, 1).status, MatchStatus::Pending);
    assert_eq!((t, matches), before);
}

#[test]
fn negative_score_is_rejected() {
    let (mut t, mut matches) = generated(2, 2);
    let id = matches[0].id;
    assert!(matches!(
        report_result(&mut t, &mut matches, id, -1, 0, Utc::now()),
        Err(TournamentError::InvalidScore(_))
    ));
}

#[test]
fn double_report_is_rejected() {
    let (mut t, mut matches) = generated(4, 5);
    let id = find(&matches, 1, 1).id;
    report_result(&mut t, &mut matches, id, 1, 0, Utc::now()).unwrap();
    assert_eq!(
        report_result(&mut t, &mut matches, id, 0, 1, Utc::now()),
        Err(TournamentError::AlreadyCompleted(id))
    );

    // Byes are completed at generation and cannot be scored.
    let (mut t, mut matches) = generated(3, 5);
    let bye = find(&matches, 1, 1).id;
    assert_eq!(
        report_result(&mut t, &mut matches, bye, 1, 0, Utc::now()),
        Err(TournamentError::AlreadyCompleted(bye))
    );
}

#[test]
fn unknown_match_is_not_found() {
    let (mut t, mut matches) = generated(2, 0);
    let id = uuid::Uuid::new_v4();
    assert_eq!(
        report_result(&mut t, &mut matches, id, 1, 0, Utc::now()),
        Err(TournamentError::MatchNotFound(id))
    );
}

#[test]
fn existing_next_match_is_not_duplicated() {
    let (mut t, mut matches) = generated(8, 4);
    let m1 = find(&matches, 1, 1).id;
    let m2 = find(&matches, 1, 2).id;
    report_result(&mut t, &mut matches, m1, 1, 0, Utc::now()).unwrap();
    report_result(&mut t, &mut matches, m2, 1, 0, Utc::now()).unwrap();
    let count = matches.len();

    // Replay the second feeder as if a concurrent report had raced it.
    let idx = matches.iter().position(|m| m.id == m2).unwrap();
    matches[idx].status = MatchStatus::Pending;
    matches[idx].winner_id = None;
    let outcome = report_result(&mut t, &mut matches, m2, 1, 0, Utc::now()).unwrap();
    assert!(outcome.created.is_empty());
    assert_eq!(matches.len(), count);
    assert_eq!(matches.iter().filter(|m| m.round == 2 && m.match_number == 1).count(), 1);
}

#[test]
fn only_the_final_completes_the_tournament() {
    let (mut t, mut matches) = generated(3, 8);
    // Round 1: match 1 is a bye, match 2 is real.
    let semi = find(&matches, 1, 2).id;
    let outcome = report_result(&mut t, &mut matches, semi, 2, 0, Utc::now()).unwrap();
    assert!(outcome.champion.is_none());
    assert_eq!(t.status, TournamentStatus::Live);
    assert!(t.winner_id.is_none());

    let final_id = outcome.created[0].id;
    let outcome = report_result(&mut t, &mut matches, final_id, 0, 3, Utc::now()).unwrap();
    assert_eq!(outcome.champion, outcome.updated.player_2_id);
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.winner_id, outcome.champion);
}

#[test]
fn advance_round_is_bookkeeping_only() {
    let mut fresh = Tournament::new("Cup", TournamentFormat::Bracket, 8);
    assert!(matches!(
        advance_round(&mut fresh, &[]),
        Err(TournamentError::InvalidState(_))
    ));

    let (mut t, mut matches) = generated(4, 6);
    assert_eq!(advance_round(&mut t, &matches), Ok(false));
    assert_eq!(t.current_round, 1);

    let m1 = find(&matches, 1, 1).id;
    let m2 = find(&matches, 1, 2).id;
    report_result(&mut t, &mut matches, m1, 1, 0, Utc::now()).unwrap();
    report_result(&mut t, &mut matches, m2, 1, 0, Utc::now()).unwrap();
    assert_eq!(t.current_round, 2);
    let count = matches.len();
    assert_eq!(advance_round(&mut t, &matches), Ok(false));
    assert_eq!(matches.len(), count);

    let final_id = find(&matches, 2, 1).id;
    report_result(&mut t, &mut matches, final_id, 1, 0, Utc::now()).unwrap();
    assert!(matches!(
        advance_round(&mut t, &matches),
        Err(TournamentError::InvalidState(_))
    ));
}

#[test]
fn finalize_is_terminal() {
    let (mut t, matches) = generated(2, 1);
    let champion = matches[0].player_1_id;
    finalize(&mut t, champion, Utc::now()).unwrap();
    assert_eq!(t.status, TournamentStatus::Completed);
    assert!(matches!(
        finalize(&mut t, champion, Utc::now()),
        Err(TournamentError::InvalidState(_))
    ));
}

#[test]
fn status_moves_forward_only() {
    let mut t = Tournament::new("Cup", TournamentFormat::Bracket, 8);
    t.set_status(TournamentStatus::Upcoming).unwrap();
    assert!(t.set_status(TournamentStatus::RegistrationOpen).is_err());
    assert!(t.set_status(TournamentStatus::Completed).is_err());
    t.set_status(TournamentStatus::Live).unwrap();
    assert_eq!(t.status, TournamentStatus::Live);
    assert_eq!(
        serde_json::to_value(TournamentStatus::RegistrationOpen).unwrap(),
        serde_json::json!("registration-open")
    );
}

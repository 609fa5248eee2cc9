//! End-to-end bracket lifecycle tests against the in-memory store.

use knockout_core::{Match, MatchStatus, Participant, ParticipantId, Set, SystemKind, TournamentId};
use knockout_service::store::MemoryStore;
use knockout_service::BracketService;

fn participants(n: u64) -> Vec<Participant> {
    (1..=n)
        .map(|i| Participant {
            id: ParticipantId(i),
            name: format!("team {}", i),
            seed: i,
        })
        .collect()
}

fn straight_sets(winner_slot: usize) -> Vec<Set> {
    let scores = if winner_slot == 0 { [2, 0] } else { [0, 2] };

    vec![
        Set { number: 1, scores },
        Set { number: 2, scores },
    ]
}

fn round(matches: &[Match], round: u64) -> Vec<&Match> {
    matches.iter().filter(|m| m.round == round).collect()
}

#[test]
fn test_eight_player_tournament() {
    let service = BracketService::new(MemoryStore::new());
    let tournament = TournamentId(42);

    let matches = service
        .generate(tournament, SystemKind::SingleElimination, participants(8))
        .unwrap();
    assert_eq!(matches.len(), 7);
    assert!(round(&matches, 1)
        .iter()
        .all(|m| m.status == MatchStatus::Ready));

    // Quarterfinals: the better seed wins everywhere.
    for quarterfinal in round(&matches, 1) {
        let better = if quarterfinal.slots[0].as_ref().unwrap().seed
            < quarterfinal.slots[1].as_ref().unwrap().seed
        {
            0
        } else {
            1
        };

        service
            .report_result(quarterfinal.id, straight_sets(better))
            .unwrap();
    }

    let state = service.bracket_state(tournament).unwrap();
    assert_eq!(state.total_rounds, 3);
    assert_eq!(state.current_round, 2);

    // Seeds 1-4 survived; semifinal 1 pairs 1 and 4, semifinal 2 pairs 2
    // and 3.
    let semifinals = round(&state.matches, 2);
    let seeds: Vec<(u64, u64)> = semifinals
        .iter()
        .map(|m| {
            (
                m.slots[0].as_ref().unwrap().seed,
                m.slots[1].as_ref().unwrap().seed,
            )
        })
        .collect();
    assert_eq!(seeds, vec![(1, 4), (2, 3)]);
    assert!(semifinals.iter().all(|m| m.status == MatchStatus::Ready));

    // Semifinal 1 goes through the explicit start transition.
    let started = service.start(semifinals[0].id).unwrap();
    assert_eq!(started.status, MatchStatus::InProgress);
    service
        .report_result(semifinals[0].id, straight_sets(0))
        .unwrap();

    // Seed 3 withdraws out of semifinal 2; seed 2 advances by forfeit.
    let withdrawal = service.withdraw(tournament, ParticipantId(3)).unwrap();
    assert_eq!(withdrawal.forfeited, vec![semifinals[1].id]);
    assert_eq!(withdrawal.advanced, vec![ParticipantId(2)]);

    let state = service.bracket_state(tournament).unwrap();
    let finale = round(&state.matches, 3)[0];
    assert_eq!(finale.status, MatchStatus::Ready);
    assert_eq!(finale.slots[0].as_ref().unwrap().id, ParticipantId(1));
    assert_eq!(finale.slots[1].as_ref().unwrap().id, ParticipantId(2));

    // Seed 2 upsets seed 1 in the final.
    service.report_result(finale.id, straight_sets(1)).unwrap();

    let state = service.bracket_state(tournament).unwrap();
    assert!(state.complete);
    assert_eq!(state.current_round, 3);
    assert_eq!(state.champion.as_ref().unwrap().id, ParticipantId(2));

    // The result stands corrected: reopening the final clears the champion
    // and makes it playable again.
    let affected = service.reopen(finale.id).unwrap();
    assert_eq!(affected, vec![finale.id]);

    let state = service.bracket_state(tournament).unwrap();
    assert!(!state.complete);
    assert!(state.champion.is_none());
    assert_eq!(state.current_round, 3);

    let finale = round(&state.matches, 3)[0];
    assert_eq!(finale.status, MatchStatus::Ready);
    assert!(finale.sets.is_empty());

    // Seed 1 wins the replay.
    service.report_result(finale.id, straight_sets(0)).unwrap();
    let state = service.bracket_state(tournament).unwrap();
    assert_eq!(state.champion.unwrap().id, ParticipantId(1));
}

#[test]
fn test_deep_reopen_unwinds_three_rounds() {
    let service = BracketService::new(MemoryStore::new());
    let tournament = TournamentId(7);

    let matches = service
        .generate(tournament, SystemKind::SingleElimination, participants(8))
        .unwrap();

    // Slot 0 wins every match; seed 1 becomes champion.
    for r in 1..=3 {
        let state = service.bracket_state(tournament).unwrap();
        for m in round(&state.matches, r) {
            service.report_result(m.id, straight_sets(0)).unwrap();
        }
    }

    let state = service.bracket_state(tournament).unwrap();
    assert_eq!(state.champion.as_ref().unwrap().id, ParticipantId(1));

    // Reopening seed 1's quarterfinal unwinds the semifinal and the final
    // as well, dependents first.
    let quarterfinal = round(&matches, 1)[0].id;
    let affected = service.reopen(quarterfinal).unwrap();

    let state = service.bracket_state(tournament).unwrap();
    let semifinal = round(&state.matches, 2)[0];
    let finale = round(&state.matches, 3)[0];

    assert_eq!(affected, vec![finale.id, semifinal.id, quarterfinal]);

    assert!(!state.complete);
    assert!(state.champion.is_none());
    assert_eq!(state.current_round, 1);

    // Seed 1 is gone from every later round; the other branches stand.
    assert!(semifinal.slots[0].is_none());
    assert!(semifinal.slots[1].is_some());
    assert_eq!(semifinal.status, MatchStatus::Pending);
    assert!(finale.slots[0].is_none());
    assert!(finale.slots[1].is_some());
    assert_eq!(finale.status, MatchStatus::Pending);

    // The reopened quarterfinal is immediately playable again.
    let reopened = round(&state.matches, 1)[0];
    assert_eq!(reopened.status, MatchStatus::Ready);
    assert!(reopened.is_full());
    assert!(reopened.sets.is_empty());
}

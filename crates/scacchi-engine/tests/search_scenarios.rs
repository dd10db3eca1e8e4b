//! Whole-search scenarios: the engine driven the way a controller would.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scacchi_core::{Move, Position};
use scacchi_engine::{Search, TranspositionTable};

fn pos(fen: &str) -> Position {
    fen.parse().unwrap()
}

#[test]
fn no_move_available_returns_sentry() {
    // Black is mated in the corner.
    let root = pos("8/8/8/5K1k/8/8/8/7R b - -");
    let mut tt = TranspositionTable::new(14);
    let mut search = Search::new(&[root], &mut tt);
    search.constraint.max_depth = Some(4);

    let m = search.run(|_| {});
    assert!(m.is_sentry());
}

#[test]
fn time_budget_is_respected() {
    let root = Position::startpos();
    let mut tt = TranspositionTable::new(16);
    let mut search = Search::new(&[root], &mut tt);
    search.constraint.max_time = Some(Duration::from_millis(200));

    let m = search.run(|_| {});
    assert!(!m.is_sentry());
    // Generous slack: the clock is only polled between node batches.
    assert!(search.elapsed() < Duration::from_secs(5));
}

#[test]
fn input_mid_search_returns_last_completed_iteration() {
    // Deterministic "input arrives later": the predicate turns true after
    // a fixed number of polls.
    let polls = Arc::new(AtomicU64::new(0));
    let polls_hook = Arc::clone(&polls);

    let root = pos("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq -");

    // Allow a few polls, then pretend a command arrived.
    let mut tt = TranspositionTable::new(16);
    let mut search = Search::new(&[root], &mut tt);
    search.constraint.input = Some(Box::new(move || {
        polls_hook.fetch_add(1, Ordering::Relaxed) >= 40
    }));

    let mut reported: Vec<Move> = Vec::new();
    let m = search.run(|report| reported.push(report.pv[0]));

    assert!(search.stopped());
    assert!(!m.is_sentry(), "an interrupted search still answers");
    if let Some(&last) = reported.last() {
        assert_eq!(m, last, "the answer is the last completed iteration's move");
    }
}

#[test]
fn middlegame_search_returns_a_legal_move() {
    let root = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -");
    let mut tt = TranspositionTable::new(18);
    let mut search = Search::new(&[root.clone()], &mut tt);
    search.constraint.max_depth = Some(4);

    let m = search.run(|_| {});
    assert!(root.moves().contains(&m));
}

#[test]
fn tt_reuse_across_moves_speeds_the_second_search() {
    // The same table serves consecutive searches of the same game; the
    // second run probes warm entries and must not misbehave.
    let mut tt = TranspositionTable::new(16);
    let first = Position::startpos();

    let m1 = {
        let mut search = Search::new(&[first.clone()], &mut tt);
        search.constraint.max_depth = Some(4);
        search.run(|_| {})
    };
    assert!(first.moves().contains(&m1));

    let second = first.after_move(m1);
    let m2 = {
        let mut search = Search::new(&[first.clone(), second.clone()], &mut tt);
        search.constraint.max_depth = Some(4);
        search.run(|_| {})
    };
    assert!(second.moves().contains(&m2));
}

#[test]
fn repetition_along_the_game_history_is_avoided_or_scored_zero() {
    // Walk the knights out and back twice; the third recurrence would be
    // a draw, and the search must know the history it sits on.
    let mut states = vec![Position::startpos()];
    for text in [
        "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
    ] {
        let mut next = states.last().unwrap().clone();
        let m = next.parse_move(text);
        assert!(next.make_move(m));
        states.push(next);
    }

    // The root position equals the start position for the third time.
    let mut tt = TranspositionTable::new(16);
    let mut search = Search::new(&states, &mut tt);
    search.constraint.max_depth = Some(3);
    let m = search.run(|_| {});

    // The game is already drawn by repetition; the driver still wants a
    // move rather than a resignation.
    assert!(!m.is_sentry());
}

#[test]
fn table_keeps_every_position_of_a_game_reachable() {
    use scacchi_engine::ScoreType;

    // With the always-replace slot, the entry just stored for the
    // current position can always be probed back.
    let mut tt = TranspositionTable::new(10);
    let mut pos = Position::startpos();

    for text in [
        "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5a4", "g8f6", "e1g1",
    ] {
        let m = pos.parse_move(text);
        assert!(!m.is_sentry(), "{text}");

        let draft = (pos.hash() & 0xFF) as i32;
        let value = (pos.hash() & 0xFFF) as i32;
        tt.insert(pos.hash(), m, draft, ScoreType::Exact, value);

        let slot = tt.find(pos.hash()).expect("just inserted");
        assert_eq!(slot.hash(), pos.hash());
        assert_eq!(slot.best_move(), m);
        assert_eq!(slot.draft(), draft);
        assert_eq!(slot.score_type(), ScoreType::Exact);
        assert_eq!(slot.value(), value);

        assert!(pos.make_move(m));
    }
}

#[test]
#[ignore] // slow: the classic Fine-70 corresponding-squares study
fn fine_70_finds_the_winning_king_walk() {
    let root = pos("8/k7/3p4/p2P1p2/P2P1P2/8/8/K7 w - -");
    let mut tt = TranspositionTable::new(21);
    let mut search = Search::new(&[root], &mut tt);
    search.constraint.max_time = Some(Duration::from_secs(10));

    let m = search.run(|_| {});
    assert_eq!(format!("{m}"), "a1b1", "only Kb1 wins Fine-70");
}

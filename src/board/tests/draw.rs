//! Draw detection tests.

use crate::board::Position;

fn play(pos: &mut Position, moves: &[&str]) {
    for uci in moves {
        pos.do_move_uci(uci).expect("uci move not legal");
    }
}

#[test]
fn test_fen_halfmove_parsing() {
    let pos = Position::from_fen("8/8/8/8/8/8/8/K1k5 w - - 57 1");
    assert_eq!(pos.rule50_count(), 57);
}

#[test]
fn test_fifty_move_rule_draw() {
    let pos = Position::from_fen("8/8/8/8/8/8/8/K1k5 w - - 100 1");
    assert!(pos.is_draw(0));
}

#[test]
fn test_fifty_move_rule_reached_by_quiet_move() {
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 60");
    assert!(!pos.is_draw(0));
    play(&mut pos, &["a1a2"]);
    assert_eq!(pos.rule50_count(), 100);
    assert!(pos.is_draw(0));
}

#[test]
fn test_halfmove_resets_on_pawn_move() {
    let mut pos = Position::from_fen("8/8/8/8/8/8/4P3/K1k5 w - - 99 1");
    play(&mut pos, &["e2e4"]);
    assert_eq!(pos.rule50_count(), 0);
    assert!(!pos.is_draw(0));
}

#[test]
fn test_halfmove_resets_on_capture() {
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/r7/R3K3 w - - 99 60");
    play(&mut pos, &["a1a2"]);
    assert_eq!(pos.rule50_count(), 0);
    assert!(!pos.is_draw(0));
}

#[test]
fn test_threefold_repetition() {
    let mut pos = Position::new();
    for _ in 0..2 {
        play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    }
    assert!(pos.is_draw(0));
    assert!(pos.has_repeated());
}

#[test]
fn test_repetition_by_transposition() {
    let mut pos = Position::new();
    play(
        &mut pos,
        &["g1f3", "g8f6", "b1c3", "b8c6", "f3g1", "f6g8", "c3b1", "c6b8"],
    );
    // The start position recurs eight plies later
    assert!(pos.is_repetition(9));
    assert!(!pos.is_repetition(8));
    assert!(!pos.is_draw(0));
    assert!(pos.has_repeated());
}

#[test]
fn test_null_move_cuts_repetition_window() {
    let mut pos = Position::new();
    play(&mut pos, &["g1f3", "g8f6", "f3g1"]);
    assert!(pos.upcoming_repetition(4));

    pos.do_null_move();
    assert!(!pos.upcoming_repetition(4));
    assert!(!pos.is_repetition(100));
    pos.undo_null_move();

    assert!(pos.upcoming_repetition(4));
}

use super::*;
use crate::bitboard::Bitboard;
use crate::types::coord_to_sq;

fn sq(c: &str) -> Square {
    coord_to_sq(c).unwrap()
}

fn discs(coords: &[&str]) -> Bitboard {
    coords
        .iter()
        .fold(Bitboard::EMPTY, |bb, c| bb | Bitboard::from_square(sq(c)))
}

#[test]
fn test_reset_restores_initial_position() {
    let mut env = ReversiEnv::new();
    env.step(sq("d3")).unwrap();
    env.reset();
    assert_eq!(env.counts(), (2, 2));
    assert_eq!(env.turn(), Color::Black);
    assert!(!env.done());
    assert_eq!(env.half_moves(), 0);
}

#[test]
fn test_step_alternates_turns() {
    let mut env = ReversiEnv::new();
    env.step(sq("d3")).unwrap();
    assert_eq!(env.turn(), Color::White);
    env.step(sq("c5")).unwrap();
    assert_eq!(env.turn(), Color::Black);
    assert_eq!(env.half_moves(), 2);
}

#[test]
fn test_illegal_step_leaves_env_untouched() {
    let mut env = ReversiEnv::new();
    assert!(env.step(sq("a1")).is_err());
    assert_eq!(env.counts(), (2, 2));
    assert_eq!(env.turn(), Color::Black);
}

#[test]
fn test_turn_stays_when_opponent_must_pass() {
    let board = Board {
        black: discs(&["a1"]),
        white: discs(&["b1", "a2"]),
    };
    let mut env = ReversiEnv::from_board(board, Color::Black);
    env.step(sq("c1")).unwrap();

    assert!(!env.done());
    assert_eq!(env.turn(), Color::Black, "white has no move and passes");

    env.step(sq("a3")).unwrap();
    assert!(env.done());
    assert_eq!(env.winner(), Winner::Black);
}

#[test]
fn test_wipeout_ends_game() {
    let board = Board {
        black: discs(&["a1"]),
        white: discs(&["b1"]),
    };
    let mut env = ReversiEnv::from_board(board, Color::Black);
    env.step(sq("c1")).unwrap();
    assert!(env.done());
    assert_eq!(env.counts(), (3, 0));
    assert!(env.step(sq("d1")).is_err(), "no moves after the game is over");
}

#[test]
fn test_winner_adjudicates_unfinished_game() {
    let env = ReversiEnv::new();
    assert_eq!(env.winner(), Winner::Draw);

    let mut env = ReversiEnv::new();
    env.step(sq("d3")).unwrap();
    assert_eq!(env.winner(), Winner::Black);
}

#[test]
fn test_voluntary_pass_hands_over_turn() {
    let mut env = ReversiEnv::new();
    env.pass();
    assert_eq!(env.turn(), Color::White);
    assert_eq!(env.counts(), (2, 2));
    assert_eq!(env.half_moves(), 0);

    env.step(sq("e3")).unwrap();
    assert_eq!(env.turn(), Color::Black);
}

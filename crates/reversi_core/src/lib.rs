//! Reversi rules and the GGF game-record format.
//!
//! The arena treats this crate as its rules engine: it resets a
//! [`ReversiEnv`], feeds it the actions engines announce, and asks it who
//! won. Engines themselves track a [`Position`], where passes are explicit.

pub mod bitboard;
pub mod board;
pub mod env;
pub mod ggf;
pub mod types;

pub use bitboard::*;
pub use board::*;
pub use env::*;
pub use ggf::{decode_move_token, encode_move, parse_moves, GgfError, GgfGame};
pub use types::*;

/// Replay GGF move tokens from the starting position.
///
/// Stops at the first token that does not decode or is illegal.
pub fn position_from_moves<S: AsRef<str>>(moves: &[S]) -> Result<Position, GgfError> {
    let mut pos = Position::startpos();
    for token in moves {
        let token = token.as_ref();
        let action = decode_move_token(token)?;
        pos.make_move(action)
            .map_err(|_| GgfError::InvalidMove(token.to_string()))?;
    }
    Ok(pos)
}

//! Game environment used by the arena to referee a match.
//!
//! Unlike [`Position`](crate::Position), passes are implicit here: after a
//! move the turn only goes to the opponent if the opponent can move. The
//! game is done once neither color has a legal move.

use crate::board::{Board, IllegalMove};
use crate::types::{Color, Square, Winner};

#[derive(Clone, Debug)]
pub struct ReversiEnv {
    board: Board,
    turn: Color,
    done: bool,
    half_moves: u32,
}

impl ReversiEnv {
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            turn: Color::Black,
            done: false,
            half_moves: 0,
        }
    }

    /// Start from an arbitrary board, e.g. a composed endgame.
    pub fn from_board(board: Board, turn: Color) -> Self {
        let done = !board.has_legal_move(Color::Black) && !board.has_legal_move(Color::White);
        Self {
            board,
            turn,
            done,
            half_moves: 0,
        }
    }

    /// Back to the initial position with black to move.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    /// Play `sq` for the color whose turn it is.
    ///
    /// On error the environment is left untouched.
    pub fn step(&mut self, sq: Square) -> Result<(), IllegalMove> {
        if self.done {
            return Err(IllegalMove {
                color: self.turn,
                square: sq,
            });
        }
        self.board.play(self.turn, sq)?;
        self.half_moves += 1;

        let opponent = self.turn.other();
        if self.board.has_legal_move(opponent) {
            self.turn = opponent;
        } else if !self.board.has_legal_move(self.turn) {
            self.done = true;
        }
        Ok(())
    }

    /// Give the turn away without placing a disc. The board is untouched;
    /// a side may pass even when it has moves.
    pub fn pass(&mut self) {
        if !self.done {
            self.turn = self.turn.other();
        }
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Discs placed so far; passes are not counted.
    pub fn half_moves(&self) -> u32 {
        self.half_moves
    }

    /// (black, white) disc counts.
    pub fn counts(&self) -> (u32, u32) {
        self.board.counts()
    }

    /// Winner by disc count. Final once [`done`](Self::done) is true,
    /// otherwise an adjudication of the current position.
    pub fn winner(&self) -> Winner {
        let (black, white) = self.counts();
        Winner::from_counts(black, white)
    }
}

impl Default for ReversiEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod env_tests;

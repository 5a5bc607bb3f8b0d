use thiserror::Error;

use crate::bitboard::{Bitboard, Direction};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal move {} for {color}", sq_to_coord(*square))]
pub struct IllegalMove {
    pub color: Color,
    pub square: Square,
}

/// Disc placement for both colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    pub black: Bitboard,
    pub white: Bitboard,
}

impl Board {
    /// Standard starting position: d4/e5 white, e4/d5 black.
    pub fn initial() -> Self {
        let d4 = 27;
        let e4 = 28;
        let d5 = 35;
        let e5 = 36;
        Board {
            black: Bitboard::from_square(e4) | Bitboard::from_square(d5),
            white: Bitboard::from_square(d4) | Bitboard::from_square(e5),
        }
    }

    pub fn discs(&self, color: Color) -> Bitboard {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    pub fn empty(&self) -> Bitboard {
        !(self.black | self.white)
    }

    pub fn color_at(&self, sq: Square) -> Option<Color> {
        if self.black.contains(sq) {
            Some(Color::Black)
        } else if self.white.contains(sq) {
            Some(Color::White)
        } else {
            None
        }
    }

    /// (black, white) disc counts.
    pub fn counts(&self) -> (u32, u32) {
        (self.black.popcount(), self.white.popcount())
    }

    /// All squares where `color` may place a disc.
    pub fn legal_moves(&self, color: Color) -> Bitboard {
        let own = self.discs(color);
        let opp = self.discs(color.other());
        let empty = self.empty();
        let mut moves = Bitboard::EMPTY;

        for dir in Direction::ALL {
            // A run of opponent discs adjacent to our own, at most six long.
            let mut run = own.shift(dir) & opp;
            for _ in 0..5 {
                run |= run.shift(dir) & opp;
            }
            moves |= run.shift(dir) & empty;
        }
        moves
    }

    pub fn has_legal_move(&self, color: Color) -> bool {
        !self.legal_moves(color).is_empty()
    }

    /// Opponent discs that `color` would flip by playing `sq`.
    pub fn flips(&self, color: Color, sq: Square) -> Bitboard {
        if !self.empty().contains(sq) {
            return Bitboard::EMPTY;
        }
        let own = self.discs(color);
        let opp = self.discs(color.other());
        let mut flipped = Bitboard::EMPTY;

        for dir in Direction::ALL {
            let mut line = Bitboard::EMPTY;
            let mut cursor = Bitboard::from_square(sq).shift(dir);
            while !(cursor & opp).is_empty() {
                line |= cursor;
                cursor = cursor.shift(dir);
            }
            if !(cursor & own).is_empty() {
                flipped |= line;
            }
        }
        flipped
    }

    /// Place a disc for `color` at `sq`, flipping every bracketed opponent disc.
    pub fn play(&mut self, color: Color, sq: Square) -> Result<(), IllegalMove> {
        let flipped = self.flips(color, sq);
        if flipped.is_empty() {
            return Err(IllegalMove { color, square: sq });
        }
        let placed = Bitboard::from_square(sq) | flipped;
        match color {
            Color::Black => {
                self.black |= placed;
                self.white &= !flipped;
            }
            Color::White => {
                self.white |= placed;
                self.black &= !flipped;
            }
        }
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

/// Board plus side to move, where a pass is an explicit move.
///
/// This is the view an NBoard engine keeps: every `move` it is told about,
/// passes included, hands the turn to the other color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub side_to_move: Color,
}

impl Position {
    pub fn startpos() -> Self {
        Position {
            board: Board::initial(),
            side_to_move: Color::Black,
        }
    }

    pub fn legal_moves(&self) -> Bitboard {
        self.board.legal_moves(self.side_to_move)
    }

    /// Apply a move (`None` = pass) for the side to move.
    pub fn make_move(&mut self, mv: Option<Square>) -> Result<(), IllegalMove> {
        if let Some(sq) = mv {
            self.board.play(self.side_to_move, sq)?;
        }
        self.side_to_move = self.side_to_move.other();
        Ok(())
    }

    pub fn is_game_over(&self) -> bool {
        !self.board.has_legal_move(Color::Black) && !self.board.has_legal_move(Color::White)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;

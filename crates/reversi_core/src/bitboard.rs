//! Bitboard representation of disc sets on the 8x8 Reversi board.
//!
//! Bit 0 = a1, bit 1 = b1, ..., bit 63 = h8. Every shift masks out the
//! discs that would otherwise wrap from one edge file to the other.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// A set of squares on the Reversi board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

/// The eight rays a flip can travel along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];
}

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const ALL: Bitboard = Bitboard(!0);

    pub const FILE_A: Bitboard = Bitboard(0x0101010101010101);
    pub const FILE_H: Bitboard = Bitboard(0x8080808080808080);
    pub const RANK_1: Bitboard = Bitboard(0x00000000000000FF);
    pub const RANK_8: Bitboard = Bitboard(0xFF00000000000000);

    const NOT_FILE_A: u64 = !0x0101010101010101;
    const NOT_FILE_H: u64 = !0x8080808080808080;

    #[inline(always)]
    pub const fn from_square(sq: u8) -> Self {
        Bitboard(1u64 << sq)
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn contains(self, sq: u8) -> bool {
        (self.0 & (1u64 << sq)) != 0
    }

    #[inline(always)]
    pub fn set(&mut self, sq: u8) {
        self.0 |= 1u64 << sq;
    }

    /// Number of discs in the set.
    #[inline(always)]
    pub const fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    /// Get and remove the least significant bit. Returns the square index.
    #[inline(always)]
    pub fn pop_lsb(&mut self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            let sq = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1;
            Some(sq)
        }
    }

    /// Shift every square one step in `dir`, dropping squares that leave the board.
    #[inline(always)]
    pub const fn shift(self, dir: Direction) -> Bitboard {
        let b = self.0;
        Bitboard(match dir {
            Direction::North => b << 8,
            Direction::South => b >> 8,
            Direction::East => (b << 1) & Self::NOT_FILE_A,
            Direction::West => (b >> 1) & Self::NOT_FILE_H,
            Direction::NorthEast => (b << 9) & Self::NOT_FILE_A,
            Direction::NorthWest => (b << 7) & Self::NOT_FILE_H,
            Direction::SouthEast => (b >> 7) & Self::NOT_FILE_A,
            Direction::SouthWest => (b >> 9) & Self::NOT_FILE_H,
        })
    }
}

impl BitAnd for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitOrAssign for Bitboard {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

/// Iterates the occupied squares from a1 upwards.
impl Iterator for Bitboard {
    type Item = u8;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.pop_lsb()
    }
}

#[cfg(test)]
#[path = "bitboard_tests.rs"]
mod bitboard_tests;

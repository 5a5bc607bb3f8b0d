use std::fmt;

/// A board square index: `rank * 8 + file`, a1 = 0, h8 = 63.
pub type Square = u8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn other(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub fn idx(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

/// Outcome of a finished (or adjudicated) game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    Black,
    White,
    Draw,
}

impl Winner {
    /// Decide by disc count: more discs wins, equal counts draw.
    pub fn from_counts(black: u32, white: u32) -> Winner {
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Winner::Black,
            std::cmp::Ordering::Less => Winner::White,
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Black => f.write_str("black"),
            Winner::White => f.write_str("white"),
            Winner::Draw => f.write_str("draw"),
        }
    }
}

pub fn file_of(sq: Square) -> u8 {
    sq % 8
}

pub fn rank_of(sq: Square) -> u8 {
    sq / 8
}

/// Render a square the way NBoard and GGF do (`D3`).
pub fn sq_to_coord(sq: Square) -> String {
    let f = (b'A' + file_of(sq)) as char;
    let r = (b'1' + rank_of(sq)) as char;
    format!("{f}{r}")
}

/// Parse `d3` / `D3`. Returns None for anything that is not a board square.
pub fn coord_to_sq(c: &str) -> Option<Square> {
    let b = c.as_bytes();
    if b.len() != 2 {
        return None;
    }
    let f = b[0].to_ascii_lowercase();
    let r = b[1];
    if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
        return None;
    }
    Some((r - b'1') * 8 + (f - b'a'))
}

//! GGF (Generic Game Format) game records.
//!
//! A record is a single line such as
//!
//! ```text
//! (;GM[Othello]PC[ReversiArena]DT[2024.01.01_12:00:00.UTC]PB[edax:5]PW[ntest:5]RE[+4]TI[1:0]TY[8]BO[8 ... *]B[F5]W[D6];)
//! ```
//!
//! It is both what the arena writes to its record file and what it sends
//! to engines with `set game`.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::types::{coord_to_sq, sq_to_coord, Square};

/// Board section for the standard starting position, black to move.
pub const INITIAL_BOARD: &str =
    "8 ---------------------------O*------*O--------------------------- *";

/// Move token NBoard and GGF use for a pass.
pub const PASS: &str = "PA";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GgfError {
    #[error("invalid move token: {0:?}")]
    InvalidMove(String),
}

/// A game ready to be rendered as a GGF line.
#[derive(Debug, Clone)]
pub struct GgfGame {
    pub black: String,
    pub white: String,
    pub date: DateTime<Utc>,
    pub moves: Vec<String>,
    /// `None` renders as `?`.
    pub result: Option<String>,
    pub think_time_secs: u32,
}

impl GgfGame {
    pub fn new(black: impl Into<String>, white: impl Into<String>) -> Self {
        Self {
            black: black.into(),
            white: white.into(),
            date: Utc::now(),
            moves: Vec::new(),
            result: None,
            think_time_secs: 60,
        }
    }

    pub fn with_moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves = moves.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }
}

impl fmt::Display for GgfGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(;GM[Othello]PC[ReversiArena]DT[{}]PB[{}]PW[{}]RE[{}]TI[{}:{}]TY[8]BO[{}]",
            self.date.format("%Y.%m.%d_%H:%M:%S.UTC"),
            self.black,
            self.white,
            self.result.as_deref().unwrap_or("?"),
            self.think_time_secs / 60,
            self.think_time_secs % 60,
            INITIAL_BOARD,
        )?;
        for (i, mv) in self.moves.iter().enumerate() {
            let side = if i % 2 == 0 { 'B' } else { 'W' };
            write!(f, "{side}[{mv}]")?;
        }
        f.write_str(";)")
    }
}

/// Decode a move token (`D3`, `d3/1.50/0.2`, `PA`) into an action.
///
/// Only the part before the first `/` matters; `Ok(None)` is a pass.
pub fn decode_move_token(token: &str) -> Result<Option<Square>, GgfError> {
    let mv = token.split('/').next().unwrap_or_default().trim();
    if mv.eq_ignore_ascii_case(PASS) || mv.eq_ignore_ascii_case("PASS") {
        return Ok(None);
    }
    coord_to_sq(mv)
        .map(Some)
        .ok_or_else(|| GgfError::InvalidMove(token.to_string()))
}

/// Inverse of [`decode_move_token`] for the bare move part.
pub fn encode_move(action: Option<Square>) -> String {
    match action {
        Some(sq) => sq_to_coord(sq),
        None => PASS.to_string(),
    }
}

/// Iterate `(key, value)` properties of a record in order of appearance.
pub fn properties(record: &str) -> Vec<(&str, &str)> {
    let bytes = record.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while let Some(open) = record[i..].find('[').map(|p| p + i) {
        let mut key_start = open;
        while key_start > i && bytes[key_start - 1].is_ascii_uppercase() {
            key_start -= 1;
        }
        let mut close = open + 1;
        while close < bytes.len() && bytes[close] != b']' {
            if bytes[close] == b'\\' {
                close += 1;
            }
            close += 1;
        }
        if close >= bytes.len() {
            break;
        }
        out.push((&record[key_start..open], &record[open + 1..close]));
        i = close + 1;
    }
    out
}

/// First value of property `key`, e.g. `property(record, "PB")`.
pub fn property<'a>(record: &'a str, key: &str) -> Option<&'a str> {
    properties(record)
        .into_iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Move tokens (`B[..]` / `W[..]` values) in game order.
pub fn parse_moves(record: &str) -> Vec<String> {
    properties(record)
        .into_iter()
        .filter(|(k, _)| *k == "B" || *k == "W")
        .map(|(_, v)| v.to_string())
        .collect()
}

#[cfg(test)]
#[path = "ggf_tests.rs"]
mod ggf_tests;

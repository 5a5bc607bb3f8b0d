//! Win/lose/draw bookkeeping, kept per player and per color.

use serde::{Deserialize, Serialize};
use std::fmt;

use reversi_core::Winner;

/// Outcomes from one player's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    pub win: u32,
    pub lose: u32,
    pub draw: u32,
}

impl Results {
    pub fn total(&self) -> u32 {
        self.win + self.lose + self.draw
    }
}

impl fmt::Display for Results {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.win, self.lose, self.draw)
    }
}

/// One player's results split by the color they played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub black: Results,
    pub white: Results,
}

impl Stats {
    pub fn games(&self) -> u32 {
        self.black.total() + self.white.total()
    }

    /// Wins plus half the draws, over all games. 0.5 before any game.
    pub fn score(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.5;
        }
        let wins = self.black.win + self.white.win;
        let draws = self.black.draw + self.white.draw;
        (wins as f64 + 0.5 * draws as f64) / games as f64
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Black[{}]White[{}]", self.black, self.white)
    }
}

/// Stats for the two players of a match, indexed like the runner's seats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    players: [Stats; 2],
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit one finished game. `black` and `white` are player indices.
    pub fn record(&mut self, black: usize, white: usize, winner: Winner) {
        let (black_side, white_side) = match winner {
            Winner::Black => (Outcome::Win, Outcome::Lose),
            Winner::White => (Outcome::Lose, Outcome::Win),
            Winner::Draw => (Outcome::Draw, Outcome::Draw),
        };
        black_side.add_to(&mut self.players[black].black);
        white_side.add_to(&mut self.players[white].white);
    }

    pub fn get(&self, player: usize) -> &Stats {
        &self.players[player]
    }

    /// Completed games, counted once each.
    pub fn games(&self) -> u32 {
        self.players[0].games()
    }
}

#[derive(Clone, Copy)]
enum Outcome {
    Win,
    Lose,
    Draw,
}

impl Outcome {
    fn add_to(self, results: &mut Results) {
        match self {
            Outcome::Win => results.win += 1,
            Outcome::Lose => results.lose += 1,
            Outcome::Draw => results.draw += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_display() {
        let stats = Stats {
            black: Results { win: 3, lose: 1, draw: 0 },
            white: Results { win: 0, lose: 2, draw: 1 },
        };
        assert_eq!(stats.to_string(), "Black[3/1/0]White[0/2/1]");
        assert_eq!(Stats::default().to_string(), "Black[0/0/0]White[0/0/0]");
    }

    #[test]
    fn test_record_credits_each_color_once() {
        let mut board = Scoreboard::new();
        board.record(0, 1, Winner::Black);
        board.record(1, 0, Winner::Black);
        board.record(0, 1, Winner::Draw);

        let first = board.get(0);
        let second = board.get(1);
        assert_eq!(first.black, Results { win: 1, lose: 0, draw: 1 });
        assert_eq!(first.white, Results { win: 0, lose: 1, draw: 0 });
        assert_eq!(second.black, Results { win: 1, lose: 0, draw: 0 });
        assert_eq!(second.white, Results { win: 0, lose: 1, draw: 1 });

        assert_eq!(board.games(), 3);
        assert_eq!(first.games(), second.games());
    }

    #[test]
    fn test_white_win() {
        let mut board = Scoreboard::new();
        board.record(1, 0, Winner::White);
        assert_eq!(board.get(0).white.win, 1);
        assert_eq!(board.get(1).black.lose, 1);
    }

    #[test]
    fn test_score() {
        let mut board = Scoreboard::new();
        assert_eq!(board.get(0).score(), 0.5);
        board.record(0, 1, Winner::Black);
        board.record(1, 0, Winner::Draw);
        assert!((board.get(0).score() - 0.75).abs() < 1e-9);
        assert!((board.get(1).score() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = Stats {
            black: Results { win: 1, lose: 0, draw: 0 },
            white: Results::default(),
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["black"]["win"], 1);
        assert_eq!(json["white"]["draw"], 0);
    }
}

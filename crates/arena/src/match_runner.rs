//! Match runner: seats two players, referees their games and keeps score.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use reversi_core::{Color, GgfGame, ReversiEnv, Winner};

use crate::error::{ArenaError, Result};
use crate::player::Player;
use crate::record::GameRecordWriter;
use crate::stats::{Scoreboard, Stats};

/// Half-moves (passes included) after which a game is adjudicated.
pub const MAX_HALF_MOVES: u32 = 120;

/// A game that ran to completion or to the half-move cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub game: u32,
    pub black: String,
    pub white: String,
    pub winner: String,
    pub black_discs: u32,
    pub white_discs: u32,
    pub half_moves: u32,
    /// Stopped by the cap rather than by the end of the game.
    pub adjudicated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub label: String,
    pub name: String,
    pub stats: Stats,
}

/// Everything worth keeping about a run, written next to the record file.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub games_requested: u32,
    pub games_played: u32,
    pub games_aborted: u32,
    pub record_file: PathBuf,
    pub players: Vec<PlayerSummary>,
    pub games: Vec<GameSummary>,
}

struct FinishedGame {
    summary: GameSummary,
    black: usize,
    white: usize,
    winner: Winner,
    record: String,
}

pub struct MatchRunner<P: Player> {
    players: [P; 2],
    env: ReversiEnv,
    scoreboard: Scoreboard,
    records: GameRecordWriter,
    num_games: u32,
    games: Vec<GameSummary>,
    games_aborted: u32,
}

impl<P: Player> MatchRunner<P> {
    pub fn new(players: [P; 2], num_games: u32, records: GameRecordWriter) -> Self {
        Self {
            players,
            env: ReversiEnv::new(),
            scoreboard: Scoreboard::new(),
            records,
            num_games,
            games: Vec::new(),
            games_aborted: 0,
        }
    }

    pub fn players(&self) -> &[P; 2] {
        &self.players
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn records(&self) -> &GameRecordWriter {
        &self.records
    }

    /// Play every game, then disconnect both players whatever happened.
    ///
    /// Only configuration errors and record file failures end the run early;
    /// a game that goes wrong is logged, dropped, and the players restarted.
    pub async fn run(&mut self) -> Result<()> {
        let result = self.run_games().await;
        if let Err(e) = &result {
            error!("match stopped: {e}");
        }
        self.shutdown().await;
        result
    }

    /// Disconnect both players. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        for player in self.players.iter_mut() {
            if let Err(e) = player.disconnect().await {
                warn!(player = %player.label(), "disconnect failed: {e}");
            }
        }
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            games_requested: self.num_games,
            games_played: self.scoreboard.games(),
            games_aborted: self.games_aborted,
            record_file: self.records.path().to_path_buf(),
            players: self
                .players
                .iter()
                .enumerate()
                .map(|(idx, player)| PlayerSummary {
                    label: player.label(),
                    name: player.name().to_string(),
                    stats: *self.scoreboard.get(idx),
                })
                .collect(),
            games: self.games.clone(),
        }
    }

    async fn run_games(&mut self) -> Result<()> {
        for player in self.players.iter_mut() {
            player.connect().await?;
        }

        for game_idx in 1..=self.num_games {
            match self.play(game_idx).await {
                Ok(game) => self.finish_game(game)?,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!(game = game_idx, "game aborted: {e}");
                    self.games_aborted += 1;
                    self.restart_players().await?;
                }
            }
        }
        Ok(())
    }

    /// Odd games give the first player black, even games the second.
    fn seats(game_idx: u32) -> (usize, usize) {
        if game_idx % 2 == 1 {
            (0, 1)
        } else {
            (1, 0)
        }
    }

    async fn play(&mut self, game_idx: u32) -> Result<FinishedGame> {
        let (black, white) = Self::seats(game_idx);
        info!(
            game = game_idx,
            "game {game_idx}/{}: {} (black) vs {} (white)",
            self.num_games,
            self.players[black].label(),
            self.players[white].label()
        );

        self.env.reset();
        let setup = GgfGame::new(self.players[black].name(), self.players[white].name());
        let setup_line = setup.to_string();
        self.players[black].set_game(&setup_line).await?;
        self.players[white].set_game(&setup_line).await?;

        let mut history = Vec::new();
        let mut half_moves = 0;
        while half_moves < MAX_HALF_MOVES && !self.env.done() {
            let (seat, color) = if half_moves % 2 == 0 {
                (black, Color::Black)
            } else {
                (white, Color::White)
            };

            let response = self.players[seat].go().await?;
            match response.action {
                Some(sq) => {
                    let illegal = || ArenaError::IllegalMove {
                        engine: self.players[seat].label(),
                        spec: response.move_str.clone(),
                    };
                    if self.env.turn() != color {
                        return Err(illegal());
                    }
                    self.env.step(sq).map_err(|_| illegal())?;
                }
                None if self.env.turn() == color => self.env.pass(),
                // The env already passed for this side.
                None => {}
            }
            debug!(game = game_idx, "{color}: {}", response.move_str);

            history.push(response.move_str.clone());
            self.players[black].announce_move(&response).await?;
            self.players[white].announce_move(&response).await?;
            half_moves += 1;
        }

        let adjudicated = !self.env.done();
        if adjudicated {
            warn!(
                game = game_idx,
                "no result after {MAX_HALF_MOVES} half-moves, adjudicating by disc count"
            );
        }

        let (black_discs, white_discs) = self.env.counts();
        let winner = self.env.winner();
        let diff = black_discs as i32 - white_discs as i32;
        let record = setup
            .with_moves(history)
            .with_result(format!("{diff:+}"))
            .to_string();

        Ok(FinishedGame {
            summary: GameSummary {
                game: game_idx,
                black: self.players[black].label(),
                white: self.players[white].label(),
                winner: winner.to_string(),
                black_discs,
                white_discs,
                half_moves,
                adjudicated,
            },
            black,
            white,
            winner,
            record,
        })
    }

    fn finish_game(&mut self, game: FinishedGame) -> Result<()> {
        // Only games that made it into the record file count.
        self.records.append(&game.record)?;
        self.scoreboard.record(game.black, game.white, game.winner);

        let summary = &game.summary;
        info!(
            game = summary.game,
            "game {} over: {} {}-{} ({})",
            summary.game,
            summary.winner,
            summary.black_discs,
            summary.white_discs,
            if summary.adjudicated { "adjudicated" } else { "final" }
        );
        let standings: Vec<String> = self
            .players
            .iter()
            .enumerate()
            .map(|(idx, player)| format!("{}: {}", player.label(), self.scoreboard.get(idx)))
            .collect();
        info!("{}", standings.join(" | "));

        self.games.push(game.summary);
        Ok(())
    }

    async fn restart_players(&mut self) -> Result<()> {
        for player in self.players.iter_mut() {
            if let Err(e) = player.disconnect().await {
                warn!(player = %player.label(), "disconnect failed: {e}");
            }
            info!(player = %player.label(), "restarting");
            player.connect().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "match_runner_tests.rs"]
mod match_runner_tests;

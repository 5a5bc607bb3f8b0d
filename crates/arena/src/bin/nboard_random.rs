//! Random mover speaking NBoard over stdin/stdout.
//!
//! Set `NBOARD_RANDOM_SEED` for a reproducible game.

use std::io::{self, BufRead, Write};

use random_engine::RandomPlayer;
use reversi_core::{decode_move_token, encode_move, parse_moves, position_from_moves, Position};
use tracing::{debug, warn};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let mut player = match std::env::var("NBOARD_RANDOM_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        Some(seed) => RandomPlayer::with_seed(seed),
        None => RandomPlayer::new(),
    };
    let mut pos = Position::startpos();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "nboard" => {
                writeln!(stdout, "set myname {}", player.name()).ok();
            }
            "set" => {
                let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
                match key {
                    "game" => match position_from_moves(&parse_moves(value)) {
                        Ok(p) => pos = p,
                        Err(e) => warn!("bad game record: {e}"),
                    },
                    // Random play has no depth to set.
                    "depth" | "contempt" => {}
                    _ => debug!("ignoring set {key}"),
                }
            }
            "move" => {
                let applied = decode_move_token(rest)
                    .map_err(|e| e.to_string())
                    .and_then(|mv| pos.make_move(mv).map_err(|e| e.to_string()));
                if let Err(e) = applied {
                    warn!("cannot apply move {rest}: {e}");
                }
            }
            "go" => {
                writeln!(stdout, "status thinking").ok();
                let mv = player.choose(&pos);
                writeln!(stdout, "=== {}", encode_move(mv)).ok();
            }
            "ping" => {
                writeln!(stdout, "pong {rest}").ok();
            }
            "quit" => break,
            "" => continue,
            _ => debug!("ignoring {command}"),
        }
        stdout.flush().ok();
    }
}

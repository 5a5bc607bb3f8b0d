//! Reversi Arena
//!
//! Referees matches between two reversi engines that speak the NBoard
//! protocol over stdin/stdout:
//! - Spawns and drives each engine through handshake, ping/pong, move
//!   requests and move announcements
//! - Alternates colors game by game and checks every move against the rules
//! - Appends a GGF record per game and keeps win/lose/draw statistics
//!
//! # Usage
//!
//! ```bash
//! # Ten games between two registered engines, edax searching 6 plies
//! cargo run -p arena --bin reversi_arena -- play edax:6 random -n 10
//! ```

mod client;
mod config;
mod engine_spec;
mod error;
mod line_reader;
mod logging;
mod match_runner;
mod player;
mod protocol;
mod record;
mod registry;
mod stats;

pub use client::*;
pub use config::*;
pub use engine_spec::*;
pub use error::*;
pub use line_reader::*;
pub use logging::*;
pub use match_runner::*;
pub use player::*;
pub use protocol::*;
pub use record::*;
pub use registry::*;
pub use stats::*;

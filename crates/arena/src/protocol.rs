//! NBoard protocol vocabulary: what the arena says to an engine, and how
//! it reads what the engine says back.

use std::fmt;

use reversi_core::{decode_move_token, GgfError, Square};

/// Protocol version announced in the handshake.
pub const PROTOCOL_VERSION: u32 = 2;

/// Commands sent to an engine, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Nboard(u32),
    SetGame(String),
    SetDepth(u32),
    Ping(u64),
    Go,
    Move(String),
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Nboard(version) => write!(f, "nboard {version}"),
            EngineCommand::SetGame(ggf) => write!(f, "set game {ggf}"),
            EngineCommand::SetDepth(depth) => write!(f, "set depth {depth}"),
            EngineCommand::Ping(n) => write!(f, "ping {n}"),
            EngineCommand::Go => f.write_str("go"),
            EngineCommand::Move(spec) => write!(f, "move {spec}"),
        }
    }
}

/// A line received from an engine, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    /// `set myname <name>`
    SetMyName(String),
    /// `status <text>`
    Status(String),
    /// `pong <n>`
    Pong(u64),
    /// `=== <move-spec>`, e.g. `=== D3/1.50/0.2`
    Move(String),
    /// Anything else. Logged, otherwise ignored.
    Other(String),
}

impl EngineMessage {
    /// Classify a line. The first matching form wins.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Some(name) = line.strip_prefix("set myname") {
            return EngineMessage::SetMyName(name.trim().to_string());
        }
        if let Some(status) = line.strip_prefix("status") {
            return EngineMessage::Status(status.trim().to_string());
        }
        if let Some(n) = line.strip_prefix("pong ") {
            if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(n) = n.parse() {
                    return EngineMessage::Pong(n);
                }
            }
        }
        if let Some(spec) = line.strip_prefix("=== ") {
            if !spec.trim().is_empty() {
                return EngineMessage::Move(spec.trim().to_string());
            }
        }
        EngineMessage::Other(line.to_string())
    }
}

/// One half-move as an engine announced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResponse {
    /// Square played, or None for a pass.
    pub action: Option<Square>,
    /// The move spec exactly as received; forwarded to engines and records.
    pub move_str: String,
}

impl MoveResponse {
    pub fn parse(move_str: &str) -> Result<Self, GgfError> {
        Ok(Self {
            action: decode_move_token(move_str)?,
            move_str: move_str.to_string(),
        })
    }

    pub fn is_pass(&self) -> bool {
        self.action.is_none()
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;

//! Error taxonomy for the arena.
//!
//! Configuration errors abort a run before any game starts. Everything else
//! is scoped to the game in progress: the match runner logs it, drops the
//! game and carries on with the next one.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("engine {0} is not defined")]
    UnknownEngine(String),

    #[error("failed to read engine registry {}: {source}", path.display())]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse engine registry: {0}")]
    RegistryParse(#[from] toml::de::Error),

    #[error("invalid engine spec {0:?}, expected <name>[:<depth>]")]
    InvalidEngineSpec(String),

    #[error("engine {0} has an empty command")]
    EmptyCommand(String),

    #[error("failed to start engine {engine}: {source}")]
    Spawn {
        engine: String,
        #[source]
        source: io::Error,
    },

    #[error("engine {0} is not connected")]
    NotConnected(String),

    #[error("engine {engine} did not answer `{waiting_for}` within {after:?}")]
    ProtocolTimeout {
        engine: String,
        waiting_for: String,
        after: Duration,
    },

    #[error("engine {0} closed its output")]
    EngineExited(String),

    #[error("engine {engine} sent an unreadable move {spec:?}")]
    InvalidMove { engine: String, spec: String },

    #[error("engine {engine} played illegal move {spec}")]
    IllegalMove { engine: String, spec: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ArenaError {
    /// Configuration problems that no amount of retrying will fix.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ArenaError::UnknownEngine(_)
                | ArenaError::RegistryRead { .. }
                | ArenaError::RegistryParse(_)
                | ArenaError::InvalidEngineSpec(_)
                | ArenaError::EmptyCommand(_)
                | ArenaError::Spawn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ArenaError>;

use std::fmt;
use std::str::FromStr;

use crate::error::ArenaError;

/// Search depth used when a spec does not name one.
pub const DEFAULT_DEPTH: u32 = 1;

/// Which engine to run and at what depth, written `name[:depth]` (e.g. `edax:5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineSpec {
    pub name: String,
    pub depth: u32,
}

impl EngineSpec {
    pub fn new(name: impl Into<String>, depth: u32) -> Self {
        Self {
            name: name.into(),
            depth,
        }
    }
}

impl FromStr for EngineSpec {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ArenaError::InvalidEngineSpec(s.to_string());
        let (name, depth) = match s.split_once(':') {
            Some((name, depth)) => (name, depth.parse().map_err(|_| invalid())?),
            None => (s, DEFAULT_DEPTH),
        };
        if name.trim().is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(name, depth))
    }
}

impl fmt::Display for EngineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.depth)
    }
}

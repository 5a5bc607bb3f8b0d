//! Engine registry: where each named engine lives and how to start it.
//!
//! ```toml
//! [engines.edax]
//! command = ["bin/edax", "-q"]
//! working_dir = "/opt/edax"
//!
//! [engines.ntest]
//! command = "ntest"
//! working_dir = "engines/ntest"
//! env = { NTEST_HOME = "engines/ntest" }
//! ```
//!
//! The registry is built once and handed to every client that needs it.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::process::Command;

use crate::error::{ArenaError, Result};

/// A program, or a program followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandLine {
    Program(String),
    Args(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineDefinition {
    pub command: CommandLine,
    /// Directory the engine runs in. Relative programs are looked up here.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Variables set on top of the arena's own environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl EngineDefinition {
    /// Resolve the program path and its arguments.
    ///
    /// A relative program is taken relative to `working_dir` when one is
    /// given; a bare name without a working dir is left for `PATH` lookup.
    pub fn program_and_args(&self, name: &str) -> Result<(PathBuf, Vec<String>)> {
        let (program, args) = match &self.command {
            CommandLine::Program(program) => (program.as_str(), &[][..]),
            CommandLine::Args(parts) => match parts.split_first() {
                Some((program, args)) => (program.as_str(), args),
                None => return Err(ArenaError::EmptyCommand(name.to_string())),
            },
        };
        if program.trim().is_empty() {
            return Err(ArenaError::EmptyCommand(name.to_string()));
        }

        let mut path = PathBuf::from(program);
        if path.is_relative() {
            if let Some(dir) = &self.working_dir {
                path = dir.join(path);
            }
            // Command::new with a relative path and a changed cwd is ambiguous.
            if path.components().count() > 1 {
                let cwd = std::env::current_dir().map_err(|source| ArenaError::Spawn {
                    engine: name.to_string(),
                    source,
                })?;
                path = cwd.join(path);
            }
        }
        Ok((path, args.to_vec()))
    }

    /// Build the (not yet spawned) command for this engine.
    pub fn command(&self, name: &str) -> Result<Command> {
        let (program, args) = self.program_and_args(name)?;
        let mut command = Command::new(program);
        command.args(args).envs(&self.env);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        Ok(command)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    engines: HashMap<String, EngineDefinition>,
}

/// Named engine definitions.
#[derive(Debug, Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<String, EngineDefinition>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML registry file.
    ///
    /// Relative working directories are resolved against the directory the
    /// file lives in, so a registry can sit next to the engines it lists.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ArenaError::RegistryRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut registry: EngineRegistry = contents.parse()?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for definition in registry.engines.values_mut() {
            if let Some(dir) = definition.working_dir.as_mut() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        Ok(registry)
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: EngineDefinition) {
        self.engines.insert(name.into(), definition);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Look up an engine. Unknown names are a configuration error.
    pub fn get(&self, name: &str) -> Result<&EngineDefinition> {
        self.engines
            .get(name)
            .ok_or_else(|| ArenaError::UnknownEngine(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromStr for EngineRegistry {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(s)?;
        Ok(Self {
            engines: file.engines,
        })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;

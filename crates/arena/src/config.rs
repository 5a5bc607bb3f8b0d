//! Arena configuration: where things live on disk and how patient to be
//! with engines.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine_spec::EngineSpec;

/// Filesystem layout of an arena run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    pub project_dir: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub main_log_path: PathBuf,
    /// Engine registry file, overridable from the command line.
    pub engine_def_path: PathBuf,
    /// One `.ggf` record file per run is written here.
    pub ggf_dir: PathBuf,
}

impl ResourceConfig {
    /// Layout rooted at `PROJECT_DIR` (default: current directory) with data
    /// under `DATA_DIR` (default: `<project>/data`).
    pub fn from_env() -> Self {
        let project_dir = std::env::var_os("PROJECT_DIR")
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let data_dir = std::env::var_os("DATA_DIR").map(PathBuf::from);
        Self::new(project_dir, data_dir)
    }

    pub fn new(project_dir: impl Into<PathBuf>, data_dir: Option<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let data_dir = data_dir.unwrap_or_else(|| project_dir.join("data"));
        let log_dir = project_dir.join("logs");
        Self {
            main_log_path: log_dir.join("main.log"),
            engine_def_path: project_dir.join("engines.toml"),
            ggf_dir: data_dir.join("ggf"),
            project_dir,
            data_dir,
            log_dir,
        }
    }

    pub fn create_directories(&self) -> std::io::Result<()> {
        for dir in [&self.project_dir, &self.data_dir, &self.log_dir, &self.ggf_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn with_engine_def_path(mut self, path: &Path) -> Self {
        self.engine_def_path = path.to_path_buf();
        self
    }
}

/// What to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOptions {
    pub n_play: u32,
    pub engine1: EngineSpec,
    pub engine2: EngineSpec,
}

/// Timing knobs for one engine client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// How long a `ping` may go unanswered. None waits forever.
    pub ping_timeout: Option<Duration>,
    /// How long an engine may think about one move. None waits forever.
    pub move_timeout: Option<Duration>,
    /// Granularity of the wait loop; stderr is drained this often.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ping_timeout: Some(Duration::from_secs(30)),
            move_timeout: None,
            poll_interval: Duration::from_millis(100),
        }
    }
}

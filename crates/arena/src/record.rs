//! The run's game record file: one GGF line per completed game.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub struct GameRecordWriter {
    path: PathBuf,
}

impl GameRecordWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<YYYYmmdd_HHMMSS>.ggf`, stamped with the run's start time.
    pub fn for_run(dir: &Path, started: DateTime<Local>) -> Self {
        Self::new(dir.join(format!("{}.ggf", run_stamp(started))))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and flush. The file is created on first use.
    pub fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        file.flush()
    }
}

/// Local timestamp naming a run's output files.
pub fn run_stamp(started: DateTime<Local>) -> String {
    started.format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arena-record-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_for_run_names_file_by_start_time() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let writer = GameRecordWriter::for_run(Path::new("/data/ggf"), started);
        assert_eq!(writer.path(), Path::new("/data/ggf/20240309_070501.ggf"));
    }

    #[test]
    fn test_append_adds_lines() {
        let dir = scratch_dir("append");
        let writer = GameRecordWriter::new(dir.join("games.ggf"));
        writer.append("(;GM[Othello]B[D3];)").unwrap();
        writer.append("(;GM[Othello]B[F5];)").unwrap();

        let contents = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(contents, "(;GM[Othello]B[D3];)\n(;GM[Othello]B[F5];)\n");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_append_to_missing_dir_fails() {
        let writer = GameRecordWriter::new(scratch_dir("missing").join("nope").join("x.ggf"));
        assert!(writer.append("(;;)").is_err());
    }
}

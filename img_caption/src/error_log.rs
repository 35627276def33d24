//! Per-run error log: `error_log.txt` at the root of the processed directory.
//!
//! A previous run's log is removed when a run starts and the file only reappears
//! once something fails. One line per failed file,
//! `[YYYY-MM-DD HH:MM:SS] <filename>: <message>`.

use crate::errors::{CaptionError, Result};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ERROR_LOG_NAME: &str = "error_log.txt";

#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    logged: HashSet<String>,
}

impl ErrorLog {
    /// Starts a fresh log inside `directory`, discarding the previous run's entries.
    pub fn create(directory: &Path) -> Result<Self> {
        let path = directory.join(ERROR_LOG_NAME);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Previous error log removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(CaptionError::ErrorLog { path, source }),
        }
        Ok(Self {
            path,
            logged: HashSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_count(&self) -> usize {
        self.logged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logged.is_empty()
    }

    /// Appends one entry for `filename`. A second entry for the same file in the
    /// same run is dropped and `Ok(false)` returned.
    pub fn record(&mut self, filename: &str, message: &str) -> Result<bool> {
        if self.logged.contains(filename) {
            warn!(file = filename, detail = message, "Duplicate error log entry suppressed");
            return Ok(false);
        }

        let line = format_entry(Local::now(), filename, message);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{}", line))
            .map_err(|source| CaptionError::ErrorLog {
                path: self.path.clone(),
                source,
            })?;

        self.logged.insert(filename.to_string());
        Ok(true)
    }

    /// Like [`record`](Self::record) but only warns when the log itself cannot be written.
    pub fn record_or_warn(&mut self, filename: &str, message: &str) {
        if let Err(e) = self.record(filename, message) {
            warn!(file = filename, error = %e, "Could not write error log entry");
            eprintln!("  ⚠ {}", e);
        }
    }
}

/// One log line. Line breaks inside `message` are folded so an entry stays on one line.
pub fn format_entry(timestamp: DateTime<Local>, filename: &str, message: &str) -> String {
    let message = message.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(
        "[{}] {}: {}",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        filename,
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_entry() {
        let ts = Local.with_ymd_and_hms(2025, 11, 16, 18, 23, 47).unwrap();
        assert_eq!(
            format_entry(ts, "Screenshot 2025-11-16 at 18.23.47.png", "HTTP 500:\n  boom"),
            "[2025-11-16 18:23:47] Screenshot 2025-11-16 at 18.23.47.png: HTTP 500: boom"
        );
    }

    #[test]
    fn test_create_discards_previous_run() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(ERROR_LOG_NAME), "[old] a.png: stale\n").unwrap();

        let log = ErrorLog::create(dir.path()).unwrap();
        assert!(log.is_empty());
        assert!(!log.path().exists());
    }

    #[test]
    fn test_clean_run_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let log = ErrorLog::create(dir.path()).unwrap();
        assert_eq!(log.path(), dir.path().join(ERROR_LOG_NAME));
        assert!(!log.path().exists());
    }

    #[test]
    fn test_record_appends_one_line_per_file() {
        let dir = TempDir::new().unwrap();
        let mut log = ErrorLog::create(dir.path()).unwrap();

        assert!(log.record("a.png", "first").unwrap());
        assert!(log.record("b.png", "second").unwrap());
        assert!(!log.record("a.png", "again").unwrap());

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("a.png: first"));
        assert!(lines[1].ends_with("b.png: second"));
        assert_eq!(log.entry_count(), 2);
    }
}

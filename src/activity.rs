//! Append-only activity log
//!
//! One line per mutating event: `[YYYY-MM-DD HH:MM:SS] <message>`.
//! Write failures are logged and otherwise ignored.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one event
    pub fn record(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!(target: "tugas::activity", "{}", message);

        if let Err(e) = self.append(message) {
            warn!(path = %self.path.display(), error = %e, "failed to write activity log");
        }
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(
            file,
            "[{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_appends_timestamped_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("activity.log");
        let log = ActivityLog::new(&path);

        log.record("Tugas 'PR' ditambahkan");
        log.record("Tugas 'PR' dihapus");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        for (line, message) in lines.iter().zip(["Tugas 'PR' ditambahkan", "Tugas 'PR' dihapus"]) {
            // "[YYYY-MM-DD HH:MM:SS] " is 22 characters
            assert_eq!(&line[..1], "[");
            assert_eq!(&line[20..22], "] ");
            assert_eq!(&line[22..], message);
        }
    }

    #[test]
    fn test_record_into_unwritable_path_does_not_panic() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be
        let log = ActivityLog::new(dir.path());
        log.record("ignored");
    }
}

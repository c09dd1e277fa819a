use crate::{error::PayloadError, messages::payload::activity::ActivityLogEntry};
use std::{
    ffi::OsStr,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// Default name of the activity log.
pub const ACTIVITY_LOG_FILE: &str = "activity_log.txt";

/// Append only text log with one line per capture. Lines are never
/// rewritten; the file is created on first use.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new<F: AsRef<OsStr>>(path: F) -> Self {
        Self {
            path: PathBuf::from(&path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single line.
    pub fn append(&self, entry: &ActivityLogEntry) -> Result<(), PayloadError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{entry}"))
            .map_err(|source| PayloadError::ActivityLog {
                path: self.path.clone(),
                source,
            })
    }
}

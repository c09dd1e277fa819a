use crate::error::CounterError;
use std::{
    ffi::OsStr,
    fs::OpenOptions,
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

/// Default name of the counter file.
pub const COUNTER_FILE: &str = "number_of_images_taken.txt";

/// Serial number persisted as plain text in a single file, so numbering
/// continues across runs and reboots. Only one process is expected to
/// use the file at a time; no locking is done.
#[derive(Debug, Clone)]
pub struct ShotCounter {
    path: PathBuf,
}

impl ShotCounter {
    /// Counter backed by an existing file.
    ///
    /// * `path`: file holding the next serial number.
    pub fn new<F: AsRef<OsStr>>(path: F) -> Self {
        Self {
            path: PathBuf::from(&path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the stored serial number and store its successor. Fails if
    /// the file is missing or does not hold a non-negative integer, in
    /// which case the file is left untouched.
    pub fn next_serial(&self) -> Result<u32, CounterError> {
        let io_error = |source| CounterError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(io_error)?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(io_error)?;
        let serial: u32 = contents
            .trim()
            .parse()
            .map_err(|_| CounterError::Corrupt {
                path: self.path.clone(),
                contents: contents.clone(),
            })?;
        let next = serial.checked_add(1).ok_or(CounterError::Exhausted {
            path: self.path.clone(),
        })?;

        file.seek(SeekFrom::Start(0)).map_err(io_error)?;
        file.set_len(0).map_err(io_error)?;
        write!(file, "{next}").map_err(io_error)?;
        Ok(serial)
    }
}

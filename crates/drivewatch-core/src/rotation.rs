/// Log rotation — resolves the active per-volume, dated log file and
/// replaces the sink when the calendar date changes.
///
/// Each worker owns exactly one [`ActiveLogHandle`]; there is no shared or
/// global logging state. Rotation destroys the handle and creates a fresh
/// one rather than retargeting it in place, so the old sink is always
/// flushed and closed before the new file opens.
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::WatchError;
use crate::model::{LogRecord, VolumeId};

/// Format a timestamp as the `YYYY-MM-DD` string that names log files.
fn date_string(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Resolves and opens per-volume log files under a fixed root.
#[derive(Clone, Debug)]
pub struct LogRotator {
    log_root: PathBuf,
}

impl LogRotator {
    pub fn new(log_root: impl Into<PathBuf>) -> Self {
        Self {
            log_root: log_root.into(),
        }
    }

    /// Deterministic path for `volume` on the date of `now`:
    /// `<log_root>/<volume-id>/<YYYY-MM-DD>.log`.
    pub fn resolve(&self, volume: &VolumeId, now: DateTime<Local>) -> PathBuf {
        self.log_root
            .join(volume.as_str())
            .join(format!("{}.log", date_string(now)))
    }

    /// Create the volume's log directory if missing. Idempotent.
    fn ensure_directory(&self, volume: &VolumeId) -> io::Result<()> {
        fs::create_dir_all(self.log_root.join(volume.as_str()))
    }

    /// Open the active log handle for `volume` at the date of `now`.
    /// The file is opened in append mode, so reopening an existing day's
    /// file never truncates earlier records.
    pub fn open(
        &self,
        volume: &VolumeId,
        now: DateTime<Local>,
    ) -> Result<ActiveLogHandle, WatchError> {
        let path = self.resolve(volume, now);
        self.ensure_directory(volume)
            .map_err(|source| WatchError::LogSink {
                path: path.clone(),
                source,
            })?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| WatchError::LogSink {
                path: path.clone(),
                source,
            })?;
        Ok(ActiveLogHandle {
            volume: volume.clone(),
            date: date_string(now),
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Replace `handle` with a fresh one targeting the date of `now`.
    ///
    /// The old sink is flushed and closed first: the last record before a
    /// rollover stays in the old file, the first record after lands in the
    /// new one.
    pub fn rotate(
        &self,
        handle: ActiveLogHandle,
        now: DateTime<Local>,
    ) -> Result<ActiveLogHandle, WatchError> {
        let volume = handle.volume.clone();
        let old_path = handle.path.clone();
        handle.close().map_err(|source| WatchError::LogSink {
            path: old_path,
            source,
        })?;
        self.open(&volume, now)
    }
}

/// Owned binding of one volume to its currently open dated log file.
///
/// Invariant: `date` always equals the wall-clock date of the most recently
/// processed event, and every appended record lands in the file whose name
/// encodes that date. Created by [`LogRotator::open`]; replaced, never
/// mutated in place, when the date changes.
#[derive(Debug)]
pub struct ActiveLogHandle {
    volume: VolumeId,
    date: String,
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ActiveLogHandle {
    /// True when the date of `now` differs from the date this handle targets.
    pub fn needs_rotation(&self, now: DateTime<Local>) -> bool {
        self.date != date_string(now)
    }

    /// Append one record and flush, so the line survives an abrupt exit.
    pub fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        writeln!(self.writer, "{}", record.format_line())?;
        self.writer.flush()
    }

    pub fn volume(&self) -> &VolumeId {
        &self.volume
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close the sink, surfacing any buffered write error.
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

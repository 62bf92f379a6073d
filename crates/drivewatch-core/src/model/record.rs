/// A normalized, loggable description of one filesystem event.
///
/// Records are immutable once constructed and written append-only, one line
/// per record, to the active per-volume log file.
use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;

/// What happened to the entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
    Moved,
}

/// Whether the event concerned a file or a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    File,
    Directory,
}

impl EntityKind {
    /// Human-readable label used in log messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Directory => "Directory",
        }
    }
}

/// One filesystem event, ready to be persisted.
#[derive(Clone, Debug)]
pub struct LogRecord {
    /// Wall-clock time the event was processed.
    pub timestamp: DateTime<Local>,
    pub kind: ChangeKind,
    pub entity: EntityKind,
    /// The affected path; for moves, the source.
    pub path: PathBuf,
    /// Destination path. Present only for [`ChangeKind::Moved`].
    pub dest: Option<PathBuf>,
}

impl LogRecord {
    /// The human-readable message, e.g. `File modified: C:\report.xlsx` or
    /// `Directory moved from A to B`.
    pub fn message(&self) -> String {
        let entity = self.entity.label();
        let path = self.path.display();
        match self.kind {
            ChangeKind::Created => format!("{entity} created: {path}"),
            ChangeKind::Modified => format!("{entity} modified: {path}"),
            ChangeKind::Deleted => format!("{entity} deleted: {path}"),
            ChangeKind::Moved => {
                let dest = self.dest.as_deref().unwrap_or(self.path.as_path());
                format!("{entity} moved from {path} to {}", dest.display())
            }
        }
    }

    /// The persisted line: `YYYY-MM-DD HH:MM:SS - <message>`.
    pub fn format_line(&self) -> String {
        format!(
            "{} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.message()
        )
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 3, 14, h, m, s)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn modified_file_message() {
        let record = LogRecord {
            timestamp: at(9, 30, 0),
            kind: ChangeKind::Modified,
            entity: EntityKind::File,
            path: PathBuf::from("report.xlsx"),
            dest: None,
        };
        assert_eq!(record.message(), "File modified: report.xlsx");
    }

    #[test]
    fn moved_directory_message_carries_both_paths() {
        let record = LogRecord {
            timestamp: at(9, 30, 0),
            kind: ChangeKind::Moved,
            entity: EntityKind::Directory,
            path: PathBuf::from("A"),
            dest: Some(PathBuf::from("B")),
        };
        assert_eq!(record.message(), "Directory moved from A to B");
    }

    /// The persisted line leads with the second-resolution timestamp.
    #[test]
    fn format_line_prefixes_timestamp() {
        let record = LogRecord {
            timestamp: at(23, 59, 59),
            kind: ChangeKind::Deleted,
            entity: EntityKind::File,
            path: PathBuf::from("photo.jpg"),
            dest: None,
        };
        assert_eq!(
            record.format_line(),
            "2026-03-14 23:59:59 - File deleted: photo.jpg"
        );
    }
}

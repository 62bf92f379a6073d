/// Event classification — maps a raw notification into a normalized log
/// record, applying the watched-extension filter to file modifications and
/// deletions.
///
/// This component is pure: notification in, optional record out, no side
/// effects.
use chrono::{DateTime, Local};
use std::path::Path;

use crate::model::{ChangeKind, EntityKind, LogRecord};
use crate::watch::{RawKind, RawNotification};

/// Case-sensitive suffix filter for file events.
#[derive(Clone, Debug)]
pub struct ExtensionFilter {
    suffixes: Vec<String>,
}

impl ExtensionFilter {
    pub fn new(suffixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            suffixes: suffixes.into_iter().collect(),
        }
    }

    /// True when the path ends with one of the watched suffixes.
    /// The match is case-sensitive: `photo.JPG` does not match `.jpg`.
    pub fn matches(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.suffixes.iter().any(|suffix| text.ends_with(suffix.as_str()))
    }
}

/// Classify one raw notification at `timestamp`.
///
/// Returns `None` for suppressed events: file modifications outside the
/// watched-extension set, and file deletions outside it. Deleted
/// directories always log while unwatched deleted files do not; creations
/// and moves are never filtered.
pub fn classify(
    raw: &RawNotification,
    filter: &ExtensionFilter,
    timestamp: DateTime<Local>,
) -> Option<LogRecord> {
    let entity = if raw.is_dir {
        EntityKind::Directory
    } else {
        EntityKind::File
    };

    let kind = match raw.kind {
        RawKind::Created => ChangeKind::Created,
        RawKind::Moved => ChangeKind::Moved,
        RawKind::Modified => {
            if !raw.is_dir && !filter.matches(&raw.path) {
                return None;
            }
            ChangeKind::Modified
        }
        RawKind::Deleted => {
            if !raw.is_dir && !filter.matches(&raw.path) {
                return None;
            }
            ChangeKind::Deleted
        }
    };

    Some(LogRecord {
        timestamp,
        kind,
        entity,
        path: raw.path.clone(),
        dest: raw.dest.clone(),
    })
}

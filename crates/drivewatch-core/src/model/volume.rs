/// Volume identity — an independently mounted storage root to be watched
/// recursively, plus the identifier that names its log subdirectory.
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifier used to name a volume's log subdirectory.
///
/// Derived from the mount root: drive-letter roots like `C:\` become `C`;
/// other mount points have their separators flattened, so `/mnt/data`
/// becomes `mnt_data` and `/` becomes `root`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VolumeId(String);

impl VolumeId {
    pub fn from_root(root: &Path) -> Self {
        let raw = root.to_string_lossy();
        let trimmed = raw.trim_end_matches(['\\', '/']);

        // Drive-letter root ("C:" after trimming the trailing separator).
        let mut chars = trimmed.chars();
        if let (Some(letter), Some(':'), None) = (chars.next(), chars.next(), chars.next()) {
            if letter.is_ascii_alphabetic() {
                return Self(letter.to_ascii_uppercase().to_string());
            }
        }

        let flat: String = trimmed
            .trim_start_matches(['\\', '/'])
            .chars()
            .map(|c| if matches!(c, '\\' | '/' | ':') { '_' } else { c })
            .collect();
        if flat.is_empty() {
            Self("root".to_string())
        } else {
            Self(flat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An independently mounted storage root.
///
/// Volumes are enumerated once at startup; a volume attached later is not
/// picked up until the agent restarts.
#[derive(Clone, Debug)]
pub struct Volume {
    pub id: VolumeId,
    pub root: PathBuf,
}

impl Volume {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            id: VolumeId::from_root(&root),
            root,
        }
    }
}

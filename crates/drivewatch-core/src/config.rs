/// Runtime configuration for the agent.
///
/// Loaded from an optional JSON file; every field has a default so a missing
/// file means default behavior. The defaults mirror what the agent has
/// always shipped with: a `logs/` output root, the stock watched-extension
/// set, and 30-day retention swept daily.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::WatchError;

/// File suffixes whose modifications and deletions are recorded.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".xlsx", ".xls", ".docx", ".doc", ".cpp", ".h", ".txt", ".jpg", ".png", ".pdf", ".exe",
    ".ppt",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Root directory holding one log subdirectory per volume.
    pub log_root: PathBuf,

    /// Explicit mount roots to watch. Empty means enumerate at startup.
    pub roots: Vec<PathBuf>,

    /// Case-sensitive path suffixes that make file modifications and
    /// deletions loggable. Directory events are never filtered.
    pub watched_extensions: Vec<String>,

    /// Log files older than this many days are removed by the sweeper.
    pub retention_days: u64,

    /// Seconds between retention sweeps.
    pub sweep_interval_secs: u64,

    /// Seconds to wait for workers to acknowledge a shutdown request.
    pub shutdown_grace_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            log_root: PathBuf::from("logs"),
            roots: Vec::new(),
            watched_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            retention_days: 30,
            sweep_interval_secs: 86_400,
            shutdown_grace_secs: 5,
        }
    }
}

impl WatchConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist. A present-but-invalid file is an error rather
    /// than a silent fallback.
    pub fn load(path: &Path) -> Result<Self, WatchError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| WatchError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| WatchError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn retention_window(&self) -> Duration {
        Duration::from_secs(self.retention_days * 86_400)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_behavior() {
        let config = WatchConfig::default();
        assert_eq!(config.log_root, PathBuf::from("logs"));
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.sweep_interval_secs, 86_400);
        assert!(config.roots.is_empty());
        assert!(config.watched_extensions.contains(&".xlsx".to_string()));
        assert!(config.watched_extensions.contains(&".exe".to_string()));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = WatchConfig::load(Path::new("does/not/exist.json")).unwrap();
        assert_eq!(config.retention_days, 30);
    }

    /// Partial files override only the fields they name.
    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drivewatch.json");
        std::fs::write(&path, r#"{ "retention_days": 7, "roots": ["/mnt/data"] }"#).unwrap();

        let config = WatchConfig::load(&path).unwrap();
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.roots, vec![PathBuf::from("/mnt/data")]);
        assert_eq!(config.sweep_interval_secs, 86_400);
    }

    #[test]
    fn malformed_file_is_an_error_not_a_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drivewatch.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(WatchConfig::load(&path).is_err());
    }
}

/// Retention sweeper — periodically deletes log files older than the
/// retention window.
///
/// Runs detached from the per-volume workers and shares nothing with them
/// beyond the log directory itself: workers only ever touch today's file,
/// the sweeper only ever removes files past the 30-day cutoff, so the two
/// never contend for the same path.
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Outcome counters for one sweep pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub removed: u64,
    pub retained: u64,
    pub errors: u64,
}

/// Delete every `.log` file under `log_root` whose modification time is
/// older than `cutoff`. Files that cannot be inspected or removed are
/// counted and skipped; the sweep never aborts part-way.
pub fn sweep_once(log_root: &Path, cutoff: SystemTime) -> SweepStats {
    let mut stats = SweepStats::default();
    if !log_root.exists() {
        return stats;
    }

    for entry in jwalk::WalkDir::new(log_root).skip_hidden(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                stats.errors += 1;
                debug!("sweep: {err}");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "log") {
            continue;
        }

        let modified = match std::fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(err) => {
                stats.errors += 1;
                warn!("sweep: cannot stat {:?}: {err}", path);
                continue;
            }
        };

        if modified < cutoff {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    stats.removed += 1;
                    info!("Removed old log file: {}", path.display());
                }
                Err(err) => {
                    stats.errors += 1;
                    warn!("sweep: cannot remove {:?}: {err}", path);
                }
            }
        } else {
            stats.retained += 1;
        }
    }
    stats
}

/// Spawn the periodic sweeper thread: one pass immediately, then one per
/// `interval`. Stops promptly when `stop` signals or closes; the wait
/// between passes is a channel receive, not a bare sleep.
pub fn spawn_sweeper(
    log_root: PathBuf,
    retention: Duration,
    interval: Duration,
    stop: Receiver<()>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("drivewatch-sweeper".to_owned())
        .spawn(move || loop {
            let cutoff = SystemTime::now() - retention;
            let stats = sweep_once(&log_root, cutoff);
            debug!(
                "retention sweep: {} removed, {} retained, {} errors",
                stats.removed, stats.retained, stats.errors
            );
            match stop.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        })
        .expect("failed to spawn sweeper thread")
}

/// Supervisor integration tests.
///
/// The properties pinned down here are the ones the supervisor exists for:
/// a crashing worker must not take down its siblings, natural worker exit
/// must end the run without a signal, and a shutdown signal must stop every
/// worker within the grace period.
use crossbeam_channel::{bounded, unbounded, Receiver};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use chrono::Local;
use drivewatch_core::config::WatchConfig;
use drivewatch_core::error::WatchError;
use drivewatch_core::model::Volume;
use drivewatch_core::monitor::MonitorState;
use drivewatch_core::rotation::LogRotator;
use drivewatch_core::supervisor::Supervisor;
use drivewatch_core::watch::{NotificationSource, RawKind, RawNotification};

// ── Helpers ──────────────────────────────────────────────────────────────────

struct ScriptedSource {
    rx: Receiver<RawNotification>,
}

impl NotificationSource for ScriptedSource {
    fn subscribe(&mut self, _root: &Path) -> Result<Receiver<RawNotification>, WatchError> {
        Ok(self.rx.clone())
    }

    fn unsubscribe(&mut self) {}
}

/// A watch backend that crashes outright on subscription, standing in for a
/// native-library fault inside one volume's watch subsystem.
struct PanickingSource;

impl NotificationSource for PanickingSource {
    fn subscribe(&mut self, _root: &Path) -> Result<Receiver<RawNotification>, WatchError> {
        panic!("watch backend exploded");
    }

    fn unsubscribe(&mut self) {}
}

fn test_config(log_root: &Path) -> WatchConfig {
    WatchConfig {
        log_root: log_root.to_path_buf(),
        shutdown_grace_secs: 5,
        ..WatchConfig::default()
    }
}

fn created(path: &str) -> RawNotification {
    RawNotification {
        kind: RawKind::Created,
        is_dir: false,
        path: PathBuf::from(path),
        dest: None,
    }
}

/// Poll until `path` contains `needle`, panicking after a generous deadline.
/// 10 seconds is far more than any tmpdir write needs, but short enough that
/// a genuinely stuck worker fails the test rather than hanging the suite.
fn wait_for_line(path: &Path, needle: &str) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Ok(text) = fs::read_to_string(path) {
            if text.contains(needle) {
                return;
            }
        }
        assert!(
            Instant::now() < deadline,
            "timed out waiting for {needle:?} in {path:?}"
        );
        thread::sleep(Duration::from_millis(10));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// A panic inside one volume's worker is contained at the worker boundary:
/// the sibling keeps logging and the supervisor shuts down cleanly.
#[test]
fn panicking_worker_does_not_stop_siblings() {
    let root_a = TempDir::new().expect("failed to create temp dir");
    let root_b = TempDir::new().expect("failed to create temp dir");
    let log_root = TempDir::new().expect("failed to create temp dir");

    let volume_a = Volume::new(root_a.path());
    let volume_b = Volume::new(root_b.path());

    let (tx_b, rx_b) = unbounded();
    let panicking_root = volume_a.root.clone();

    let supervisor = Supervisor::new(test_config(log_root.path()));
    let registry = supervisor.registry();
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

    let volumes = vec![volume_a.clone(), volume_b.clone()];
    let run = thread::spawn(move || {
        supervisor.run(
            volumes,
            move |volume| -> Box<dyn NotificationSource> {
                if volume.root == panicking_root {
                    Box::new(PanickingSource)
                } else {
                    Box::new(ScriptedSource { rx: rx_b.clone() })
                }
            },
            shutdown_rx,
        );
    });

    // The sibling must still process events after volume A's worker died.
    tx_b.send(created("survivor.txt")).unwrap();
    let log_b = LogRotator::new(log_root.path()).resolve(&volume_b.id, Local::now());
    wait_for_line(&log_b, "File created: survivor.txt");

    shutdown_tx.send(()).unwrap();
    run.join().expect("supervisor must not panic");

    let states = registry.read();
    assert_eq!(states.get(&volume_b.id).copied(), Some(MonitorState::Stopped));
    // The crashed worker never reached Watching and never got to Stopped.
    assert_ne!(states.get(&volume_a.id).copied(), Some(MonitorState::Watching));
}

/// When every stream closes on its own, the run ends without any shutdown
/// signal.
#[test]
fn natural_worker_exit_ends_the_run() {
    let root = TempDir::new().expect("failed to create temp dir");
    let log_root = TempDir::new().expect("failed to create temp dir");
    let volume = Volume::new(root.path());

    let (tx, rx) = unbounded();
    let supervisor = Supervisor::new(test_config(log_root.path()));
    let (_shutdown_tx, shutdown_rx) = bounded::<()>(1);

    tx.send(created("only.txt")).unwrap();
    drop(tx);

    // With the stream already closed, run() must return on its own.
    supervisor.run(
        vec![volume.clone()],
        move |_| Box::new(ScriptedSource { rx: rx.clone() }) as Box<dyn NotificationSource>,
        shutdown_rx,
    );

    let log = LogRotator::new(log_root.path()).resolve(&volume.id, Local::now());
    let text = fs::read_to_string(&log).expect("log file must exist");
    assert!(text.contains("File created: only.txt"), "{text}");
}

/// A shutdown signal stops idle workers within the grace period; none of
/// them has events in flight, so all acknowledge promptly.
#[test]
fn shutdown_stops_all_idle_workers() {
    let root_a = TempDir::new().expect("failed to create temp dir");
    let root_b = TempDir::new().expect("failed to create temp dir");
    let log_root = TempDir::new().expect("failed to create temp dir");

    let volume_a = Volume::new(root_a.path());
    let volume_b = Volume::new(root_b.path());

    // Keep both senders alive so neither stream closes by itself.
    let (_tx_a, rx_a) = unbounded::<RawNotification>();
    let (_tx_b, rx_b) = unbounded::<RawNotification>();

    let supervisor = Supervisor::new(test_config(log_root.path()));
    let registry = supervisor.registry();
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

    let root_a_path = volume_a.root.clone();
    let volumes = vec![volume_a.clone(), volume_b.clone()];
    let run = thread::spawn(move || {
        supervisor.run(
            volumes,
            move |volume| -> Box<dyn NotificationSource> {
                if volume.root == root_a_path {
                    Box::new(ScriptedSource { rx: rx_a.clone() })
                } else {
                    Box::new(ScriptedSource { rx: rx_b.clone() })
                }
            },
            shutdown_rx,
        );
    });

    // Give the workers a moment to reach Watching, then pull the plug.
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        {
            let states = registry.read();
            if states.get(&volume_a.id) == Some(&MonitorState::Watching)
                && states.get(&volume_b.id) == Some(&MonitorState::Watching)
            {
                break;
            }
        }
        assert!(Instant::now() < deadline, "workers never reached Watching");
        thread::sleep(Duration::from_millis(10));
    }

    shutdown_tx.send(()).unwrap();
    run.join().expect("supervisor must not panic");

    let states = registry.read();
    assert_eq!(states.get(&volume_a.id).copied(), Some(MonitorState::Stopped));
    assert_eq!(states.get(&volume_b.id).copied(), Some(MonitorState::Stopped));
}

/// Volumes whose roots are missing at startup are logged and skipped; the
/// rest of the fleet runs normally.
#[test]
fn unavailable_volume_is_nonfatal_to_the_rest() {
    let root_ok = TempDir::new().expect("failed to create temp dir");
    let log_root = TempDir::new().expect("failed to create temp dir");

    let volume_missing = Volume::new(log_root.path().join("unplugged"));
    let volume_ok = Volume::new(root_ok.path());

    let (tx, rx) = unbounded();
    let supervisor = Supervisor::new(test_config(log_root.path()));
    let (_shutdown_tx, shutdown_rx) = bounded::<()>(1);

    tx.send(created("alive.txt")).unwrap();
    drop(tx);

    supervisor.run(
        vec![volume_missing, volume_ok.clone()],
        move |_| Box::new(ScriptedSource { rx: rx.clone() }) as Box<dyn NotificationSource>,
        shutdown_rx,
    );

    let log = LogRotator::new(log_root.path()).resolve(&volume_ok.id, Local::now());
    let text = fs::read_to_string(&log).expect("log file must exist");
    assert!(text.contains("File created: alive.txt"), "{text}");
}

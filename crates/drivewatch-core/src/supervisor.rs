/// Supervisor — launches one isolated worker per volume and manages their
/// lifetimes.
///
/// Each worker is an OS thread wrapped in `catch_unwind`, so a crash inside
/// one volume's watch pipeline is logged and contained: siblings keep
/// running and the supervisor keeps supervising. Cancellation is
/// cooperative; workers that ignore it past the grace period are abandoned
/// and die with the process.
use crossbeam_channel::{bounded, select, unbounded, Receiver, RecvTimeoutError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::classify::ExtensionFilter;
use crate::config::WatchConfig;
use crate::model::{Volume, VolumeId};
use crate::monitor::{new_registry, StateRegistry, StopReason, VolumeMonitor};
use crate::rotation::LogRotator;
use crate::watch::NotificationSource;

pub struct Supervisor {
    config: WatchConfig,
    registry: StateRegistry,
}

impl Supervisor {
    pub fn new(config: WatchConfig) -> Self {
        Self {
            config,
            registry: new_registry(),
        }
    }

    /// Shared monitor-state view, for embedding frontends and tests.
    pub fn registry(&self) -> StateRegistry {
        self.registry.clone()
    }

    /// Launch one worker per volume and block until every worker exits
    /// naturally or `shutdown` signals.
    ///
    /// On shutdown, cancellation is broadcast to all workers, which are
    /// then given a bounded grace period to acknowledge before being
    /// abandoned. One stuck worker never blocks the shutdown of the others.
    pub fn run<F>(&self, volumes: Vec<Volume>, make_source: F, shutdown: Receiver<()>)
    where
        F: Fn(&Volume) -> Box<dyn NotificationSource>,
    {
        if volumes.is_empty() {
            warn!("no volumes to watch; nothing to supervise");
            return;
        }

        let rotator = LogRotator::new(&self.config.log_root);
        let filter = ExtensionFilter::new(self.config.watched_extensions.iter().cloned());

        // Dropping `stop_tx` closes the channel, which every worker
        // observes as the cancellation signal.
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let (done_tx, done_rx) = unbounded::<(VolumeId, StopReason)>();

        let mut workers = Vec::with_capacity(volumes.len());
        for volume in &volumes {
            let source = make_source(volume);
            let monitor = VolumeMonitor::new(
                volume.clone(),
                source,
                rotator.clone(),
                filter.clone(),
                self.registry.clone(),
            );
            let worker_stop = stop_rx.clone();
            let worker_done = done_tx.clone();
            let id = volume.id.clone();

            let handle = thread::Builder::new()
                .name(format!("drivewatch-{}", volume.id))
                .spawn(move || {
                    let reason = match catch_unwind(AssertUnwindSafe(|| monitor.run(&worker_stop)))
                    {
                        Ok(reason) => reason,
                        Err(panic) => {
                            error!(
                                "worker for volume '{}' panicked: {}",
                                id,
                                panic_message(panic.as_ref())
                            );
                            StopReason::Panicked
                        }
                    };
                    let _ = worker_done.send((id, reason));
                })
                .expect("failed to spawn volume worker");
            workers.push((volume.id.clone(), handle));
        }
        drop(done_tx);

        info!("Supervising {} volume worker(s)", workers.len());

        // Block until all workers are done or shutdown is requested.
        let mut remaining = workers.len();
        let shutdown_requested = loop {
            select! {
                recv(done_rx) -> msg => match msg {
                    Ok((id, reason)) => {
                        info!("worker for volume '{}' exited: {reason:?}", id);
                        remaining -= 1;
                        if remaining == 0 {
                            break false;
                        }
                    }
                    Err(_) => break false,
                },
                recv(shutdown) -> _ => break true,
            }
        };

        if shutdown_requested {
            info!("Shutdown requested; stopping {remaining} worker(s)");
        }

        // Broadcast cancellation and wait out the grace period.
        drop(stop_tx);
        let deadline = Instant::now() + self.config.shutdown_grace();
        while remaining > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match done_rx.recv_timeout(left) {
                Ok((id, reason)) => {
                    info!("worker for volume '{}' stopped: {reason:?}", id);
                    remaining -= 1;
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Join acknowledged workers; abandon stragglers. A straggler dies
        // with the process, which is the forced-termination escalation.
        for (id, handle) in workers {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                warn!(
                    "worker for volume '{}' did not stop within the grace period; abandoning",
                    id
                );
            }
        }

        for (id, state) in self.registry.read().iter() {
            debug!("final state for volume '{}': {state:?}", id);
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

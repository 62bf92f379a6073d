/// Per-volume monitor — binds a notification source to the classifier and
/// log rotator for one volume and owns the watch lifecycle.
///
/// State machine: `Idle -> Watching -> Stopped`. The steady-state loop is
/// event-driven: it suspends on the notification channel and the shutdown
/// channel, never polling on a timer. Per volume, records are emitted in
/// FIFO order relative to notification arrival.
use chrono::{DateTime, Local};
use crossbeam_channel::{select, Receiver};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classify::{classify, ExtensionFilter};
use crate::error::WatchError;
use crate::model::{Volume, VolumeId};
use crate::rotation::{ActiveLogHandle, LogRotator};
use crate::watch::{NotificationSource, RawNotification};

/// Lifecycle state of one volume monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Watching,
    Stopped,
}

/// Shared view of every monitor's state, written by the workers and read by
/// the supervisor for shutdown diagnostics.
pub type StateRegistry = Arc<RwLock<HashMap<VolumeId, MonitorState>>>;

pub fn new_registry() -> StateRegistry {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Why a monitor left `Watching` (or never reached it).
#[derive(Debug)]
pub enum StopReason {
    /// Cooperative shutdown requested by the supervisor.
    Shutdown,
    /// The volume root was gone when the watch was about to start.
    VolumeUnavailable,
    /// The OS watch facility refused the subscription.
    SubscriptionFailed(WatchError),
    /// The notification stream ended on its own.
    StreamClosed,
    /// The worker panicked; recorded by the supervisor, never returned by
    /// the monitor itself.
    Panicked,
}

/// Monitors a single volume until shutdown or an unrecoverable error.
pub struct VolumeMonitor {
    volume: Volume,
    source: Box<dyn NotificationSource>,
    rotator: LogRotator,
    filter: ExtensionFilter,
    state: MonitorState,
    registry: StateRegistry,
}

impl VolumeMonitor {
    pub fn new(
        volume: Volume,
        source: Box<dyn NotificationSource>,
        rotator: LogRotator,
        filter: ExtensionFilter,
        registry: StateRegistry,
    ) -> Self {
        registry.write().insert(volume.id.clone(), MonitorState::Idle);
        Self {
            volume,
            source,
            rotator,
            filter,
            state: MonitorState::Idle,
            registry,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Run until shutdown or an unrecoverable error, then flush, close, and
    /// unsubscribe. Restart policy belongs to the caller; a stopped monitor
    /// is finished.
    pub fn run(mut self, shutdown: &Receiver<()>) -> StopReason {
        let reason = self.watch(shutdown);
        self.set_state(MonitorState::Stopped);
        debug!("monitor for volume '{}' stopped: {reason:?}", self.volume.id);
        reason
    }

    fn watch(&mut self, shutdown: &Receiver<()>) -> StopReason {
        if !self.volume.root.exists() {
            warn!(
                "volume root {:?} is not available; worker for '{}' will not start",
                self.volume.root, self.volume.id
            );
            return StopReason::VolumeUnavailable;
        }

        // Sink failures are never fatal: a missing sink drops records until
        // a later event manages to reopen it.
        let mut sink = match self.rotator.open(&self.volume.id, Local::now()) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("cannot open log sink for volume '{}': {err}", self.volume.id);
                None
            }
        };

        let events = match self.source.subscribe(&self.volume.root) {
            Ok(rx) => rx,
            Err(err) => {
                warn!("cannot watch volume '{}': {err}", self.volume.id);
                return StopReason::SubscriptionFailed(err);
            }
        };

        self.set_state(MonitorState::Watching);
        info!(
            "Start watching volume '{}' at {:?}",
            self.volume.id, self.volume.root
        );

        let reason = loop {
            select! {
                recv(events) -> msg => match msg {
                    Ok(raw) => self.handle_notification(raw, &mut sink),
                    Err(_) => break StopReason::StreamClosed,
                },
                recv(shutdown) -> _ => break StopReason::Shutdown,
            }
        };

        self.source.unsubscribe();
        if let Some(handle) = sink.take() {
            if let Err(err) = handle.close() {
                warn!(
                    "closing log sink for volume '{}' failed: {err}",
                    self.volume.id
                );
            }
        }
        reason
    }

    /// Process one raw notification: rotation check first, then classify,
    /// then append and mirror to the console.
    fn handle_notification(&self, raw: RawNotification, sink: &mut Option<ActiveLogHandle>) {
        let now = Local::now();
        self.ensure_sink(sink, now);

        let Some(record) = classify(&raw, &self.filter, now) else {
            return;
        };

        match sink.as_mut() {
            Some(handle) => {
                if let Err(err) = handle.append(&record) {
                    // Record loss is accepted rather than blocking the pipeline.
                    warn!("write to {:?} failed: {err}", handle.path());
                }
            }
            None => warn!(
                "no active log sink for volume '{}'; record dropped",
                self.volume.id
            ),
        }

        // Console mirror for live observation.
        info!("[{}] {}", self.volume.id, record.message());
    }

    /// Make `sink` target the date of `now`: rotate on date change, reopen
    /// after an earlier sink failure. Runs before every event, so even a
    /// quiet volume rotates at its first event past midnight.
    fn ensure_sink(&self, sink: &mut Option<ActiveLogHandle>, now: DateTime<Local>) {
        match sink.take() {
            Some(handle) if handle.needs_rotation(now) => {
                let old_date = handle.date().to_string();
                match self.rotator.rotate(handle, now) {
                    Ok(fresh) => {
                        debug!(
                            "rotated volume '{}' log: {} -> {}",
                            self.volume.id,
                            old_date,
                            fresh.date()
                        );
                        *sink = Some(fresh);
                    }
                    Err(err) => {
                        warn!("log rotation failed for volume '{}': {err}", self.volume.id)
                    }
                }
            }
            Some(handle) => *sink = Some(handle),
            None => match self.rotator.open(&self.volume.id, now) {
                Ok(fresh) => *sink = Some(fresh),
                Err(err) => warn!(
                    "cannot open log sink for volume '{}': {err}",
                    self.volume.id
                ),
            },
        }
    }

    fn set_state(&mut self, state: MonitorState) {
        self.state = state;
        self.registry.write().insert(self.volume.id.clone(), state);
    }
}

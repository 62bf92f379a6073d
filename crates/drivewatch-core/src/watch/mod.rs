/// Notification-source boundary — the OS facility that delivers raw
/// filesystem change notifications for a subtree.
///
/// A [`NotificationSource`] yields a lazy, unbounded sequence of
/// [`RawNotification`]s over a channel; the per-volume worker blocks on the
/// receiving end. The production implementation lives in
/// [`notify_source`]; tests substitute a channel-backed fake.
pub mod notify_source;

pub use notify_source::NotifySource;

use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};

use crate::error::WatchError;

/// What the OS reported happening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawKind {
    Created,
    Modified,
    Deleted,
    Moved,
}

/// One raw change notification as delivered by the platform watcher.
#[derive(Clone, Debug)]
pub struct RawNotification {
    pub kind: RawKind,
    /// True when the notification concerns a directory. Best-effort for
    /// deletions, where the path no longer exists and only the
    /// notification's own tag can tell.
    pub is_dir: bool,
    /// The affected path; for moves, the source.
    pub path: PathBuf,
    /// Destination path. Present only for [`RawKind::Moved`].
    pub dest: Option<PathBuf>,
}

/// Capacity of the channel between the platform watcher and a volume worker.
///
/// Bursts beyond this are dropped rather than blocking the watcher callback;
/// the pipeline never applies backpressure to the OS facility.
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 2048;

/// A per-volume subscription to OS change notifications.
///
/// `subscribe` watches `root` recursively and returns the receiving end of
/// the notification channel. The stream is non-restartable: once the
/// source is unsubscribed (or dropped), the receiver reports disconnection
/// and the subscription cannot be revived.
pub trait NotificationSource: Send {
    fn subscribe(&mut self, root: &Path) -> Result<Receiver<RawNotification>, WatchError>;

    /// Stop delivering notifications. Idempotent.
    fn unsubscribe(&mut self);
}

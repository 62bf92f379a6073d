/// Production notification source backed by the `notify` crate.
///
/// The platform watcher delivers events on its own thread; this adapter
/// translates them into [`RawNotification`]s and forwards them over a
/// bounded crossbeam channel that the volume worker blocks on. Rename
/// halves (`From` then `To`) are paired into a single move notification.
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use notify::event::{CreateKind, EventKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::{NotificationSource, RawKind, RawNotification, NOTIFICATION_CHANNEL_CAPACITY};
use crate::error::WatchError;

/// One recursive watch over a volume root.
#[derive(Default)]
pub struct NotifySource {
    watcher: Option<(RecommendedWatcher, PathBuf)>,
}

impl NotifySource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSource for NotifySource {
    fn subscribe(&mut self, root: &Path) -> Result<Receiver<RawNotification>, WatchError> {
        let (tx, rx) = bounded(NOTIFICATION_CHANNEL_CAPACITY);
        let mut translator = Translator::new(tx);

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => translator.handle(event),
                Err(err) => warn!("watch stream error: {err}"),
            },
            NotifyConfig::default(),
        )
        .map_err(|source| WatchError::Subscribe {
            path: root.to_path_buf(),
            source,
        })?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Subscribe {
                path: root.to_path_buf(),
                source,
            })?;

        self.watcher = Some((watcher, root.to_path_buf()));
        Ok(rx)
    }

    fn unsubscribe(&mut self) {
        if let Some((mut watcher, root)) = self.watcher.take() {
            let _ = watcher.unwatch(&root);
            // Dropping the watcher ends the stream; the worker's receiver
            // reports disconnection once the buffer drains.
        }
    }
}

/// Stateful event translation: `notify` events in, raw notifications out.
struct Translator {
    tx: Sender<RawNotification>,
    /// Source half of a rename awaiting its destination half.
    pending_rename: Option<PathBuf>,
}

impl Translator {
    fn new(tx: Sender<RawNotification>) -> Self {
        Self {
            tx,
            pending_rename: None,
        }
    }

    fn handle(&mut self, event: Event) {
        match event.kind {
            EventKind::Create(kind) => {
                for path in event.paths {
                    let is_dir = create_is_dir(kind, &path);
                    self.send(RawNotification {
                        kind: RawKind::Created,
                        is_dir,
                        path,
                        dest: None,
                    });
                }
            }
            EventKind::Modify(ModifyKind::Name(mode)) => self.handle_rename(mode, event.paths),
            EventKind::Modify(_) => {
                for path in event.paths {
                    let is_dir = probe_is_dir(&path);
                    self.send(RawNotification {
                        kind: RawKind::Modified,
                        is_dir,
                        path,
                        dest: None,
                    });
                }
            }
            EventKind::Remove(kind) => {
                for path in event.paths {
                    // The path is already gone; the notification's own tag
                    // is the only way to tell files from directories.
                    let is_dir = matches!(kind, RemoveKind::Folder);
                    self.send(RawNotification {
                        kind: RawKind::Deleted,
                        is_dir,
                        path,
                        dest: None,
                    });
                }
            }
            EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
        }
    }

    fn handle_rename(&mut self, mode: RenameMode, mut paths: Vec<PathBuf>) {
        match mode {
            RenameMode::Both => {
                if paths.len() >= 2 {
                    let dest = paths.pop();
                    let path = paths.swap_remove(0);
                    let is_dir = dest.as_deref().map(probe_is_dir).unwrap_or(false);
                    self.send(RawNotification {
                        kind: RawKind::Moved,
                        is_dir,
                        path,
                        dest,
                    });
                }
            }
            RenameMode::From => {
                self.pending_rename = paths.into_iter().next();
            }
            RenameMode::To => {
                let Some(dest) = paths.into_iter().next() else {
                    return;
                };
                match self.pending_rename.take() {
                    Some(from) => {
                        let is_dir = probe_is_dir(&dest);
                        self.send(RawNotification {
                            kind: RawKind::Moved,
                            is_dir,
                            path: from,
                            dest: Some(dest),
                        });
                    }
                    // A destination with no tracked source entered the
                    // subtree: report it as a creation.
                    None => {
                        let is_dir = probe_is_dir(&dest);
                        self.send(RawNotification {
                            kind: RawKind::Created,
                            is_dir,
                            path: dest,
                            dest: None,
                        });
                    }
                }
            }
            _ => {
                // Backends that do not half-tag renames deliver both paths
                // in one event, or a single path with no counterpart.
                if paths.len() >= 2 {
                    let dest = paths.pop();
                    let path = paths.swap_remove(0);
                    let is_dir = dest.as_deref().map(probe_is_dir).unwrap_or(false);
                    self.send(RawNotification {
                        kind: RawKind::Moved,
                        is_dir,
                        path,
                        dest,
                    });
                } else if let Some(path) = paths.into_iter().next() {
                    if path.exists() {
                        let is_dir = probe_is_dir(&path);
                        self.send(RawNotification {
                            kind: RawKind::Created,
                            is_dir,
                            path,
                            dest: None,
                        });
                    } else {
                        self.send(RawNotification {
                            kind: RawKind::Deleted,
                            is_dir: false,
                            path,
                            dest: None,
                        });
                    }
                }
            }
        }
    }

    fn send(&self, notification: RawNotification) {
        if let Err(TrySendError::Full(dropped)) = self.tx.try_send(notification) {
            warn!("notification channel full; dropping event for {:?}", dropped.path);
        }
    }
}

/// Entity kind for a creation: trust the notification's tag where present,
/// probe the filesystem otherwise.
fn create_is_dir(kind: CreateKind, path: &Path) -> bool {
    match kind {
        CreateKind::Folder => true,
        CreateKind::File => false,
        _ => probe_is_dir(path),
    }
}

/// Best-effort entity probe for paths that may still exist.
fn probe_is_dir(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

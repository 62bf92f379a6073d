/// Error taxonomy for the monitoring pipeline.
///
/// Every variant is contained at the worker boundary: none of these abort
/// the supervisor, they only decide what a single worker logs and whether
/// it keeps running.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    /// The volume root was missing when the watch was about to start.
    #[error("volume root {0:?} is not available")]
    VolumeUnavailable(PathBuf),

    /// The OS change-notification facility refused the subscription.
    #[error("failed to subscribe to {path:?}: {source}")]
    Subscribe {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// A log file or its directory could not be created or opened.
    #[error("log sink error at {path:?}: {source}")]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file was present but unreadable or malformed.
    #[error("invalid configuration {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

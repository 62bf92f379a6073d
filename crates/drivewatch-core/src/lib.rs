/// DriveWatch Core — volume monitoring, event classification, and log
/// management.
///
/// This crate contains all business logic with zero CLI or service
/// dependencies. The binary wires it together; everything here is equally
/// usable from an embedding frontend or the test suite.
///
/// # Modules
///
/// - [`model`] — log records and volume identity.
/// - [`config`] — runtime configuration with shipped defaults.
/// - [`classify`] — pure notification classification and the extension filter.
/// - [`rotation`] — date-partitioned log files and the active log handle.
/// - [`watch`] — the notification-source boundary and the notify-backed source.
/// - [`monitor`] — the per-volume monitor state machine.
/// - [`supervisor`] — worker spawning, fault isolation, graceful shutdown.
/// - [`retention`] — periodic removal of expired log files.
/// - [`platform`] — volume enumeration (Windows drives / mounted filesystems).
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod monitor;
pub mod platform;
pub mod retention;
pub mod rotation;
pub mod supervisor;
pub mod watch;

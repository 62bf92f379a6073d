/// Data model for the monitoring pipeline.
///
/// Re-exports the log record types and the volume identity types.
pub mod record;
pub mod volume;

pub use record::{ChangeKind, EntityKind, LogRecord};
pub use volume::{Volume, VolumeId};

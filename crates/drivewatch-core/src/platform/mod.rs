/// Platform-specific volume enumeration.
///
/// Windows enumerates drive-letter roots through the Win32 API; every other
/// platform lists mounted filesystems. Both produce the same [`Volume`]
/// model, and both run exactly once at startup.
///
/// [`Volume`]: crate::model::Volume
#[cfg(windows)]
pub mod drives;
#[cfg(not(windows))]
pub mod mounts;

#[cfg(windows)]
pub use drives::enumerate_volumes;
#[cfg(not(windows))]
pub use mounts::enumerate_volumes;

/// Drive enumeration using the Windows API.
///
/// Lists the drive-letter roots eligible for watching. Network drives are
/// skipped — only fixed, removable, and optical drives are returned.
use crate::model::Volume;
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use windows::Win32::Storage::FileSystem::{GetDriveTypeW, GetLogicalDriveStringsW};

// Drive type constants from the Windows API.
const DRIVE_REMOTE_VAL: u32 = 4;

/// Enumerate all local drive roots on the system.
///
/// Returns an empty vec if the Windows API call fails (should not happen
/// on any supported Windows version).
pub fn enumerate_volumes() -> Vec<Volume> {
    let mut volumes = Vec::new();

    // GetLogicalDriveStringsW returns null-separated drive root strings.
    let mut buffer = [0u16; 256];
    let len = unsafe { GetLogicalDriveStringsW(Some(&mut buffer)) };

    if len == 0 {
        tracing::warn!("GetLogicalDriveStringsW returned 0");
        return volumes;
    }

    // Parse the null-separated list of drive roots.
    let full = OsString::from_wide(&buffer[..len as usize]);
    let full_str = full.to_string_lossy();

    for root in full_str.split('\0').filter(|s| !s.is_empty()) {
        let root_wide: Vec<u16> = root.encode_utf16().chain(std::iter::once(0)).collect();
        let raw_type = unsafe { GetDriveTypeW(windows::core::PCWSTR(root_wide.as_ptr())) };

        // Network drives are not watched.
        if raw_type == DRIVE_REMOTE_VAL {
            continue;
        }

        volumes.push(Volume::new(root));
    }

    volumes
}

/// Mounted-filesystem enumeration for non-Windows hosts.
///
/// Uses `sysinfo`'s disk list and filters out virtual filesystems so only
/// roots that can hold user files are watched.
use crate::model::Volume;
use sysinfo::Disks;

/// Filesystems that never hold user files.
fn is_virtual_filesystem(fs: &str) -> bool {
    matches!(
        fs.to_lowercase().as_str(),
        "devfs" | "sysfs" | "proc" | "procfs" | "tmpfs" | "ramfs" | "devtmpfs" | "overlay"
            | "squashfs"
    )
}

/// Enumerate all mounted filesystems eligible for watching.
pub fn enumerate_volumes() -> Vec<Volume> {
    let disks = Disks::new_with_refreshed_list();
    let mut volumes: Vec<Volume> = Vec::new();

    for disk in disks.list() {
        let fs = disk.file_system().to_string_lossy();
        if is_virtual_filesystem(&fs) {
            continue;
        }
        let mount = disk.mount_point();
        if !mount.exists() {
            continue;
        }
        // The same device can appear once per bind mount; keep one entry
        // per mount root.
        if volumes.iter().any(|v| v.root == mount) {
            continue;
        }
        volumes.push(Volume::new(mount));
    }

    volumes
}

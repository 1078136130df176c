#[cfg(target_os = "windows")]
mod windows;
#[cfg(unix)]
mod unix;

use crate::error::Error;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeUsage {
    pub total: u64,
    pub free: u64,
}

impl VolumeUsage {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}

/// Free-space source for the volume hosting a path.
pub trait VolumeInspector: Send + Sync {
    fn usage(&self, path: &Path) -> Result<VolumeUsage, Error>;

    fn free_bytes(&self, path: &Path) -> Result<u64, Error> {
        self.usage(path).map(|u| u.free)
    }
}

/// Asks the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemVolumes;

impl VolumeInspector for SystemVolumes {
    fn usage(&self, path: &Path) -> Result<VolumeUsage, Error> {
        query_usage(path).map_err(|source| Error::VolumeUnavailable {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(unix)]
fn query_usage(path: &Path) -> io::Result<VolumeUsage> {
    unix::statvfs_usage(path)
}

#[cfg(target_os = "windows")]
fn query_usage(path: &Path) -> io::Result<VolumeUsage> {
    windows::disk_free_space(path)
}

#[cfg(not(any(unix, target_os = "windows")))]
fn query_usage(_path: &Path) -> io::Result<VolumeUsage> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "volume queries are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_dir_has_a_volume() {
        let usage = SystemVolumes.usage(Path::new(".")).unwrap();
        assert!(usage.total > 0);
        assert!(usage.free <= usage.total);
    }

    #[test]
    fn test_missing_path_is_unavailable() {
        let err = SystemVolumes
            .free_bytes(Path::new("/definitely/not/mounted/here"))
            .unwrap_err();
        assert!(matches!(err, Error::VolumeUnavailable { .. }));
    }
}

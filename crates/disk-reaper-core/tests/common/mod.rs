#![allow(dead_code)]

use disk_reaper_core::{Error, EventKind, ReaperEvent, VolumeInspector, VolumeUsage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DAY: u64 = 24 * 60 * 60;
pub const MIB: u64 = 1024 * 1024;

/// A whole-second "now" so mtimes round-trip exactly through the filesystem.
pub fn fixed_now() -> SystemTime {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    UNIX_EPOCH + Duration::from_secs(secs)
}

pub fn write_file(path: &Path, len: u64, modified: SystemTime) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = fs::File::options()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .unwrap();
    file.set_len(len).unwrap();
    file.set_modified(modified).unwrap();
    path.to_path_buf()
}

pub fn write_aged(path: &Path, now: SystemTime, age_days: u64) -> PathBuf {
    write_file(path, 16, now - Duration::from_secs(age_days * DAY))
}

/// Names from the "Deleting <name>" log events, in emission order.
pub fn deleted_names(events: &[ReaperEvent]) -> Vec<String> {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Log)
        .filter_map(|e| e.text.strip_prefix("Deleting ").map(str::to_string))
        .collect()
}

pub fn empty_dirs_under(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut has_entries = false;
        for entry in fs::read_dir(&dir).unwrap().flatten() {
            has_entries = true;
            if entry.file_type().unwrap().is_dir() {
                stack.push(entry.path());
            }
        }
        if !has_entries && dir != root {
            found.push(dir);
        }
    }
    found
}

/// Reports a fixed amount of free space for every path.
pub struct FixedFree(pub u64);

impl VolumeInspector for FixedFree {
    fn usage(&self, _path: &Path) -> Result<VolumeUsage, Error> {
        Ok(VolumeUsage {
            total: self.0 * 4,
            free: self.0,
        })
    }
}

/// Behaves like an unplugged drive.
pub struct Unplugged;

impl VolumeInspector for Unplugged {
    fn usage(&self, path: &Path) -> Result<VolumeUsage, Error> {
        Err(Error::VolumeUnavailable {
            path: path.to_path_buf(),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    }
}

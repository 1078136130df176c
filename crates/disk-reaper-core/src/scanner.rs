use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;
use walkdir::WalkDir;

/// A file as seen at scan time. Stale as soon as anyone else touches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: SystemTime,
}

impl FileEntry {
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = path.symlink_metadata()?;
        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            modified_at: metadata.modified()?,
        })
    }
}

/// Depth-first walk of the regular files under `directory`.
///
/// Entries that cannot be read (permission denied, removed mid-walk) are
/// logged and skipped. Symlinks are not followed.
pub fn scan(directory: &Path) -> impl Iterator<Item = FileEntry> {
    WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    warn!("Error reading metadata for {}: {}", entry.path().display(), err);
                    return None;
                }
            };
            let modified_at = match metadata.modified() {
                Ok(t) => t,
                Err(err) => {
                    warn!("No modification time for {}: {}", entry.path().display(), err);
                    return None;
                }
            };
            Some(FileEntry {
                path: entry.into_path(),
                size_bytes: metadata.len(),
                modified_at,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_returns_files_only() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("top.log"), "12345").unwrap();
        fs::write(root.join("a/b/deep.log"), "xy").unwrap();

        let mut entries: Vec<FileEntry> = scan(root).collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, root.join("a/b/deep.log"));
        assert_eq!(entries[0].size_bytes, 2);
        assert_eq!(entries[1].path, root.join("top.log"));
        assert_eq!(entries[1].size_bytes, 5);
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let tmp = tempdir().unwrap();
        assert_eq!(scan(&tmp.path().join("gone")).count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_does_not_follow_symlinks() {
        let tmp = tempdir().unwrap();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("keep.bin"), "data").unwrap();
        std::os::unix::fs::symlink(outside.path(), tmp.path().join("link")).unwrap();

        assert_eq!(scan(tmp.path()).count(), 0);
    }
}

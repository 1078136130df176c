use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Directories that lost files during one target pass.
///
/// Filled while reaping, then flushed once so the affected subtrees can be
/// pruned before the rest of the target.
#[derive(Debug, Default)]
pub struct DeletedDirTracker {
    dirs: BTreeSet<PathBuf>,
}

impl DeletedDirTracker {
    pub fn record(&mut self, deleted_file: &Path) {
        if let Some(parent) = deleted_file.parent() {
            self.dirs.insert(parent.to_path_buf());
        }
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Take the recorded directories that lie under `root`, reduced to the
    /// outermost ones. Clears the tracker.
    pub fn flush(&mut self, root: &Path) -> Vec<PathBuf> {
        let dirs: Vec<PathBuf> = std::mem::take(&mut self.dirs)
            .into_iter()
            .filter(|dir| dir.starts_with(root))
            .collect();
        outermost_directories(dirs)
    }
}

/// Keep only directories that are not below another one in the list.
pub fn outermost_directories(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for dir in dirs {
        if result.iter().any(|kept| dir.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !kept.starts_with(&dir));
        result.push(dir);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_log_dirs_all_kept() {
        let dirs = vec![
            PathBuf::from("/data/logs/2024/01"),
            PathBuf::from("/data/logs/2024/02"),
            PathBuf::from("/data/cache/thumbs"),
        ];
        assert_eq!(outermost_directories(dirs.clone()), dirs);
    }

    #[test]
    fn test_parent_seen_last_replaces_children() {
        let dirs = vec![
            PathBuf::from("/data/logs/2024/01"),
            PathBuf::from("/data/logs/2024/01/rotated"),
            PathBuf::from("/data/logs/2024/02"),
            PathBuf::from("/data/logs/2024"),
            PathBuf::from("/data/cache"),
        ];
        assert_eq!(
            outermost_directories(dirs),
            vec![PathBuf::from("/data/logs/2024"), PathBuf::from("/data/cache")]
        );
    }

    #[test]
    fn test_prefix_without_separator_is_not_a_parent() {
        let dirs = vec![PathBuf::from("/data/log"), PathBuf::from("/data/logs")];
        assert_eq!(outermost_directories(dirs).len(), 2);
    }

    #[test]
    fn test_flush_scopes_to_root_and_clears() {
        let mut tracker = DeletedDirTracker::default();
        tracker.record(Path::new("/data/logs/2024/01/a.log"));
        tracker.record(Path::new("/data/logs/2024/01/b.log"));
        tracker.record(Path::new("/data/logs/2024/a.log"));
        tracker.record(Path::new("/data/logs/2025/02/c.log"));
        tracker.record(Path::new("/elsewhere/x.log"));
        assert_eq!(tracker.len(), 4);

        let scopes = tracker.flush(Path::new("/data/logs"));
        assert_eq!(
            scopes,
            vec![
                PathBuf::from("/data/logs/2024"),
                PathBuf::from("/data/logs/2025/02"),
            ]
        );
        assert!(tracker.is_empty());
    }
}

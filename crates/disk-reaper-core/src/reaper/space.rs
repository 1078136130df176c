use super::{delete_file, report_entry_error};
use crate::context::SweepContext;
use crate::error::Error;
use crate::pruner::EmptyDirPruner;
use crate::scanner::{self, FileEntry};
use crate::tracker::DeletedDirTracker;
use crate::volume::VolumeInspector;
use std::path::Path;
use tracing::info;

/// Deletes the oldest files under a directory until the hosting volume has
/// the requested free space, then prunes empty directories below it.
///
/// Free space is queried once; each deleted file's size is then added to a
/// running estimate. Concurrent writers on the volume are not accounted for.
pub struct SpaceReaper<'a> {
    ctx: &'a SweepContext,
    volumes: &'a dyn VolumeInspector,
}

impl<'a> SpaceReaper<'a> {
    pub fn new(ctx: &'a SweepContext, volumes: &'a dyn VolumeInspector) -> Self {
        Self { ctx, volumes }
    }

    /// Returns the number of bytes freed.
    pub fn reap(&self, volume: &Path, target_free_bytes: u64, directory: &Path) -> Result<u64, Error> {
        let candidates = oldest_first(scanner::scan(directory).collect());
        let mut free = self.volumes.free_bytes(volume)?;

        let mut tracker = DeletedDirTracker::default();
        let mut freed = 0u64;
        let mut deleted = 0usize;

        for entry in &candidates {
            if free >= target_free_bytes {
                break;
            }
            if self.ctx.is_cancelled() {
                self.ctx.events().status("Stopped");
                break;
            }
            match delete_file(self.ctx, &entry.path) {
                Ok(size) => {
                    freed += size;
                    free = free.saturating_add(size);
                    deleted += 1;
                    tracker.record(&entry.path);
                }
                Err(e) => report_entry_error(self.ctx, &e),
            }
        }

        info!(
            "Space pass over {} deleted {} file(s), {} bytes; estimated free {} of {} wanted",
            directory.display(),
            deleted,
            freed,
            free,
            target_free_bytes
        );

        // Subtrees that lost files first, then whatever else is empty.
        let pruner = EmptyDirPruner::new(self.ctx);
        for scope in tracker.flush(directory) {
            if scope != directory {
                pruner.prune_subtree(&scope);
                pruner.prune_ancestors(&scope, directory);
            }
        }
        pruner.prune(directory);

        Ok(freed)
    }
}

/// Stable sort by modification time, oldest first.
pub fn oldest_first(mut entries: Vec<FileEntry>) -> Vec<FileEntry> {
    entries.sort_by_key(|e| e.modified_at);
    entries
}

use super::{delete_file, report_entry_error};
use crate::context::SweepContext;
use crate::pruner::is_empty_dir;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// True when `modified_at` is at least `threshold_days` before `now`.
/// Files stamped in the future are never eligible.
pub fn is_expired(modified_at: SystemTime, now: SystemTime, threshold_days: u64) -> bool {
    let threshold = Duration::from_secs(threshold_days.saturating_mul(SECS_PER_DAY));
    match now.duration_since(modified_at) {
        Ok(age) => age >= threshold,
        Err(_) => false,
    }
}

/// Deletes files older than a threshold.
///
/// Directories are walked contents-first and each sub-directory is removed
/// as soon as its own contents are done, if that left it empty.
pub struct AgeReaper<'a> {
    ctx: &'a SweepContext,
}

impl<'a> AgeReaper<'a> {
    pub fn new(ctx: &'a SweepContext) -> Self {
        Self { ctx }
    }

    /// Returns the number of files deleted.
    pub fn reap(&self, target: &Path, threshold_days: u64, now: SystemTime) -> usize {
        let events = self.ctx.events();
        events.log(format!("Target Path: {}.", target.display()));
        events.log(format!(
            "Delete all the files older than {} day(s).",
            threshold_days
        ));

        if self.ctx.is_cancelled() {
            events.status("Stopped");
            return 0;
        }

        let deleted = if target.is_file() {
            usize::from(self.reap_file(target, threshold_days, now))
        } else if target.is_dir() {
            self.reap_dir(target, threshold_days, now)
        } else {
            warn!("Target path {} does not exist", target.display());
            0
        };

        info!(
            "Age pass over {} deleted {} file(s)",
            target.display(),
            deleted
        );
        deleted
    }

    fn reap_file(&self, path: &Path, threshold_days: u64, now: SystemTime) -> bool {
        let modified_at = match path.symlink_metadata().and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                debug!("Could not stat {}: {}", path.display(), e);
                return false;
            }
        };
        if !is_expired(modified_at, now, threshold_days) {
            return false;
        }
        match delete_file(self.ctx, path) {
            Ok(_) => true,
            Err(e) => {
                report_entry_error(self.ctx, &e);
                false
            }
        }
    }

    fn reap_dir(&self, root: &Path, threshold_days: u64, now: SystemTime) -> usize {
        let mut deleted = 0;

        for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            if self.ctx.is_cancelled() {
                self.ctx.events().status("Stopped");
                return deleted;
            }

            let file_type = entry.file_type();
            if file_type.is_file() {
                if self.reap_file(entry.path(), threshold_days, now) {
                    deleted += 1;
                }
            } else if file_type.is_dir() && entry.depth() > 0 {
                self.remove_if_empty(entry.path());
            }
        }

        deleted
    }

    fn remove_if_empty(&self, dir: &Path) {
        if !matches!(is_empty_dir(dir), Ok(true)) {
            return;
        }
        let events = self.ctx.events();
        events.status(format!("Deleting Empty Directory: {}", dir.display()));
        if let Err(e) = fs::remove_dir(dir) {
            events.log(format!("Error: {} ({})", e, dir.display()));
        }
    }
}

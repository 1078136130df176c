use crate::context::SweepContext;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Removes directories left empty by reaping, deepest level first.
///
/// Siblings at one level are independent, so each level is fanned out over a
/// rayon pool sized from the context's worker count at the start of the pass.
pub struct EmptyDirPruner<'a> {
    ctx: &'a SweepContext,
}

impl<'a> EmptyDirPruner<'a> {
    pub fn new(ctx: &'a SweepContext) -> Self {
        Self { ctx }
    }

    /// Remove every empty directory below `root`. `root` itself is kept.
    pub fn prune(&self, root: &Path) -> usize {
        if self.ctx.is_cancelled() {
            return 0;
        }

        let levels = collect_levels(root);
        if levels.is_empty() {
            return 0;
        }

        let workers = self.ctx.worker_count();
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                error!("Could not start {} prune workers, pruning serially: {}", workers, e);
                None
            }
        };

        let mut removed = 0;
        for (_depth, dirs) in levels.into_iter().rev() {
            if self.ctx.is_cancelled() {
                break;
            }
            removed += match &pool {
                Some(pool) => pool.install(|| {
                    dirs.par_iter()
                        .filter(|dir| self.remove_if_empty(dir))
                        .count()
                }),
                None => dirs.iter().filter(|dir| self.remove_if_empty(dir)).count(),
            };
        }

        debug!("Pruned {} empty directories under {}", removed, root.display());
        removed
    }

    /// Prune below `dir`, then `dir` itself if that left it empty.
    pub fn prune_subtree(&self, dir: &Path) -> usize {
        let removed = self.prune(dir);
        if !self.ctx.is_cancelled() && self.remove_if_empty(dir) {
            removed + 1
        } else {
            removed
        }
    }

    /// Walk up from `dir` towards `root` (exclusive), removing parents that
    /// are now empty. Stops at the first one that is not.
    pub fn prune_ancestors(&self, dir: &Path, root: &Path) -> usize {
        let mut removed = 0;
        let mut current = dir.parent();
        while let Some(parent) = current {
            if parent == root || !parent.starts_with(root) {
                break;
            }
            if !self.remove_if_empty(parent) {
                break;
            }
            removed += 1;
            current = parent.parent();
        }
        removed
    }

    fn remove_if_empty(&self, dir: &Path) -> bool {
        if self.ctx.is_cancelled() {
            return false;
        }

        match is_empty_dir(dir) {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return false,
            Err(e) => {
                warn!("Could not read directory {}: {}", dir.display(), e);
                return false;
            }
        }

        let events = self.ctx.events();
        events.status(format!("Deleting Empty Directory: {}", dir.display()));
        match fs::remove_dir(dir) {
            Ok(()) => true,
            Err(e) => {
                // Something may have been written into it since the check.
                events.status(format!("Error deleting folder: {}", e));
                events.log(format!("Error: {} ({})", e, dir.display()));
                false
            }
        }
    }
}

pub(crate) fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

fn collect_levels(root: &Path) -> BTreeMap<usize, Vec<PathBuf>> {
    let mut levels: BTreeMap<usize, Vec<PathBuf>> = BTreeMap::new();
    if !root.is_dir() {
        return levels;
    }
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            levels.entry(entry.depth()).or_default().push(entry.into_path());
        }
    }
    levels
}

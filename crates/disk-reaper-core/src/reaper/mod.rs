pub mod age;
pub mod space;

pub use age::AgeReaper;
pub use space::SpaceReaper;

use crate::context::SweepContext;
use crate::error::Error;
use std::fs;
use std::path::Path;

/// Delete one file, returning its size at deletion time.
///
/// Emits the per-file status/log events and applies the slow-mode delay.
pub(crate) fn delete_file(ctx: &SweepContext, path: &Path) -> Result<u64, Error> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let metadata = path.symlink_metadata().map_err(|e| Error::from_io(path, e))?;

    let events = ctx.events();
    events.status(format!("Deleting {}", name));
    events.log(format!("Deleting {}", name));

    fs::remove_file(path).map_err(|e| Error::from_io(path, e))?;
    ctx.throttle();
    Ok(metadata.len())
}

/// Turn a per-entry failure into events. A file someone else already removed
/// gets a log line but no error status.
pub(crate) fn report_entry_error(ctx: &SweepContext, err: &Error) {
    let events = ctx.events();
    if err.is_vanished() {
        events.log(format!("Skipped: {}", err));
        return;
    }
    events.status(format!("Error deleting file: {}", err));
    events.log(format!("Error: {}", err));
}

use crate::error::Error;
use crate::target::{TargetSource, WatchTarget};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct TargetRow {
    #[serde(rename = "HDD")]
    hdd: String,
    #[serde(rename = "Directory")]
    directory: String,
    #[serde(rename = "Space (GB)")]
    space_gb: Option<f64>,
    #[serde(rename = "Period (Days)")]
    period_days: Option<u64>,
}

impl From<&WatchTarget> for TargetRow {
    fn from(target: &WatchTarget) -> Self {
        Self {
            hdd: target
                .volume_hint
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            directory: target.directory.to_string_lossy().into_owned(),
            space_gb: target.space_quota_gb,
            period_days: target.age_threshold_days,
        }
    }
}

impl From<TargetRow> for WatchTarget {
    fn from(row: TargetRow) -> Self {
        let hdd = row.hdd.trim();
        WatchTarget {
            volume_hint: (!hdd.is_empty()).then(|| PathBuf::from(hdd)),
            directory: PathBuf::from(row.directory.trim()),
            space_quota_gb: row.space_gb,
            age_threshold_days: row.period_days,
        }
    }
}

/// Read the CSV target list. A missing file is an empty list.
///
/// Rows that do not parse are logged with their line number and skipped.
pub fn load_target_list(path: &Path) -> Result<Vec<WatchTarget>, Error> {
    if !path.exists() {
        debug!("Target list {} not found, using no targets", path.display());
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut targets = Vec::new();
    for row in reader.deserialize::<TargetRow>() {
        match row {
            Ok(row) => targets.push(WatchTarget::from(row)),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                warn!(
                    "Skipping row at line {} of {}: {}",
                    line,
                    path.display(),
                    e
                );
            }
        }
    }
    Ok(targets)
}

/// Rewrite the CSV target list, header included.
pub fn save_target_list(path: &Path, targets: &[WatchTarget]) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::from_io(parent, e))?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for target in targets {
        writer.serialize(TargetRow::from(target))?;
    }
    if targets.is_empty() {
        writer.write_record(["HDD", "Directory", "Space (GB)", "Period (Days)"])?;
    }
    writer.flush().map_err(|e| Error::from_io(path, e))?;
    Ok(())
}

/// Append one target, creating the list if needed.
pub fn append_target(path: &Path, target: WatchTarget) -> Result<(), Error> {
    target.validate()?;
    let mut targets = load_target_list(path)?;
    targets.push(target);
    save_target_list(path, &targets)
}

/// Which entries of the target list to remove.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSelector {
    /// 1-based position in the list.
    Position(usize),
    /// Every entry for this directory.
    Directory(PathBuf),
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSelector::Position(n) => write!(f, "position {}", n),
            TargetSelector::Directory(dir) => write!(f, "directory {}", dir.display()),
        }
    }
}

/// Remove entries from the list and rewrite it. Returns what was removed.
pub fn remove_target(path: &Path, selector: &TargetSelector) -> Result<Vec<WatchTarget>, Error> {
    let mut targets = load_target_list(path)?;

    let removed = match selector {
        TargetSelector::Position(n) if (1..=targets.len()).contains(n) => {
            vec![targets.remove(n - 1)]
        }
        TargetSelector::Position(_) => Vec::new(),
        TargetSelector::Directory(dir) => {
            let (removed, kept): (Vec<WatchTarget>, Vec<WatchTarget>) =
                targets.into_iter().partition(|t| &t.directory == dir);
            targets = kept;
            removed
        }
    };

    if removed.is_empty() {
        return Err(Error::TargetNotFound(selector.to_string()));
    }
    save_target_list(path, &targets)?;
    Ok(removed)
}

/// Target source backed by a CSV file, re-read every cycle.
#[derive(Debug, Clone)]
pub struct CsvTargetList {
    path: PathBuf,
}

impl CsvTargetList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TargetSource for CsvTargetList {
    fn load_targets(&self) -> Result<Vec<WatchTarget>, Error> {
        load_target_list(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_drive_letter_list() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("targetlist.csv");
        fs::write(
            &path,
            "HDD,Directory,Space (GB),Period (Days)\n\
             E:,E:/POCB/HEX,500,50\n\
             D:,D:/Program/InputLog,,3\n",
        )
        .unwrap();

        let targets = load_target_list(&path).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].volume_hint, Some(PathBuf::from("E:")));
        assert_eq!(targets[0].space_quota_gb, Some(500.0));
        assert_eq!(targets[0].age_threshold_days, Some(50));
        assert_eq!(targets[1].space_quota_gb, None);
        assert_eq!(targets[1].age_threshold_days, Some(3));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = tempdir().unwrap();
        let targets = load_target_list(&tmp.path().join("nope.csv")).unwrap();
        assert!(targets.is_empty());
    }

    #[test]
    fn test_append_creates_and_keeps_existing() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("conf").join("targetlist.csv");

        append_target(&path, WatchTarget::new("/var/log/app").with_age_threshold_days(7)).unwrap();
        append_target(
            &path,
            WatchTarget::new("/data/db").with_volume("/data").with_space_quota_gb(30.0),
        )
        .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("HDD,Directory,Space (GB),Period (Days)"));

        let targets = CsvTargetList::new(&path).load_targets().unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].volume_hint, None);
        assert_eq!(targets[1].volume_hint, Some(PathBuf::from("/data")));
    }

    #[test]
    fn test_append_rejects_ruleless_target() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("targetlist.csv");
        let err = append_target(&path, WatchTarget::new("/tmp")).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("targetlist.csv");
        fs::write(
            &path,
            "HDD,Directory,Space (GB),Period (Days)\n\
             D:,/x,lots,\n\
             ,/var/log/app,,7\n\
             E:,/too,many,fields,here\n\
             E:,/data/db,30,\n",
        )
        .unwrap();

        let targets = load_target_list(&path).unwrap();
        let dirs: Vec<_> = targets.iter().map(|t| t.directory.clone()).collect();
        assert_eq!(dirs, vec![PathBuf::from("/var/log/app"), PathBuf::from("/data/db")]);
    }

    fn seeded_list(dir: &Path) -> PathBuf {
        let path = dir.join("targetlist.csv");
        save_target_list(
            &path,
            &[
                WatchTarget::new("/var/log/app").with_age_threshold_days(7),
                WatchTarget::new("/data/db").with_volume("/data").with_space_quota_gb(30.0),
                WatchTarget::new("/var/log/app").with_space_quota_gb(5.0),
            ],
        )
        .unwrap();
        path
    }

    #[test]
    fn test_remove_by_position() {
        let tmp = tempdir().unwrap();
        let path = seeded_list(tmp.path());

        let removed = remove_target(&path, &TargetSelector::Position(2)).unwrap();
        assert_eq!(removed[0].directory, PathBuf::from("/data/db"));

        let left = load_target_list(&path).unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|t| t.directory == PathBuf::from("/var/log/app")));
    }

    #[test]
    fn test_remove_by_directory_takes_every_entry() {
        let tmp = tempdir().unwrap();
        let path = seeded_list(tmp.path());

        let removed =
            remove_target(&path, &TargetSelector::Directory(PathBuf::from("/var/log/app"))).unwrap();
        assert_eq!(removed.len(), 2);

        let left = load_target_list(&path).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].volume_hint, Some(PathBuf::from("/data")));
    }

    #[test]
    fn test_remove_last_target_keeps_header() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("targetlist.csv");
        append_target(&path, WatchTarget::new("/tmp/x").with_age_threshold_days(1)).unwrap();

        remove_target(&path, &TargetSelector::Position(1)).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "HDD,Directory,Space (GB),Period (Days)");
        assert!(load_target_list(&path).unwrap().is_empty());
    }

    #[test]
    fn test_remove_unmatched_leaves_list_alone() {
        let tmp = tempdir().unwrap();
        let path = seeded_list(tmp.path());
        let before = fs::read_to_string(&path).unwrap();

        for selector in [
            TargetSelector::Position(0),
            TargetSelector::Position(4),
            TargetSelector::Directory(PathBuf::from("/nowhere")),
        ] {
            let err = remove_target(&path, &selector).unwrap_err();
            assert!(matches!(err, Error::TargetNotFound(_)));
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }
}

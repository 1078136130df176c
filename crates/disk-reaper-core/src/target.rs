use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// One watched directory with its retention rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchTarget {
    #[serde(default)]
    pub volume_hint: Option<PathBuf>,
    pub directory: PathBuf,
    #[serde(default)]
    pub space_quota_gb: Option<f64>,
    #[serde(default)]
    pub age_threshold_days: Option<u64>,
}

impl WatchTarget {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            volume_hint: None,
            directory: directory.into(),
            space_quota_gb: None,
            age_threshold_days: None,
        }
    }

    pub fn with_volume(mut self, volume: impl Into<PathBuf>) -> Self {
        self.volume_hint = Some(volume.into());
        self
    }

    pub fn with_space_quota_gb(mut self, gb: f64) -> Self {
        self.space_quota_gb = Some(gb);
        self
    }

    pub fn with_age_threshold_days(mut self, days: u64) -> Self {
        self.age_threshold_days = Some(days);
        self
    }

    /// A target with neither rule set does nothing.
    pub fn validate(&self) -> Result<(), Error> {
        if self.space_quota_gb.is_none() && self.age_threshold_days.is_none() {
            return Err(Error::ConfigInvalid(format!(
                "target {} has neither a space quota nor an age threshold",
                self.directory.display()
            )));
        }
        if let Some(gb) = self.space_quota_gb {
            if !gb.is_finite() || gb < 0.0 {
                return Err(Error::ConfigInvalid(format!(
                    "target {} has an invalid space quota: {}",
                    self.directory.display(),
                    gb
                )));
            }
        }
        Ok(())
    }

    /// Path used to resolve the hosting volume.
    pub fn volume_path(&self) -> &Path {
        self.volume_hint.as_deref().unwrap_or(&self.directory)
    }

    pub fn space_quota_bytes(&self) -> Option<u64> {
        self.space_quota_gb.map(|gb| (gb * BYTES_PER_GB) as u64)
    }

    /// One-line summary in the `HDD: .. | Directory: ..` form.
    pub fn describe(&self) -> String {
        let hdd = self
            .volume_hint
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let mut text = format!("HDD: {} | Directory: {}", hdd, self.directory.display());
        if let Some(gb) = self.space_quota_gb {
            text.push_str(&format!(" | Space: {} GB", gb));
        }
        if let Some(days) = self.age_threshold_days {
            text.push_str(&format!(" | Period: {} Days", days));
        }
        text
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Supplies the target list at the start of every cycle.
pub trait TargetSource: Send + Sync {
    fn load_targets(&self) -> Result<Vec<WatchTarget>, Error>;
}

impl TargetSource for Vec<WatchTarget> {
    fn load_targets(&self) -> Result<Vec<WatchTarget>, Error> {
        Ok(self.clone())
    }
}

/// A target list that can be replaced from outside the sweep loop.
#[derive(Debug, Clone, Default)]
pub struct SharedTargets {
    inner: Arc<RwLock<Vec<WatchTarget>>>,
}

impl SharedTargets {
    pub fn new(targets: Vec<WatchTarget>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(targets)),
        }
    }

    pub fn replace(&self, targets: Vec<WatchTarget>) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = targets;
    }
}

impl TargetSource for SharedTargets {
    fn load_targets(&self) -> Result<Vec<WatchTarget>, Error> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }
}

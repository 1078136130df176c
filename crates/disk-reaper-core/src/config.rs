use crate::error::Error;
use crate::target::{TargetSource, WatchTarget};
use crate::target_list::CsvTargetList;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_cycle_interval_minutes")]
    pub cycle_interval_minutes: u64,
    #[serde(default = "default_slow_mode")]
    pub slow_mode: bool,
    #[serde(default = "default_worker_count")]
    pub worker_count: i64,
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,
    /// CSV target list, re-read at the start of every cycle.
    #[serde(default)]
    pub target_list: Option<PathBuf>,
    #[serde(default)]
    pub targets: Vec<WatchTarget>,
}

fn default_cycle_interval_minutes() -> u64 {
    1
}

fn default_slow_mode() -> bool {
    true
}

fn default_worker_count() -> i64 {
    crate::context::DEFAULT_WORKER_COUNT as i64
}

fn default_event_queue_capacity() -> usize {
    1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cycle_interval_minutes: default_cycle_interval_minutes(),
            slow_mode: default_slow_mode(),
            worker_count: default_worker_count(),
            event_queue_capacity: default_event_queue_capacity(),
            target_list: None,
            targets: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Inline targets followed by the CSV list, if one is configured.
    pub fn target_source(&self) -> ConfiguredTargets {
        ConfiguredTargets {
            inline: self.targets.clone(),
            csv: self.target_list.as_ref().map(CsvTargetList::new),
        }
    }
}

/// Reads `Config.*` from the working directory, then `REAPER_*` variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    build(ConfigFile::with_name("Config").required(false))
}

/// Same as [`load_configuration`] with an explicit file.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    build(ConfigFile::from(path).required(true))
}

fn build<S>(file: S) -> Result<AppConfig, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix("REAPER").try_parsing(true))
        .build()?
        .try_deserialize::<AppConfig>()
}

#[derive(Debug, Clone)]
pub struct ConfiguredTargets {
    inline: Vec<WatchTarget>,
    csv: Option<CsvTargetList>,
}

impl TargetSource for ConfiguredTargets {
    fn load_targets(&self) -> Result<Vec<WatchTarget>, Error> {
        let mut targets = self.inline.clone();
        if let Some(csv) = &self.csv {
            match csv.load_targets() {
                Ok(listed) => targets.extend(listed),
                Err(e) => warn!(
                    "Could not read target list {}, using inline targets only: {}",
                    csv.path().display(),
                    e
                ),
            }
        }
        Ok(targets)
    }
}

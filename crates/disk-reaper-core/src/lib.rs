pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod pruner;
pub mod reaper;
pub mod scanner;
pub mod scheduler;
pub mod target;
pub mod target_list;
pub mod tracker;
pub mod volume;

pub use config::AppConfig;
pub use context::SweepContext;
pub use error::Error;
pub use events::{EventKind, EventSink, ReaperEvent};
pub use pruner::EmptyDirPruner;
pub use reaper::{AgeReaper, SpaceReaper};
pub use scanner::FileEntry;
pub use scheduler::{PolicyScheduler, SchedulerState, SweepReport};
pub use target::{SharedTargets, TargetSource, WatchTarget};
pub use volume::{SystemVolumes, VolumeInspector, VolumeUsage};

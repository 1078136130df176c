use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "disk-reaper")]
#[command(about = "Reclaims disk space by file age and free-space targets", long_about = None)]
pub struct Cli {
    /// Configuration file to use instead of ./Config.*
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start monitoring the configured targets
    Run(RunArgs),
    /// List the configured targets
    Targets,
    /// Append a target to the CSV target list
    AddTarget(AddTargetArgs),
    /// Remove targets from the CSV target list
    RemoveTarget(RemoveTargetArgs),
    /// Show total and free space of volumes
    Volumes {
        /// Paths to inspect; defaults to every target's volume
        paths: Vec<PathBuf>,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Run a single sweep and exit
    #[arg(long)]
    pub once: bool,
    /// Disable the delay after each deletion
    #[arg(long)]
    pub fast: bool,
    /// Empty-directory prune workers
    #[arg(long)]
    pub workers: Option<i64>,
    /// Minutes between sweeps
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Debug, Args)]
pub struct AddTargetArgs {
    /// Directory (or single file) to clean
    #[arg(long)]
    pub directory: PathBuf,
    /// Volume the free-space target applies to
    #[arg(long)]
    pub volume: Option<PathBuf>,
    /// Free space to keep on the volume, in GB
    #[arg(long)]
    pub space_gb: Option<f64>,
    /// Delete files older than this many days
    #[arg(long)]
    pub period_days: Option<u64>,
    /// Target list to write; defaults to the configured one
    #[arg(long)]
    pub list: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RemoveTargetArgs {
    /// Position in the target list, as shown by `targets`
    #[arg(required_unless_present = "directory", conflicts_with = "directory")]
    pub position: Option<usize>,
    /// Remove every entry for this directory
    #[arg(long)]
    pub directory: Option<PathBuf>,
    /// Target list to edit; defaults to the configured one
    #[arg(long)]
    pub list: Option<PathBuf>,
}

mod commands;
mod logging;
mod reporter;
mod shutdown;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{AddTargetArgs, Cli, Commands, RemoveTargetArgs, RunArgs};
use disk_reaper_core::config::{load_configuration, load_configuration_from};
use disk_reaper_core::target::BYTES_PER_GB;
use disk_reaper_core::target_list::{append_target, load_target_list, remove_target, TargetSelector};
use disk_reaper_core::{
    AppConfig, EventSink, PolicyScheduler, SweepContext, SystemVolumes, TargetSource,
    VolumeInspector, WatchTarget,
};
use dotenv::dotenv;
use reporter::EventReporter;
use tracing::{error, info};

const DEFAULT_TARGET_LIST: &str = "targetlist.csv";

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => load_configuration_from(path),
        None => load_configuration(),
    }
    .context("Error loading configuration")?;

    match args.command {
        Some(Commands::Run(run)) => run_scheduler(&config, &run)?,
        Some(Commands::Targets) => list_targets(&config)?,
        Some(Commands::AddTarget(add)) => add_target(&config, add)?,
        Some(Commands::RemoveTarget(remove)) => remove_targets(&config, remove)?,
        Some(Commands::Volumes { paths }) => show_volumes(&config, paths)?,
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_scheduler(config: &AppConfig, run: &RunArgs) -> anyhow::Result<()> {
    let (sink, rx) = EventSink::channel(config.event_queue_capacity);
    let ctx = Arc::new(SweepContext::new(sink));
    ctx.set_slow_mode(config.slow_mode && !run.fast);
    ctx.set_worker_count(run.workers.unwrap_or(config.worker_count));
    ctx.set_cycle_interval_minutes(run.interval.unwrap_or(config.cycle_interval_minutes));

    let reporter = EventReporter::new().spawn(rx);
    let mut scheduler = PolicyScheduler::new(ctx, Arc::new(config.target_source()));

    let outcome = if run.once {
        let report = scheduler.run_sweep().context("Error running sweep")?;
        info!("Single sweep finished: {:?}", report);
        println!(
            "{} target(s) checked, {} skipped, {} aged file(s) deleted, {} freed, {} empty dir(s) pruned",
            format!("{}", report.targets_checked).green(),
            format!("{}", report.targets_skipped).yellow(),
            format!("{}", report.aged_files_deleted).red(),
            format!("{:.2} GB", report.bytes_freed as f64 / BYTES_PER_GB).red(),
            format!("{}", report.dirs_pruned).cyan(),
        );
        Ok(())
    } else {
        scheduler.start().context("Error starting scheduler")?;
        println!("START MONITORING (press Enter or Ctrl-C to stop)");

        let waited = shutdown::wait_for_shutdown_signal();
        scheduler.stop();
        waited
    };

    // Dropping the scheduler releases the last event sender.
    drop(scheduler);
    if reporter.join().is_err() {
        error!("Event reporter panicked");
    }
    outcome
}

fn list_targets(config: &AppConfig) -> anyhow::Result<()> {
    if !config.targets.is_empty() {
        println!("{}", "Configured inline".bold());
        print_targets(&config.targets);
    }

    let list = target_list_path(config, None);
    let listed = load_target_list(&list)
        .with_context(|| format!("Error loading target list {}", list.display()))?;
    println!("{}", format!("Target list {}", list.display()).bold());
    if listed.is_empty() {
        println!("  No targets listed");
    }
    print_targets(&listed);
    Ok(())
}

fn print_targets(targets: &[WatchTarget]) {
    for (index, target) in targets.iter().enumerate() {
        match target.validate() {
            Ok(()) => println!("{:>3}. {}", index + 1, target),
            Err(err) => println!("{:>3}. {} {}", index + 1, target, format!("({})", err).red()),
        }
    }
}

fn target_list_path(config: &AppConfig, explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| config.target_list.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_LIST))
}

fn add_target(config: &AppConfig, args: AddTargetArgs) -> anyhow::Result<()> {
    let list = target_list_path(config, args.list);

    let target = WatchTarget {
        volume_hint: args.volume,
        directory: args.directory,
        space_quota_gb: args.space_gb,
        age_threshold_days: args.period_days,
    };
    let description = target.describe();
    append_target(&list, target)
        .with_context(|| format!("Error adding target to {}", list.display()))?;

    println!("Added {} to {}", description.green(), list.display());
    Ok(())
}

fn remove_targets(config: &AppConfig, args: RemoveTargetArgs) -> anyhow::Result<()> {
    let list = target_list_path(config, args.list);
    let selector = match (args.position, args.directory) {
        (Some(position), _) => TargetSelector::Position(position),
        (None, Some(directory)) => TargetSelector::Directory(directory),
        (None, None) => anyhow::bail!("Give a position or --directory"),
    };

    let removed = remove_target(&list, &selector)
        .with_context(|| format!("Error removing {} from {}", selector, list.display()))?;
    for target in &removed {
        println!("Removed {} from {}", target.describe().yellow(), list.display());
    }
    Ok(())
}

fn show_volumes(config: &AppConfig, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let paths = if paths.is_empty() {
        let mut volumes: Vec<PathBuf> = config
            .target_source()
            .load_targets()
            .context("Error loading targets")?
            .iter()
            .map(|t| t.volume_path().to_path_buf())
            .collect();
        volumes.sort();
        volumes.dedup();
        volumes
    } else {
        paths
    };

    for path in &paths {
        print_volume(path);
    }
    Ok(())
}

fn print_volume(path: &Path) {
    match SystemVolumes.usage(path) {
        Ok(usage) => println!(
            "{}: {} free of {}",
            path.display(),
            format!("{:.2} GB", usage.free as f64 / BYTES_PER_GB).green(),
            format!("{:.2} GB", usage.total as f64 / BYTES_PER_GB),
        ),
        Err(err) => println!("{}: {}", path.display(), format!("{}", err).red()),
    }
}

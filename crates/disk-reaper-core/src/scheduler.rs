use crate::context::SweepContext;
use crate::error::Error;
use crate::pruner::EmptyDirPruner;
use crate::reaper::{AgeReaper, SpaceReaper};
use crate::target::{TargetSource, WatchTarget, BYTES_PER_GB};
use crate::volume::{SystemVolumes, VolumeInspector};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    /// Counting down to the next sweep.
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub targets_checked: usize,
    pub targets_skipped: usize,
    pub aged_files_deleted: usize,
    pub bytes_freed: u64,
    pub dirs_pruned: usize,
}

/// Everything the sweep thread needs, cheap to clone into it.
#[derive(Clone)]
struct Sweeper {
    ctx: Arc<SweepContext>,
    targets: Arc<dyn TargetSource>,
    volumes: Arc<dyn VolumeInspector>,
    state: Arc<Mutex<SchedulerState>>,
    invalid_reported: Arc<Mutex<HashSet<PathBuf>>>,
    tick: Duration,
}

impl Sweeper {
    fn set_state(&self, state: SchedulerState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    fn run(&self) {
        let events = self.ctx.events();
        if self.ctx.slow_mode() {
            events.log("Slow Mode: On");
        } else {
            events.log("Slow Mode: Off");
        }

        while !self.ctx.is_cancelled() {
            self.set_state(SchedulerState::Running);
            let report = self.sweep();
            info!("Sweep finished: {:?}", report);

            if self.ctx.is_cancelled() {
                break;
            }
            self.set_state(SchedulerState::Paused);
            self.countdown();
        }
    }

    fn sweep(&self) -> SweepReport {
        let events = self.ctx.events();
        let mut report = SweepReport::default();

        let targets = match self.targets.load_targets() {
            Ok(targets) => targets,
            Err(e) => {
                error!("Could not load targets: {}", e);
                events.log(format!("Error: {}", e));
                return report;
            }
        };

        for target in &targets {
            if self.ctx.is_cancelled() {
                events.status("Stopped");
                break;
            }
            events.status(format!("Checking target: {}", target.directory.display()));

            if let Err(e) = target.validate() {
                report.targets_skipped += 1;
                self.report_invalid_once(target, &e);
                continue;
            }
            report.targets_checked += 1;

            if let Some(days) = target.age_threshold_days {
                report.aged_files_deleted +=
                    AgeReaper::new(&self.ctx).reap(&target.directory, days, SystemTime::now());
                if target.directory.is_dir() {
                    report.dirs_pruned += EmptyDirPruner::new(&self.ctx).prune(&target.directory);
                }
            }

            if let Some(quota) = target.space_quota_bytes() {
                report.bytes_freed += self.enforce_quota(target, quota);
            }
        }

        report
    }

    fn report_invalid_once(&self, target: &WatchTarget, err: &Error) {
        let mut reported = self
            .invalid_reported
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if reported.insert(target.directory.clone()) {
            warn!("{}", err);
            self.ctx.events().log(format!("Skipping target: {}", err));
        }
    }

    fn enforce_quota(&self, target: &WatchTarget, quota: u64) -> u64 {
        let events = self.ctx.events();
        if self.ctx.is_cancelled() {
            events.status("Stopped");
            return 0;
        }

        let volume = target.volume_path();
        let free = match self.volumes.free_bytes(volume) {
            Ok(free) => free,
            Err(e) => {
                warn!("Skipping quota check for {}: {}", target.directory.display(), e);
                events.status(format!("Error reading volume: {}", e));
                events.log(format!("Error: {}", e));
                return 0;
            }
        };

        let free_gb = free as f64 / BYTES_PER_GB;
        let quota_gb = quota as f64 / BYTES_PER_GB;
        events.log(format!("Target path: {}", target.directory.display()));
        events.log(format!("{} Drive's target size: {:.2} GB", volume.display(), quota_gb));
        events.log(format!("{} Drive's remaining size: {:.2} GB", volume.display(), free_gb));

        if free >= quota {
            return 0;
        }
        events.log(format!("Total Deleting files size: {:.2} GB.", quota_gb - free_gb));

        match SpaceReaper::new(&self.ctx, &*self.volumes).reap(volume, quota, &target.directory) {
            Ok(freed) => freed,
            Err(e) => {
                warn!("Space pass over {} failed: {}", target.directory.display(), e);
                events.log(format!("Error: {}", e));
                0
            }
        }
    }

    fn countdown(&self) {
        let events = self.ctx.events();
        let minutes = self.ctx.cycle_interval_minutes();
        events.log(format!("Waiting for next cycle: {} min(s)", minutes));

        let mut remaining = minutes.saturating_mul(60);
        while remaining > 0 {
            if self.ctx.is_cancelled() {
                return;
            }
            let (m, s) = (remaining / 60, remaining % 60);
            events.countdown(format!("Next monitoring will start in...{}min {}sec", m, s));
            events.status(format!("Next Monitoring will start in {}min {}sec", m, s));
            thread::sleep(self.tick);
            remaining -= 1;
        }

        if !self.ctx.is_cancelled() {
            events.status("Monitoring");
            events.log("Next monitoring cycle starting.");
        }
    }
}

/// Drives periodic sweeps over the watch targets on a background thread.
pub struct PolicyScheduler {
    sweeper: Sweeper,
    handle: Option<JoinHandle<()>>,
}

impl PolicyScheduler {
    pub fn new(ctx: Arc<SweepContext>, targets: Arc<dyn TargetSource>) -> Self {
        Self {
            sweeper: Sweeper {
                ctx,
                targets,
                volumes: Arc::new(SystemVolumes),
                state: Arc::new(Mutex::new(SchedulerState::Idle)),
                invalid_reported: Arc::new(Mutex::new(HashSet::new())),
                tick: Duration::from_secs(1),
            },
            handle: None,
        }
    }

    pub fn with_volume_inspector(mut self, volumes: Arc<dyn VolumeInspector>) -> Self {
        self.sweeper.volumes = volumes;
        self
    }

    /// Length of one countdown tick. One second unless overridden.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.sweeper.tick = tick;
        self
    }

    pub fn context(&self) -> &Arc<SweepContext> {
        &self.sweeper.ctx
    }

    pub fn state(&self) -> SchedulerState {
        *self.sweeper.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn start(&mut self) -> Result<(), Error> {
        if self.handle.is_some() {
            return Err(Error::AlreadyRunning);
        }

        self.sweeper.ctx.reset_cancel();
        self.sweeper.set_state(SchedulerState::Running);

        let sweeper = self.sweeper.clone();
        let handle = thread::Builder::new()
            .name("reaper-sweep".to_string())
            .spawn(move || sweeper.run())
            .map_err(|e| {
                self.sweeper.set_state(SchedulerState::Stopped);
                Error::Thread(e)
            })?;
        self.handle = Some(handle);
        info!("Scheduler started");
        Ok(())
    }

    /// Cancel the running sweep and wait for the thread to finish its
    /// current deletion.
    pub fn stop(&mut self) {
        self.sweeper.ctx.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Sweep thread panicked");
            }
            self.sweeper.ctx.events().log("Stopped monitoring for all conditions.");
        }
        self.sweeper.set_state(SchedulerState::Stopped);
        self.sweeper.ctx.events().status("Stopped");
    }

    /// Run one sweep on the calling thread. Refused while the background
    /// thread is active.
    pub fn run_sweep(&self) -> Result<SweepReport, Error> {
        if self.handle.is_some() {
            return Err(Error::AlreadyRunning);
        }
        self.sweeper.ctx.reset_cancel();
        Ok(self.sweeper.sweep())
    }

    pub fn set_slow_mode(&self, on: bool) {
        self.sweeper.ctx.set_slow_mode(on);
    }

    pub fn set_worker_count(&self, workers: i64) {
        self.sweeper.ctx.set_worker_count(workers);
    }

    pub fn set_cycle_interval_minutes(&self, minutes: u64) {
        self.sweeper.ctx.set_cycle_interval_minutes(minutes);
    }
}

impl Drop for PolicyScheduler {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}

use crate::events::EventSink;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const SLOW_MODE_DELAY: Duration = Duration::from_millis(20);

/// Worker counts of zero or below fall back to the default.
pub fn normalize_worker_count(requested: i64) -> usize {
    if requested > 0 {
        requested as usize
    } else {
        DEFAULT_WORKER_COUNT
    }
}

/// Control state shared between the controlling surface and a running sweep.
///
/// Every field is read at the point of use, so changes reach an in-flight
/// sweep at its next unit of work.
#[derive(Debug)]
pub struct SweepContext {
    cancelled: AtomicBool,
    slow_mode: AtomicBool,
    worker_count: AtomicUsize,
    cycle_interval_minutes: AtomicU64,
    events: EventSink,
}

impl SweepContext {
    pub fn new(events: EventSink) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            slow_mode: AtomicBool::new(true),
            worker_count: AtomicUsize::new(DEFAULT_WORKER_COUNT),
            cycle_interval_minutes: AtomicU64::new(1),
            events,
        }
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn slow_mode(&self) -> bool {
        self.slow_mode.load(Ordering::Relaxed)
    }

    pub fn set_slow_mode(&self, on: bool) {
        self.slow_mode.store(on, Ordering::Relaxed);
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count.load(Ordering::Relaxed)
    }

    pub fn set_worker_count(&self, requested: i64) {
        self.worker_count
            .store(normalize_worker_count(requested), Ordering::Relaxed);
    }

    pub fn cycle_interval_minutes(&self) -> u64 {
        self.cycle_interval_minutes.load(Ordering::Relaxed)
    }

    pub fn set_cycle_interval_minutes(&self, minutes: u64) {
        self.cycle_interval_minutes.store(minutes, Ordering::Relaxed);
    }

    /// Pause after a deletion when slow mode is on.
    pub fn throttle(&self) {
        if self.slow_mode() {
            thread::sleep(SLOW_MODE_DELAY);
        }
    }
}

impl Default for SweepContext {
    fn default() -> Self {
        Self::new(EventSink::silent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_worker_count_defaults_when_non_positive() {
        let ctx = SweepContext::default();
        ctx.set_worker_count(0);
        assert_eq!(ctx.worker_count(), DEFAULT_WORKER_COUNT);
        ctx.set_worker_count(-3);
        assert_eq!(ctx.worker_count(), DEFAULT_WORKER_COUNT);
        ctx.set_worker_count(8);
        assert_eq!(ctx.worker_count(), 8);
    }

    #[test]
    fn test_cancel_and_reset() {
        let ctx = SweepContext::default();
        assert!(!ctx.is_cancelled());
        ctx.cancel();
        assert!(ctx.is_cancelled());
        ctx.reset_cancel();
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn test_throttle_only_in_slow_mode() {
        let ctx = SweepContext::default();
        ctx.set_slow_mode(false);
        let start = Instant::now();
        ctx.throttle();
        assert!(start.elapsed() < SLOW_MODE_DELAY);

        ctx.set_slow_mode(true);
        let start = Instant::now();
        ctx.throttle();
        assert!(start.elapsed() >= SLOW_MODE_DELAY);
    }
}

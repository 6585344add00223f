//! Rate-limited, monotonic progress reporting

use std::time::{Duration, Instant};

/// Integer percentage of `done` over `total`; an empty workload is complete.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) as u128 * 100) / total as u128) as u8
}

/// Throttles progress events and keeps reported percentages non-decreasing
#[derive(Debug, Clone)]
pub struct ProgressGate {
    interval: Duration,
    last_emit: Instant,
    last_progress: u8,
}

impl ProgressGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: Instant::now(),
            last_progress: 0,
        }
    }

    /// Progress to report now, or `None` if the last event was too recent
    pub fn poll(&mut self, progress: u8) -> Option<u8> {
        if self.last_emit.elapsed() < self.interval {
            return None;
        }
        Some(self.force(progress))
    }

    /// Report regardless of timing; still clamped to stay monotonic
    pub fn force(&mut self, progress: u8) -> u8 {
        let progress = progress.min(100).max(self.last_progress);
        self.last_emit = Instant::now();
        self.last_progress = progress;
        progress
    }

    pub fn last(&self) -> u8 {
        self.last_progress
    }
}

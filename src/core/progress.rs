use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for one polling session.
#[derive(Debug)]
pub struct PollTracker {
    pub polls_issued: AtomicUsize,
    pub retries: AtomicUsize,
    pub start_time: Instant,
}

impl Default for PollTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PollTracker {
    pub fn new() -> Self {
        Self {
            polls_issued: AtomicUsize::new(0),
            retries: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Counts one progress query; attempts past the first are retries.
    pub fn record_poll(&self, attempt: usize) {
        self.polls_issued.fetch_add(1, Ordering::Relaxed);
        if attempt > 0 {
            self.retries.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> PollSnapshot {
        PollSnapshot {
            polls_issued: self.polls_issued.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSnapshot {
    pub polls_issued: usize,
    pub retries: usize,
    pub elapsed: Duration,
}

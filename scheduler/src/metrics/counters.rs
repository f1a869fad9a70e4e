use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub ticks: Arc<AtomicU64>,
    pub ticks_closed: Arc<AtomicU64>,

    pub task_runs: Arc<AtomicU64>,
    pub task_failures: Arc<AtomicU64>,
    pub messages_sent: Arc<AtomicU64>,

    // failure kinds
    pub task_timeouts: Arc<AtomicU64>,
    pub task_panics: Arc<AtomicU64>,
    pub notify_failures: Arc<AtomicU64>,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            ticks_closed: self.ticks_closed.load(Ordering::Relaxed),
            task_runs: self.task_runs.load(Ordering::Relaxed),
            task_failures: self.task_failures.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            task_timeouts: self.task_timeouts.load(Ordering::Relaxed),
            task_panics: self.task_panics.load(Ordering::Relaxed),
            notify_failures: self.notify_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub ticks: u64,
    pub ticks_closed: u64,
    pub task_runs: u64,
    pub task_failures: u64,
    pub messages_sent: u64,
    pub task_timeouts: u64,
    pub task_panics: u64,
    pub notify_failures: u64,
}

impl fmt::Display for CountersSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "runs={} failures={} (timeouts={} panics={}) messages={} notify_failures={}",
            self.task_runs,
            self.task_failures,
            self.task_timeouts,
            self.task_panics,
            self.messages_sent,
            self.notify_failures
        )
    }
}

//! Shared types used by the scheduler.

use std::time::Duration;

use thiserror::Error;

/// Timing knobs for the tick loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Sleep between ticks while the market is open.
    pub tick: Duration,

    /// Sleep between ticks while the market is closed.
    pub closed_tick: Duration,

    /// Upper bound on a single task run.
    pub task_timeout: Duration,

    /// Sleep after a failed task before the loop continues.
    pub error_backoff: Duration,

    /// Runs longer than this emit a `performance` warning.
    pub slow_task: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            closed_tick: Duration::from_secs(5),
            task_timeout: Duration::from_secs(60),
            error_backoff: Duration::from_secs(5),
            slow_task: Duration::from_secs(10),
        }
    }
}

/// Why a task run did not complete normally.
#[derive(Debug, Error)]
pub enum TaskFailure {
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("panicked: {0}")]
    Panicked(String),

    #[error("{0:#}")]
    Failed(anyhow::Error),
}

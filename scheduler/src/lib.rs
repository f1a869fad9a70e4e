//! Interval scheduler gated on market hours.
//!
//! One loop ticks at a fixed cadence and runs due tasks sequentially in
//! registration order. A task failure never stops the loop: it is logged,
//! reported through the [`Notifier`], and followed by a backoff sleep.

pub mod engine;
pub mod metrics;
pub mod state;
pub mod task;
pub mod types;

pub use engine::{Scheduler, TickOutcome};
pub use metrics::counters::{Counters, CountersSnapshot};
pub use state::Schedule;
pub use task::{MarketGate, Notifier, Task};
pub use types::{SchedulerConfig, TaskFailure};

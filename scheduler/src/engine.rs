//! The main scheduler engine.
//!
//! For each tick it:
//!   1. Asks the market gate whether anything may run.
//!   2. Walks the registered tasks in priority order.
//!   3. Runs each due task to completion, bounded by a timeout and isolated
//!      from panics.
//!   4. Reports failures to the notifier and backs off before moving on.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::{Instrument, debug, error, info, instrument};

use common::logger::{TraceId, task_span, warn_if_slow};
use common::time::to_ms;

use crate::metrics::counters::Counters;
use crate::state::Schedule;
use crate::task::{MarketGate, Notifier, Task};
use crate::types::{SchedulerConfig, TaskFailure};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Market closed; every task stayed idle.
    Closed,
    /// Market open but nothing was due.
    Idle,
    Ran { succeeded: usize, failed: usize },
}

struct ScheduledTask {
    task: Arc<dyn Task>,
    schedule: Schedule,
}

pub struct Scheduler {
    cfg: SchedulerConfig,
    gate: Arc<dyn MarketGate>,
    notifier: Arc<dyn Notifier>,
    tasks: Vec<ScheduledTask>,
    counters: Counters,

    /// Last observed gate state, for open/close transition logs.
    market_open: Option<bool>,
}

impl Scheduler {
    pub fn new(
        cfg: SchedulerConfig,
        gate: Arc<dyn MarketGate>,
        notifier: Arc<dyn Notifier>,
        counters: Counters,
    ) -> Self {
        Self {
            cfg,
            gate,
            notifier,
            tasks: Vec::new(),
            counters,
            market_open: None,
        }
    }

    /// Registration order is priority order within a tick.
    pub fn register(&mut self, task: Arc<dyn Task>) {
        info!(
            task = task.name(),
            interval_secs = task.interval().as_secs(),
            priority = self.tasks.len(),
            "task registered"
        );

        let schedule = Schedule::new(task.interval());
        self.tasks.push(ScheduledTask { task, schedule });
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|t| t.task.name()).collect()
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// Runs every due task once, sequentially.
    #[instrument(skip_all, target = "scheduler", level = "debug", fields(now = %now))]
    pub async fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        Counters::bump(&self.counters.ticks);

        let open = self.gate.is_open(now);
        self.log_transition(open);
        if !open {
            Counters::bump(&self.counters.ticks_closed);
            return TickOutcome::Closed;
        }

        let now_ms = to_ms(now);
        let mut succeeded = 0;
        let mut failed = 0;

        for idx in 0..self.tasks.len() {
            if !self.tasks[idx].schedule.is_due(now_ms) {
                continue;
            }
            self.tasks[idx].schedule.mark_run(now_ms);

            let task = Arc::clone(&self.tasks[idx].task);
            match self.run_task(task.as_ref(), now).await {
                Ok(sent) => {
                    succeeded += 1;
                    self.counters
                        .messages_sent
                        .fetch_add(sent as u64, Ordering::Relaxed);
                }
                Err(failure) => {
                    failed += 1;
                    self.report_failure(task.name(), &failure).await;
                }
            }
        }

        if succeeded + failed == 0 {
            TickOutcome::Idle
        } else {
            debug!(succeeded, failed, "tick finished");
            TickOutcome::Ran { succeeded, failed }
        }
    }

    /// Ticks until `shutdown` resolves. A tick in progress always completes.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(tasks = ?self.task_names(), "scheduler loop started");

        loop {
            let delay = match self.tick(Utc::now()).await {
                TickOutcome::Closed => self.cfg.closed_tick,
                _ => self.cfg.tick,
            };

            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested; scheduler loop stopped");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn run_task(&self, task: &dyn Task, now: DateTime<Utc>) -> Result<usize, TaskFailure> {
        let name = task.name();
        let span = task_span(name, &TraceId::default());
        Counters::bump(&self.counters.task_runs);

        let guarded = AssertUnwindSafe(task.run(now)).catch_unwind();
        let bounded = tokio::time::timeout(
            self.cfg.task_timeout,
            warn_if_slow(name, self.cfg.slow_task, guarded),
        );

        let result = match bounded.instrument(span.clone()).await {
            Err(_) => Err(TaskFailure::TimedOut(self.cfg.task_timeout)),
            Ok(Err(payload)) => Err(TaskFailure::Panicked(panic_message(payload.as_ref()))),
            Ok(Ok(Err(e))) => Err(TaskFailure::Failed(e)),
            Ok(Ok(Ok(sent))) => Ok(sent),
        };

        if let Ok(sent) = &result {
            span.record("messages", *sent as u64);
        }
        result
    }

    /// Log, notify, back off. Notification errors are logged and dropped.
    async fn report_failure(&self, task: &'static str, failure: &TaskFailure) {
        Counters::bump(&self.counters.task_failures);
        match failure {
            TaskFailure::TimedOut(_) => Counters::bump(&self.counters.task_timeouts),
            TaskFailure::Panicked(_) => Counters::bump(&self.counters.task_panics),
            TaskFailure::Failed(_) => {}
        }

        error!(task = %task, error = %failure, "task run failed");

        let text = format!("❌ *ERROR*\n`{task}: {failure}`");
        if let Err(e) = self.notifier.send(&text).await {
            Counters::bump(&self.counters.notify_failures);
            error!(task = %task, error = ?e, "failed to report task failure");
        }

        tokio::time::sleep(self.cfg.error_backoff).await;
    }

    fn log_transition(&mut self, open: bool) {
        if self.market_open == Some(open) {
            return;
        }
        self.market_open = Some(open);

        if open {
            info!("market open; tasks enabled");
        } else {
            info!(
                closed_tick_secs = self.cfg.closed_tick.as_secs(),
                "market closed; tasks idle"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

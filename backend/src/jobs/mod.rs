//! Alert jobs.
//!
//! Each job is a fetch / evaluate / format triple. One generic driver,
//! [`JobTask`], turns any job into a scheduler [`Task`]:
//!
//!   fetch → evaluate (only step that touches alert state) → format → send
//!
//! Fetch errors are transient: the run is logged and skipped. Delivery
//! errors are logged and dropped. Neither surfaces as a task failure.

pub mod gaps;
pub mod options;
pub mod scan;
pub mod status;
pub mod top;
pub mod watchlist;

pub use gaps::GapsJob;
pub use options::OptionsJob;
pub use scan::ScanJob;
pub use status::StatusJob;
pub use top::TopJob;
pub use watchlist::WatchlistJob;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, error, info, warn};

use common::logger::child_span;
use market::{AlertState, MarketCalendar, MarketDataSource};
use scheduler::{Notifier, Task};

/// What every job may read or mutate.
pub struct JobContext {
    pub source: Arc<dyn MarketDataSource>,

    /// Dedup and watchlist state. Jobs run one at a time, so the lock is
    /// never contended; it exists because evaluators hold it across awaits.
    pub state: Arc<Mutex<AlertState>>,

    pub calendar: MarketCalendar,
}

impl JobContext {
    pub fn new(source: Arc<dyn MarketDataSource>, calendar: MarketCalendar) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(AlertState::new())),
            calendar,
        }
    }
}

#[async_trait]
pub trait AlertJob: Send + Sync + 'static {
    type Input: Send;
    type Output: Send;

    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    async fn fetch(&self, ctx: &JobContext, now: DateTime<Utc>) -> anyhow::Result<Self::Input>;

    async fn evaluate(
        &self,
        ctx: &JobContext,
        input: Self::Input,
        now: DateTime<Utc>,
    ) -> Self::Output;

    /// Rendered messages; empty when there is nothing to say.
    fn format(&self, output: &Self::Output, now: DateTime<Utc>) -> Vec<String>;
}

/// Runs an [`AlertJob`] as a scheduler task.
pub struct JobTask<J> {
    job: J,
    ctx: Arc<JobContext>,
    notifier: Arc<dyn Notifier>,
}

impl<J: AlertJob> JobTask<J> {
    pub fn new(job: J, ctx: Arc<JobContext>, notifier: Arc<dyn Notifier>) -> Self {
        Self { job, ctx, notifier }
    }

    pub fn job(&self) -> &J {
        &self.job
    }
}

#[async_trait]
impl<J: AlertJob> Task for JobTask<J> {
    fn name(&self) -> &'static str {
        self.job.name()
    }

    fn interval(&self) -> Duration {
        self.job.interval()
    }

    async fn run(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        let name = self.job.name();

        let input = match self.job.fetch(&self.ctx, now).await {
            Ok(input) => input,
            Err(e) => {
                warn!(job = name, error = %format!("{e:#}"), "fetch failed; skipping run");
                return Ok(0);
            }
        };

        let output = self.job.evaluate(&self.ctx, input, now).await;
        let messages = self.job.format(&output, now);

        if messages.is_empty() {
            debug!(job = name, "nothing to report");
            return Ok(0);
        }

        let mut sent = 0;
        for text in &messages {
            match self.notifier.send(text).instrument(child_span("notify")).await {
                Ok(()) => sent += 1,
                Err(e) => error!(job = name, error = %format!("{e:#}"), "notification failed"),
            }
        }

        info!(job = name, messages = messages.len(), sent, "job finished");
        Ok(sent)
    }
}

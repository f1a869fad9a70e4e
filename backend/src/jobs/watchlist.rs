use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use common::time::to_ms;
use market::rules::large_sale::LargeSaleRule;
use market::{AlertEvent, MoverRecord};

use super::{AlertJob, JobContext};
use crate::format::render_events;

/// Follows watchlisted symbols and reports large volume jumps.
pub struct WatchlistJob {
    interval: Duration,
    ttl: Duration,
    rule: LargeSaleRule,
}

impl WatchlistJob {
    pub fn new(interval: Duration, ttl: Duration, min_delta: f64) -> Self {
        Self {
            interval,
            ttl,
            rule: LargeSaleRule::new(min_delta),
        }
    }
}

#[async_trait]
impl AlertJob for WatchlistJob {
    type Input = Vec<MoverRecord>;
    type Output = Vec<AlertEvent>;

    fn name(&self) -> &'static str {
        "watchlist"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    /// Evicts idle entries, then quotes what is left.
    async fn fetch(&self, ctx: &JobContext, now: DateTime<Utc>) -> anyhow::Result<Self::Input> {
        let symbols = {
            let mut state = ctx.state.lock().await;

            let evicted = state.evict_idle(to_ms(now), self.ttl.as_millis() as u64);
            if !evicted.is_empty() {
                info!(evicted = ?evicted, "idle watchlist entries evicted");
            }

            state.watchlist.symbols()
        };

        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        ctx.source.quotes(&symbols).await
    }

    async fn evaluate(
        &self,
        ctx: &JobContext,
        quotes: Self::Input,
        now: DateTime<Utc>,
    ) -> Self::Output {
        let mut state = ctx.state.lock().await;
        self.rule.observe(&mut state.watchlist, &quotes, to_ms(now))
    }

    fn format(&self, events: &Self::Output, _now: DateTime<Utc>) -> Vec<String> {
        render_events(events)
    }
}

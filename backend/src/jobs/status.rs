use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use scheduler::{Counters, CountersSnapshot};

use super::{AlertJob, JobContext};
use crate::format::format_clock;

/// Heartbeat with process and state figures.
pub struct StatusJob {
    interval: Duration,
    started_at: DateTime<Utc>,
    counters: Counters,
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub tz: Tz,
    pub market_open: bool,
    pub watchlist: usize,
    pub dedup_entries: usize,
    pub uptime: chrono::Duration,
    pub counters: CountersSnapshot,
}

impl StatusJob {
    pub fn new(interval: Duration, started_at: DateTime<Utc>, counters: Counters) -> Self {
        Self {
            interval,
            started_at,
            counters,
        }
    }
}

#[async_trait]
impl AlertJob for StatusJob {
    type Input = ();
    type Output = StatusReport;

    fn name(&self) -> &'static str {
        "status"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self, _ctx: &JobContext, _now: DateTime<Utc>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn evaluate(&self, ctx: &JobContext, _input: (), now: DateTime<Utc>) -> StatusReport {
        let state = ctx.state.lock().await;

        StatusReport {
            tz: ctx.calendar.timezone(),
            market_open: ctx.calendar.is_open(now),
            watchlist: state.watchlist.len(),
            dedup_entries: state.dedup.len(),
            uptime: now - self.started_at,
            counters: self.counters.snapshot(),
        }
    }

    fn format(&self, r: &StatusReport, now: DateTime<Utc>) -> Vec<String> {
        let hours = r.uptime.num_hours();
        let minutes = r.uptime.num_minutes() % 60;

        vec![format!(
            "💓 *Status*\nTime: {}\nMarket: {}\nWatchlist: {}\nDedup entries: {}\nUptime: {hours}h {minutes}m\nStats: {}",
            format_clock(now, r.tz),
            if r.market_open { "OPEN" } else { "CLOSED" },
            r.watchlist,
            r.dedup_entries,
            r.counters
        )]
    }
}

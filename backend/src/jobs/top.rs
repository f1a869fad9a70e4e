use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use market::MoverRecord;

use super::{AlertJob, JobContext};
use crate::format::render_top;

/// Periodic top-N gainers report. Stateless: no dedup.
///
/// Fetches the full movers page (ranked by the source) and reports the
/// first `top_n`.
pub struct TopJob {
    interval: Duration,
    fetch_limit: usize,
    top_n: usize,
}

impl TopJob {
    pub fn new(interval: Duration, fetch_limit: usize, top_n: usize) -> Self {
        Self {
            interval,
            fetch_limit: fetch_limit.max(top_n),
            top_n,
        }
    }
}

#[async_trait]
impl AlertJob for TopJob {
    type Input = Vec<MoverRecord>;
    type Output = Vec<MoverRecord>;

    fn name(&self) -> &'static str {
        "top"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self, ctx: &JobContext, _now: DateTime<Utc>) -> anyhow::Result<Self::Input> {
        ctx.source.movers(self.fetch_limit).await
    }

    async fn evaluate(
        &self,
        _ctx: &JobContext,
        movers: Self::Input,
        _now: DateTime<Utc>,
    ) -> Self::Output {
        movers
    }

    fn format(&self, movers: &Self::Output, _now: DateTime<Utc>) -> Vec<String> {
        render_top(movers, self.top_n).into_iter().collect()
    }
}

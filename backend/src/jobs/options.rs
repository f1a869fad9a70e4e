use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use market::rules::options::UnusualOptionsRule;
use market::{AlertEvent, OptionContract};

use super::{AlertJob, JobContext};
use crate::format::render_events;

pub struct OptionsJob {
    interval: Duration,
    rule: UnusualOptionsRule,
}

impl OptionsJob {
    pub fn new(interval: Duration, min_vol_oi_ratio: f64, min_volume: f64) -> Self {
        Self {
            interval,
            rule: UnusualOptionsRule::new(min_vol_oi_ratio, min_volume),
        }
    }
}

#[async_trait]
impl AlertJob for OptionsJob {
    type Input = Vec<OptionContract>;
    type Output = Vec<AlertEvent>;

    fn name(&self) -> &'static str {
        "options"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self, ctx: &JobContext, _now: DateTime<Utc>) -> anyhow::Result<Self::Input> {
        ctx.source.unusual_options().await
    }

    async fn evaluate(
        &self,
        ctx: &JobContext,
        contracts: Self::Input,
        _now: DateTime<Utc>,
    ) -> Self::Output {
        let mut state = ctx.state.lock().await;
        self.rule.evaluate(&contracts, &mut state.dedup)
    }

    fn format(&self, events: &Self::Output, _now: DateTime<Utc>) -> Vec<String> {
        render_events(events)
    }
}

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::time::to_ms;
use market::rules::{RuleSet, RuleThresholds};
use market::{AlertEvent, MoverRecord};

use super::{AlertJob, JobContext};
use crate::format::render_events;

/// Gap-up and extended-hours digest over the day-gainers screener.
pub struct GapsJob {
    interval: Duration,
    rules: RuleSet,
}

impl GapsJob {
    pub fn new(interval: Duration, thresholds: &RuleThresholds) -> Self {
        Self {
            interval,
            rules: RuleSet::digest(thresholds),
        }
    }
}

#[async_trait]
impl AlertJob for GapsJob {
    type Input = Vec<MoverRecord>;
    type Output = Vec<AlertEvent>;

    fn name(&self) -> &'static str {
        "gaps"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self, ctx: &JobContext, _now: DateTime<Utc>) -> anyhow::Result<Self::Input> {
        ctx.source.day_gainers().await
    }

    async fn evaluate(
        &self,
        ctx: &JobContext,
        gainers: Self::Input,
        now: DateTime<Utc>,
    ) -> Self::Output {
        let mut state = ctx.state.lock().await;
        self.rules.evaluate(&gainers, &mut state, to_ms(now))
    }

    fn format(&self, events: &Self::Output, _now: DateTime<Utc>) -> Vec<String> {
        render_events(events)
    }
}

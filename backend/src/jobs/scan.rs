use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use common::time::to_ms;
use market::rules::volume::HistoryVolumeSpikeRule;
use market::rules::{RuleSet, RuleThresholds};
use market::{AlertEvent, MoverRecord, RealertPolicy};

use super::{AlertJob, JobContext};
use crate::format::render_events;

/// Movers scan: the per-mover rule set, then a day-over-day history check
/// on the leading symbols.
pub struct ScanJob {
    interval: Duration,
    limit: usize,
    history_symbols: usize,
    rules: RuleSet,
    history: HistoryVolumeSpikeRule,
}

impl ScanJob {
    pub fn new(
        interval: Duration,
        limit: usize,
        history_symbols: usize,
        thresholds: &RuleThresholds,
        policy: RealertPolicy,
        calendar_tz: chrono_tz::Tz,
    ) -> Self {
        Self {
            interval,
            limit,
            history_symbols,
            rules: RuleSet::scan(thresholds, policy),
            history: HistoryVolumeSpikeRule::new(thresholds.history_spike_ratio, calendar_tz),
        }
    }
}

#[async_trait]
impl AlertJob for ScanJob {
    type Input = Vec<MoverRecord>;
    type Output = Vec<AlertEvent>;

    fn name(&self) -> &'static str {
        "scan"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self, ctx: &JobContext, _now: DateTime<Utc>) -> anyhow::Result<Self::Input> {
        ctx.source.movers(self.limit).await
    }

    async fn evaluate(
        &self,
        ctx: &JobContext,
        movers: Self::Input,
        now: DateTime<Utc>,
    ) -> Self::Output {
        let mut state = ctx.state.lock().await;

        let mut events = self.rules.evaluate(&movers, &mut state, to_ms(now));

        let leaders: Vec<String> = movers
            .iter()
            .take(self.history_symbols)
            .map(|m| m.symbol.clone())
            .collect();

        let history = self
            .history
            .evaluate(&leaders, ctx.source.as_ref(), &mut state.dedup)
            .await;
        events.extend(history);

        debug!(movers = movers.len(), events = events.len(), "scan evaluated");
        events
    }

    fn format(&self, events: &Self::Output, _now: DateTime<Utc>) -> Vec<String> {
        render_events(events)
    }
}

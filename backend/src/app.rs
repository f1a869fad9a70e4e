//! Composition root: wires configuration, source, notifier and jobs into a
//! scheduler.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use market::{MarketCalendar, MarketDataSource};
use scheduler::{Counters, Notifier, Scheduler};

use crate::config::AppConfig;
use crate::jobs::{
    GapsJob, JobContext, JobTask, OptionsJob, ScanJob, StatusJob, TopJob, WatchlistJob,
};

/// Registers the jobs in priority order: scan, watchlist, options, gaps,
/// top, status.
pub fn build_scheduler(
    cfg: &AppConfig,
    source: Arc<dyn MarketDataSource>,
    notifier: Arc<dyn Notifier>,
    calendar: MarketCalendar,
    started_at: DateTime<Utc>,
) -> (Scheduler, Arc<JobContext>) {
    let counters = Counters::default();
    let tz = calendar.timezone();
    let ctx = Arc::new(JobContext::new(source, calendar.clone()));
    let t = &cfg.thresholds;
    let iv = &cfg.intervals;

    let mut scheduler = Scheduler::new(
        cfg.scheduler.clone(),
        Arc::new(calendar),
        notifier.clone(),
        counters.clone(),
    );

    scheduler.register(Arc::new(JobTask::new(
        ScanJob::new(
            iv.scan,
            cfg.movers_limit,
            cfg.history_symbols,
            t,
            cfg.realert_policy,
            tz,
        ),
        ctx.clone(),
        notifier.clone(),
    )));

    scheduler.register(Arc::new(JobTask::new(
        WatchlistJob::new(iv.watchlist, cfg.watchlist_ttl, t.large_sale_delta),
        ctx.clone(),
        notifier.clone(),
    )));

    scheduler.register(Arc::new(JobTask::new(
        OptionsJob::new(iv.options, t.option_vol_oi_ratio, t.option_min_volume),
        ctx.clone(),
        notifier.clone(),
    )));

    scheduler.register(Arc::new(JobTask::new(
        GapsJob::new(iv.gaps, t),
        ctx.clone(),
        notifier.clone(),
    )));

    scheduler.register(Arc::new(JobTask::new(
        TopJob::new(iv.top, cfg.movers_limit, cfg.top_n),
        ctx.clone(),
        notifier.clone(),
    )));

    scheduler.register(Arc::new(JobTask::new(
        StatusJob::new(iv.status, started_at, counters),
        ctx.clone(),
        notifier,
    )));

    (scheduler, ctx)
}

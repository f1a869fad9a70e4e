//! Volume spike rules: intraday against the average, and today against
//! yesterday from intraday history.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};

use super::MoverRule;
use crate::dedup::{DedupStore, RealertPolicy};
use crate::source::MarketDataSource;
use crate::state::AlertState;
use crate::types::{AlertEvent, HistoryBar, MoverRecord, RuleKind, round2, safe_ratio};

/// `volume / avgVolume >= multiplier`, re-alerting only on a higher ratio.
pub struct VolumeSpikeRule {
    multiplier: f64,
}

impl VolumeSpikeRule {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }
}

impl MoverRule for VolumeSpikeRule {
    fn kind(&self) -> RuleKind {
        RuleKind::VolumeSpike
    }

    fn evaluate(&self, mover: &MoverRecord, state: &mut AlertState, _now_ms: u64) -> Option<AlertEvent> {
        let ratio = mover.volume_ratio()?;
        if ratio < self.multiplier {
            return None;
        }

        state
            .dedup
            .admit_level(
                self.kind(),
                &mover.symbol,
                round2(ratio),
                RealertPolicy::StrictIncrease,
            )
            .then(|| AlertEvent::VolumeSpike {
                mover: mover.clone(),
                ratio,
            })
    }
}

/// Today's and yesterday's aggregated volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayOverDay {
    pub today: NaiveDate,
    pub today_volume: f64,
    pub yesterday_volume: f64,
    pub ratio: f64,
}

/// Sums bar volume per local calendar date, oldest first.
pub fn daily_volumes(bars: &[HistoryBar], tz: Tz) -> Vec<(NaiveDate, f64)> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for bar in bars {
        *by_day
            .entry(bar.ts.with_timezone(&tz).date_naive())
            .or_default() += bar.volume;
    }
    by_day.into_iter().collect()
}

/// Compares the two most recent trading days present in `bars`.
///
/// `None` with fewer than two distinct days or a zero previous day.
pub fn day_over_day(bars: &[HistoryBar], tz: Tz) -> Option<DayOverDay> {
    let days = daily_volumes(bars, tz);
    let [.., (_, yesterday_volume), (today, today_volume)] = days.as_slice() else {
        return None;
    };

    Some(DayOverDay {
        today: *today,
        today_volume: *today_volume,
        yesterday_volume: *yesterday_volume,
        ratio: safe_ratio(*today_volume, *yesterday_volume)?,
    })
}

/// Day-over-day spike rule; history comes from an injected source.
pub struct HistoryVolumeSpikeRule {
    multiplier: f64,
    tz: Tz,
}

impl HistoryVolumeSpikeRule {
    pub fn new(multiplier: f64, tz: Tz) -> Self {
        Self { multiplier, tz }
    }

    /// Decision for one symbol given its bars.
    pub fn check(
        &self,
        symbol: &str,
        bars: &[HistoryBar],
        dedup: &mut DedupStore,
    ) -> Option<AlertEvent> {
        let dod = day_over_day(bars, self.tz)?;
        if dod.ratio < self.multiplier {
            return None;
        }

        dedup
            .admit_level(
                RuleKind::HistoryVolumeSpike,
                symbol,
                round2(dod.ratio),
                RealertPolicy::StrictIncrease,
            )
            .then(|| AlertEvent::HistoryVolumeSpike {
                symbol: symbol.to_string(),
                today_volume: dod.today_volume,
                yesterday_volume: dod.yesterday_volume,
                ratio: dod.ratio,
            })
    }

    /// Fetches history for each symbol and applies [`Self::check`].
    ///
    /// A failed fetch skips that symbol only.
    pub async fn evaluate(
        &self,
        symbols: &[String],
        source: &dyn MarketDataSource,
        dedup: &mut DedupStore,
    ) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        for symbol in symbols {
            let bars = match source.intraday_history(symbol).await {
                Ok(bars) => bars,
                Err(e) => {
                    warn!(symbol = %symbol, error = ?e, "history fetch failed; skipping symbol");
                    continue;
                }
            };

            debug!(symbol = %symbol, bars = bars.len(), "history fetched");

            if let Some(event) = self.check(symbol, &bars, dedup) {
                events.push(event);
            }
        }

        events
    }
}

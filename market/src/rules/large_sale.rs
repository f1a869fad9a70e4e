use tracing::debug;

use crate::types::{AlertEvent, MoverRecord};
use crate::watchlist::Watchlist;

/// Volume jump on a watchlisted symbol since the previous observation.
///
/// The baseline moves on every observation, so a second alert needs another
/// full `min_delta` on top of the last seen volume.
pub struct LargeSaleRule {
    min_delta: f64,
}

impl LargeSaleRule {
    pub fn new(min_delta: f64) -> Self {
        Self { min_delta }
    }

    /// Applies fresh quotes to the watchlist baselines.
    pub fn observe(
        &self,
        watchlist: &mut Watchlist,
        quotes: &[MoverRecord],
        now_ms: u64,
    ) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        for quote in quotes {
            let Some(volume) = quote.volume else {
                continue;
            };
            let Some(reason) = watchlist.get(&quote.symbol).map(|e| e.reason) else {
                continue;
            };

            let Some(previous) = watchlist.observe_volume(&quote.symbol, volume) else {
                debug!(symbol = %quote.symbol, volume, "watchlist baseline seeded");
                continue;
            };

            let delta = volume - previous;
            if delta >= self.min_delta {
                watchlist.mark_alerted(&quote.symbol, now_ms);
                events.push(AlertEvent::LargeSale {
                    symbol: quote.symbol.clone(),
                    reason,
                    volume,
                    delta,
                });
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchlist::WatchReason;

    fn quote(symbol: &str, volume: f64) -> MoverRecord {
        let mut m = MoverRecord::new(symbol);
        m.volume = Some(volume);
        m
    }

    #[test]
    fn delta_from_rolling_baseline() {
        let rule = LargeSaleRule::new(10_000.0);
        let mut w = Watchlist::new();
        w.add("ABC", WatchReason::Halted, Some(100_000.0), 0);

        // +5k: below threshold, baseline still moves.
        assert!(rule.observe(&mut w, &[quote("ABC", 105_000.0)], 1).is_empty());
        // +10k from the new baseline fires.
        let out = rule.observe(&mut w, &[quote("ABC", 115_000.0)], 2);
        assert_eq!(out.len(), 1);
        match &out[0] {
            AlertEvent::LargeSale { delta, reason, .. } => {
                assert_eq!(*delta, 10_000.0);
                assert_eq!(*reason, WatchReason::Halted);
            }
            other => panic!("unexpected {other:?}"),
        }
        // Same volume again: no delta.
        assert!(rule.observe(&mut w, &[quote("ABC", 115_000.0)], 3).is_empty());
        assert_eq!(w.get("ABC").unwrap().last_alert_ms, Some(2));
    }

    #[test]
    fn first_observation_only_seeds() {
        let rule = LargeSaleRule::new(10_000.0);
        let mut w = Watchlist::new();
        w.add("ABC", WatchReason::UnusualActivity, None, 0);

        assert!(rule.observe(&mut w, &[quote("ABC", 1_000_000.0)], 1).is_empty());
        assert_eq!(w.get("ABC").unwrap().last_volume, Some(1_000_000.0));
    }

    #[test]
    fn unwatched_symbols_are_ignored() {
        let rule = LargeSaleRule::new(10_000.0);
        let mut w = Watchlist::new();

        assert!(rule.observe(&mut w, &[quote("ZZZ", 1e9)], 1).is_empty());
        assert!(w.is_empty());
    }
}

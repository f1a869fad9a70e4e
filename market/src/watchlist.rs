//! Symbols kept under observation after a halt or unusual activity.

use std::collections::BTreeMap;
use std::fmt;

use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchReason {
    Halted,
    UnusualActivity,
}

impl fmt::Display for WatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchReason::Halted => f.write_str("halted"),
            WatchReason::UnusualActivity => f.write_str("unusual activity"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub reason: WatchReason,
    pub added_ms: u64,
    /// Baseline for the large-sale delta; refreshed on every observation.
    pub last_volume: Option<f64>,
    pub last_alert_ms: Option<u64>,
}

impl WatchlistEntry {
    fn last_activity_ms(&self) -> u64 {
        self.last_alert_ms.unwrap_or(0).max(self.added_ms)
    }
}

#[derive(Debug, Default)]
pub struct Watchlist {
    entries: BTreeMap<String, WatchlistEntry>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `symbol` unless it is already watched. The first reason wins.
    pub fn add(
        &mut self,
        symbol: &str,
        reason: WatchReason,
        volume: Option<f64>,
        now_ms: u64,
    ) -> bool {
        if self.entries.contains_key(symbol) {
            return false;
        }

        info!(symbol = %symbol, reason = %reason, "symbol added to watchlist");
        self.entries.insert(
            symbol.to_string(),
            WatchlistEntry {
                symbol: symbol.to_string(),
                reason,
                added_ms: now_ms,
                last_volume: volume,
                last_alert_ms: None,
            },
        );
        true
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&WatchlistEntry> {
        self.entries.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Records the latest volume and returns the previous baseline.
    pub fn observe_volume(&mut self, symbol: &str, volume: f64) -> Option<f64> {
        let entry = self.entries.get_mut(symbol)?;
        entry.last_volume.replace(volume)
    }

    pub fn mark_alerted(&mut self, symbol: &str, now_ms: u64) {
        if let Some(entry) = self.entries.get_mut(symbol) {
            entry.last_alert_ms = Some(now_ms);
        }
    }

    /// Drops entries with no activity for longer than `ttl_ms`.
    pub fn evict_idle(&mut self, now_ms: u64, ttl_ms: u64) -> Vec<String> {
        let stale: Vec<String> = self
            .entries
            .values()
            .filter(|e| now_ms.saturating_sub(e.last_activity_ms()) > ttl_ms)
            .map(|e| e.symbol.clone())
            .collect();

        for symbol in &stale {
            self.entries.remove(symbol);
            info!(symbol = %symbol, "watchlist entry evicted after idle ttl");
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent_and_keeps_first_reason() {
        let mut w = Watchlist::new();

        assert!(w.add("ABC", WatchReason::Halted, Some(100.0), 1_000));
        assert!(!w.add("ABC", WatchReason::UnusualActivity, None, 2_000));

        let e = w.get("ABC").unwrap();
        assert_eq!(e.reason, WatchReason::Halted);
        assert_eq!(e.added_ms, 1_000);
        assert_eq!(e.last_volume, Some(100.0));
    }

    #[test]
    fn observe_volume_swaps_baseline() {
        let mut w = Watchlist::new();
        w.add("ABC", WatchReason::Halted, None, 0);

        assert_eq!(w.observe_volume("ABC", 10.0), None);
        assert_eq!(w.observe_volume("ABC", 25.0), Some(10.0));
        assert_eq!(w.observe_volume("ZZZ", 1.0), None);
    }

    #[test]
    fn eviction_uses_last_activity() {
        let mut w = Watchlist::new();
        w.add("OLD", WatchReason::Halted, None, 0);
        w.add("ALERTED", WatchReason::Halted, None, 0);
        w.add("NEW", WatchReason::UnusualActivity, None, 9_000);
        w.mark_alerted("ALERTED", 8_000);

        let evicted = w.evict_idle(10_000, 5_000);

        assert_eq!(evicted, vec!["OLD".to_string()]);
        assert_eq!(w.symbols(), vec!["ALERTED".to_string(), "NEW".to_string()]);
    }
}

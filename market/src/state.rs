use crate::dedup::DedupStore;
use crate::types::RuleKind;
use crate::watchlist::Watchlist;

/// Rules whose first alert puts a symbol on the watchlist.
const WATCH_FEEDERS: [RuleKind; 2] = [RuleKind::UnusualActivity, RuleKind::TradingHalt];

/// All mutable alerting state of the process.
///
/// Owned by the composition root and lent to evaluators by `&mut`; no
/// globals, so every test can build an isolated instance.
#[derive(Debug, Default)]
pub struct AlertState {
    pub dedup: DedupStore,
    pub watchlist: Watchlist,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evicts idle watchlist entries and forgets the alerts that added
    /// them, so a symbol that halts again is alerted and watched again.
    pub fn evict_idle(&mut self, now_ms: u64, ttl_ms: u64) -> Vec<String> {
        let evicted = self.watchlist.evict_idle(now_ms, ttl_ms);
        for symbol in &evicted {
            for rule in WATCH_FEEDERS {
                self.dedup.remove(rule, symbol);
            }
        }
        evicted
    }
}

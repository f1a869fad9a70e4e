//! Rules that put a symbol on the watchlist when they fire.

use super::MoverRule;
use crate::state::AlertState;
use crate::types::{AlertEvent, MoverRecord, RuleKind};
use crate::watchlist::WatchReason;

/// Big move or heavy volume; fires at most once per symbol.
pub struct UnusualActivityRule {
    min_change_percent: f64,
    min_volume_ratio: f64,
}

impl UnusualActivityRule {
    pub fn new(min_change_percent: f64, min_volume_ratio: f64) -> Self {
        Self {
            min_change_percent,
            min_volume_ratio,
        }
    }
}

impl MoverRule for UnusualActivityRule {
    fn kind(&self) -> RuleKind {
        RuleKind::UnusualActivity
    }

    fn evaluate(&self, mover: &MoverRecord, state: &mut AlertState, now_ms: u64) -> Option<AlertEvent> {
        let change_percent = mover.change_percent;
        let volume_ratio = mover.volume_ratio();

        let big_move = change_percent.is_some_and(|p| p >= self.min_change_percent);
        let heavy_volume = volume_ratio.is_some_and(|r| r >= self.min_volume_ratio);
        if !(big_move || heavy_volume) {
            return None;
        }

        if !state.dedup.first_time(self.kind(), &mover.symbol) {
            return None;
        }

        state.watchlist.add(
            &mover.symbol,
            WatchReason::UnusualActivity,
            mover.volume,
            now_ms,
        );

        Some(AlertEvent::UnusualActivity {
            mover: mover.clone(),
            change_percent,
            volume_ratio,
        })
    }
}

/// `marketState == HALTED`; fires at most once per symbol.
pub struct TradingHaltRule;

impl MoverRule for TradingHaltRule {
    fn kind(&self) -> RuleKind {
        RuleKind::TradingHalt
    }

    fn evaluate(&self, mover: &MoverRecord, state: &mut AlertState, now_ms: u64) -> Option<AlertEvent> {
        if !mover.is_halted() || !state.dedup.first_time(self.kind(), &mover.symbol) {
            return None;
        }

        state
            .watchlist
            .add(&mover.symbol, WatchReason::Halted, mover.volume, now_ms);

        Some(AlertEvent::Halt {
            mover: mover.clone(),
        })
    }
}

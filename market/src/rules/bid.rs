//! Order-book bid patterns. Both rules fire at most once per symbol for the
//! life of the process.

use super::MoverRule;
use crate::state::AlertState;
use crate::types::{AlertEvent, MoverRecord, RuleKind};

/// A bid parked at one exact price with one exact size.
pub struct BidExactRule {
    price: f64,
    tolerance: f64,
    size: f64,
}

impl BidExactRule {
    pub fn new(price: f64, tolerance: f64, size: f64) -> Self {
        Self {
            price,
            tolerance,
            size,
        }
    }

    fn matches(&self, bid: f64, bid_size: f64) -> bool {
        // Small slack so 0.01 survives binary rounding.
        (bid - self.price).abs() <= self.tolerance + 1e-9 && bid_size == self.size
    }
}

impl MoverRule for BidExactRule {
    fn kind(&self) -> RuleKind {
        RuleKind::BidExact
    }

    fn evaluate(&self, mover: &MoverRecord, state: &mut AlertState, _now_ms: u64) -> Option<AlertEvent> {
        let (bid, bid_size) = (mover.bid()?, mover.bid_size()?);
        if !self.matches(bid, bid_size) {
            return None;
        }

        state
            .dedup
            .first_time(self.kind(), &mover.symbol)
            .then(|| AlertEvent::BidExact {
                mover: mover.clone(),
                bid,
                bid_size,
            })
    }
}

/// A large bid with meaningful size.
pub struct BidHighValueRule {
    min_price: f64,
    min_size: f64,
}

impl BidHighValueRule {
    pub fn new(min_price: f64, min_size: f64) -> Self {
        Self {
            min_price,
            min_size,
        }
    }
}

impl MoverRule for BidHighValueRule {
    fn kind(&self) -> RuleKind {
        RuleKind::BidHighValue
    }

    fn evaluate(&self, mover: &MoverRecord, state: &mut AlertState, _now_ms: u64) -> Option<AlertEvent> {
        let (bid, bid_size) = (mover.bid()?, mover.bid_size()?);
        if bid < self.min_price || bid_size < self.min_size {
            return None;
        }

        state
            .dedup
            .first_time(self.kind(), &mover.symbol)
            .then(|| AlertEvent::BidHighValue {
                mover: mover.clone(),
                bid,
                bid_size,
            })
    }
}

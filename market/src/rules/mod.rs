//! Alert rules.
//!
//! A rule is a predicate plus a dedup policy. Rules that only need the
//! current mover implement [`MoverRule`] and are grouped in a [`RuleSet`];
//! rules that need extra lookups take the [`crate::MarketDataSource`]
//! capability as an argument instead of calling I/O themselves.

pub mod activity;
pub mod bid;
pub mod digest;
pub mod gain;
pub mod large_sale;
pub mod options;
pub mod volume;

use tracing::debug;

use crate::dedup::RealertPolicy;
use crate::state::AlertState;
use crate::types::{AlertEvent, MoverRecord, RuleKind};

/// Trigger levels for every rule.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleThresholds {
    pub gain_percent: f64,
    pub volume_spike_ratio: f64,
    pub history_spike_ratio: f64,

    pub bid_exact_price: f64,
    pub bid_exact_tolerance: f64,
    pub bid_exact_size: f64,
    pub bid_high_min_price: f64,
    pub bid_high_min_size: f64,

    pub unusual_change_percent: f64,
    pub unusual_volume_ratio: f64,

    pub option_vol_oi_ratio: f64,
    pub option_min_volume: f64,

    pub gap_percent: f64,
    pub extended_hours_percent: f64,

    pub large_sale_delta: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            gain_percent: 5.0,
            volume_spike_ratio: 3.0,
            history_spike_ratio: 3.0,

            bid_exact_price: 199_999.00,
            bid_exact_tolerance: 0.01,
            bid_exact_size: 100.0,
            bid_high_min_price: 2_000.00,
            bid_high_min_size: 20.0,

            unusual_change_percent: 10.0,
            unusual_volume_ratio: 3.0,

            option_vol_oi_ratio: 30.0,
            option_min_volume: 3_000.0,

            gap_percent: 5.0,
            extended_hours_percent: 3.0,

            large_sale_delta: 10_000.0,
        }
    }
}

/// A rule evaluated against one mover at a time.
///
/// Implementations read and update `state` in the same call, so the dedup
/// decision and its bookkeeping can never drift apart.
pub trait MoverRule: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn evaluate(
        &self,
        mover: &MoverRecord,
        state: &mut AlertState,
        now_ms: u64,
    ) -> Option<AlertEvent>;
}

/// Ordered collection of mover rules sharing one pass over a batch.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn MoverRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, rule: Box<dyn MoverRule>) {
        self.rules.push(rule);
    }

    pub fn with_rule(mut self, rule: impl MoverRule + 'static) -> Self {
        self.register(Box::new(rule));
        self
    }

    /// Rules run on every movers scan.
    pub fn scan(t: &RuleThresholds, policy: RealertPolicy) -> Self {
        Self::new()
            .with_rule(gain::GainThresholdRule::new(t.gain_percent, policy))
            .with_rule(volume::VolumeSpikeRule::new(t.volume_spike_ratio))
            .with_rule(bid::BidExactRule::new(
                t.bid_exact_price,
                t.bid_exact_tolerance,
                t.bid_exact_size,
            ))
            .with_rule(bid::BidHighValueRule::new(
                t.bid_high_min_price,
                t.bid_high_min_size,
            ))
            .with_rule(activity::UnusualActivityRule::new(
                t.unusual_change_percent,
                t.unusual_volume_ratio,
            ))
            .with_rule(activity::TradingHaltRule)
    }

    /// Stateless digest rules run on the screener feed.
    pub fn digest(t: &RuleThresholds) -> Self {
        Self::new()
            .with_rule(digest::GapUpRule::new(t.gap_percent))
            .with_rule(digest::ExtendedHoursRule::new(t.extended_hours_percent))
    }

    pub fn kinds(&self) -> Vec<RuleKind> {
        self.rules.iter().map(|r| r.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule over the batch. Events come out grouped by rule, in
    /// registration order, then in mover order.
    pub fn evaluate(
        &self,
        movers: &[MoverRecord],
        state: &mut AlertState,
        now_ms: u64,
    ) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        for rule in &self.rules {
            for mover in movers {
                if let Some(event) = rule.evaluate(mover, state, now_ms) {
                    debug!(rule = %rule.kind(), symbol = %mover.symbol, "rule fired");
                    events.push(event);
                }
            }
        }

        events
    }
}

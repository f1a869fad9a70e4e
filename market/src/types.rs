use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::normalize::numeric::coerce_f64;

/// One traded symbol observed during a single poll cycle.
///
/// Built fresh by the normalizer on every poll and dropped at the end of
/// the cycle. Numeric fields are `None` whenever upstream omitted them or
/// sent something unparseable.
#[derive(Debug, Clone, PartialEq)]
pub struct MoverRecord {
    pub symbol: String,
    pub price: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<f64>,
    pub avg_volume: Option<f64>,

    /// Raw upstream fields kept for individual rules (bid, marketState, ...).
    pub extra: BTreeMap<String, Value>,
}

impl MoverRecord {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            price: None,
            change_percent: None,
            volume: None,
            avg_volume: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(coerce_f64)
    }

    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// `volume / avgVolume`, or `None` when either side is missing or the
    /// denominator is zero.
    pub fn volume_ratio(&self) -> Option<f64> {
        safe_ratio(self.volume?, self.avg_volume?)
    }

    pub fn bid(&self) -> Option<f64> {
        self.extra_f64("bid")
    }

    pub fn bid_size(&self) -> Option<f64> {
        self.extra_f64("bidSize")
    }

    pub fn market_state(&self) -> Option<&str> {
        self.extra_str("marketState")
    }

    pub fn is_halted(&self) -> bool {
        self.market_state()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("HALTED"))
    }

    pub fn previous_close(&self) -> Option<f64> {
        self.extra_f64("regularMarketPreviousClose")
            .or_else(|| self.extra_f64("previousClose"))
    }

    /// Pre-market move in percent; derived from the pre-market price when
    /// upstream does not send the percentage directly.
    pub fn pre_market_change_percent(&self) -> Option<f64> {
        self.extra_f64("preMarketChangePercent").or_else(|| {
            let close = self.previous_close()?;
            percent_change(self.extra_f64("preMarketPrice")?, close)
        })
    }

    /// After-hours move in percent, see [`Self::pre_market_change_percent`].
    pub fn post_market_change_percent(&self) -> Option<f64> {
        self.extra_f64("postMarketChangePercent").or_else(|| {
            let base = self.price.or_else(|| self.previous_close())?;
            percent_change(self.extra_f64("postMarketPrice")?, base)
        })
    }

    pub fn display_name(&self) -> Option<&str> {
        self.extra_str("shortName")
    }
}

/// A single option contract from the unusual-activity feed.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionContract {
    /// Contract symbol, e.g. `AAPL260116C00200000`.
    pub symbol: String,
    pub underlying: Option<String>,
    /// `Call` / `Put` as sent upstream.
    pub kind: Option<String>,
    pub strike: Option<f64>,
    pub expiration: Option<String>,
    pub last_price: Option<f64>,
    pub volume: Option<f64>,
    pub open_interest: Option<f64>,
    pub vol_oi_ratio: Option<f64>,
}

impl OptionContract {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            underlying: None,
            kind: None,
            strike: None,
            expiration: None,
            last_price: None,
            volume: None,
            open_interest: None,
            vol_oi_ratio: None,
        }
    }
}

/// Intraday bar; only the volume is needed for day-over-day comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryBar {
    pub ts: DateTime<Utc>,
    pub volume: f64,
}

/// Division that never panics and never yields inf/NaN.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return None;
    }
    Some(numerator / denominator)
}

/// Percent move from `base` to `now`.
pub fn percent_change(now: f64, base: f64) -> Option<f64> {
    safe_ratio(now - base, base).map(|r| r * 100.0)
}

/// Rounds to two decimals, the precision alerts are deduplicated at.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Every rule that can emit an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    GainThreshold,
    VolumeSpike,
    HistoryVolumeSpike,
    BidExact,
    BidHighValue,
    UnusualActivity,
    TradingHalt,
    UnusualOption,
    GapUp,
    ExtendedHours,
    LargeSale,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::GainThreshold => "gain_threshold",
            RuleKind::VolumeSpike => "volume_spike",
            RuleKind::HistoryVolumeSpike => "history_volume_spike",
            RuleKind::BidExact => "bid_exact",
            RuleKind::BidHighValue => "bid_high_value",
            RuleKind::UnusualActivity => "unusual_activity",
            RuleKind::TradingHalt => "trading_halt",
            RuleKind::UnusualOption => "unusual_option",
            RuleKind::GapUp => "gap_up",
            RuleKind::ExtendedHours => "extended_hours",
            RuleKind::LargeSale => "large_sale",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trading session an extended-hours move was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedSession {
    PreMarket,
    AfterHours,
}

/// Output of a rule evaluation, ready for formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertEvent {
    Gain {
        mover: MoverRecord,
        change_percent: f64,
    },
    VolumeSpike {
        mover: MoverRecord,
        ratio: f64,
    },
    HistoryVolumeSpike {
        symbol: String,
        today_volume: f64,
        yesterday_volume: f64,
        ratio: f64,
    },
    BidExact {
        mover: MoverRecord,
        bid: f64,
        bid_size: f64,
    },
    BidHighValue {
        mover: MoverRecord,
        bid: f64,
        bid_size: f64,
    },
    UnusualActivity {
        mover: MoverRecord,
        change_percent: Option<f64>,
        volume_ratio: Option<f64>,
    },
    Halt {
        mover: MoverRecord,
    },
    UnusualOption {
        contract: OptionContract,
        vol_oi_ratio: f64,
    },
    GapUp {
        mover: MoverRecord,
        gap_percent: f64,
    },
    ExtendedHours {
        mover: MoverRecord,
        session: ExtendedSession,
        change_percent: f64,
    },
    LargeSale {
        symbol: String,
        reason: crate::watchlist::WatchReason,
        volume: f64,
        delta: f64,
    },
}

impl AlertEvent {
    pub fn kind(&self) -> RuleKind {
        match self {
            AlertEvent::Gain { .. } => RuleKind::GainThreshold,
            AlertEvent::VolumeSpike { .. } => RuleKind::VolumeSpike,
            AlertEvent::HistoryVolumeSpike { .. } => RuleKind::HistoryVolumeSpike,
            AlertEvent::BidExact { .. } => RuleKind::BidExact,
            AlertEvent::BidHighValue { .. } => RuleKind::BidHighValue,
            AlertEvent::UnusualActivity { .. } => RuleKind::UnusualActivity,
            AlertEvent::Halt { .. } => RuleKind::TradingHalt,
            AlertEvent::UnusualOption { .. } => RuleKind::UnusualOption,
            AlertEvent::GapUp { .. } => RuleKind::GapUp,
            AlertEvent::ExtendedHours { .. } => RuleKind::ExtendedHours,
            AlertEvent::LargeSale { .. } => RuleKind::LargeSale,
        }
    }

    /// Symbol the alert is about (contract symbol for options).
    pub fn symbol(&self) -> &str {
        match self {
            AlertEvent::Gain { mover, .. }
            | AlertEvent::VolumeSpike { mover, .. }
            | AlertEvent::BidExact { mover, .. }
            | AlertEvent::BidHighValue { mover, .. }
            | AlertEvent::UnusualActivity { mover, .. }
            | AlertEvent::Halt { mover }
            | AlertEvent::GapUp { mover, .. }
            | AlertEvent::ExtendedHours { mover, .. } => &mover.symbol,
            AlertEvent::HistoryVolumeSpike { symbol, .. } | AlertEvent::LargeSale { symbol, .. } => {
                symbol
            }
            AlertEvent::UnusualOption { contract, .. } => &contract.symbol,
        }
    }
}

//! Per-rule memory of what has already been alerted.
//!
//! Lives for the whole process; a restart clears it. Watchlist-feeding
//! entries are dropped when their symbol leaves the watchlist.

use std::collections::HashMap;
use std::str::FromStr;

use crate::types::RuleKind;

/// What was remembered for a (rule, symbol) pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DedupValue {
    /// Last alerted level (percent, ratio, ...).
    Level(f64),
    /// Set-membership rules: the symbol already fired.
    Seen,
}

/// When a level rule may fire again for a symbol it already alerted on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RealertPolicy {
    /// Only a strictly higher level re-alerts.
    #[default]
    StrictIncrease,
    /// Any different level re-alerts.
    AnyChange,
}

impl FromStr for RealertPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "increase" | "strict_increase" => Ok(RealertPolicy::StrictIncrease),
            "change" | "any_change" => Ok(RealertPolicy::AnyChange),
            other => Err(format!("unknown re-alert policy `{other}`")),
        }
    }
}

#[derive(Debug, Default)]
pub struct DedupStore {
    entries: HashMap<RuleKind, HashMap<String, DedupValue>>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, rule: RuleKind, symbol: &str) -> Option<DedupValue> {
        self.entries.get(&rule)?.get(symbol).copied()
    }

    pub fn set(&mut self, rule: RuleKind, symbol: &str, value: DedupValue) {
        self.entries
            .entry(rule)
            .or_default()
            .insert(symbol.to_string(), value);
    }

    pub fn remove(&mut self, rule: RuleKind, symbol: &str) -> Option<DedupValue> {
        self.entries.get_mut(&rule)?.remove(symbol)
    }

    /// Total remembered (rule, symbol) pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fire-at-most-once check. Returns `true` exactly once per pair and
    /// records the pair in the same step.
    pub fn first_time(&mut self, rule: RuleKind, symbol: &str) -> bool {
        if self.get(rule, symbol).is_some() {
            return false;
        }
        self.set(rule, symbol, DedupValue::Seen);
        true
    }

    /// Level check. Returns `true` when `level` may alert under `policy`
    /// and, if so, stores it as the new last-alerted level.
    pub fn admit_level(
        &mut self,
        rule: RuleKind,
        symbol: &str,
        level: f64,
        policy: RealertPolicy,
    ) -> bool {
        let admitted = match self.get(rule, symbol) {
            None => true,
            Some(DedupValue::Level(prev)) => match policy {
                RealertPolicy::StrictIncrease => level > prev,
                RealertPolicy::AnyChange => level != prev,
            },
            Some(DedupValue::Seen) => false,
        };

        if admitted {
            self.set(rule, symbol, DedupValue::Level(level));
        }
        admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_pair_fires_again() {
        let mut d = DedupStore::new();
        assert!(d.first_time(RuleKind::TradingHalt, "HLT"));
        assert_eq!(d.remove(RuleKind::TradingHalt, "HLT"), Some(DedupValue::Seen));
        assert_eq!(d.remove(RuleKind::TradingHalt, "HLT"), None);
        assert!(d.first_time(RuleKind::TradingHalt, "HLT"));
    }

    #[test]
    fn get_set_are_scoped_per_rule() {
        let mut store = DedupStore::new();
        store.set(RuleKind::GainThreshold, "ABC", DedupValue::Level(5.0));

        assert_eq!(
            store.get(RuleKind::GainThreshold, "ABC"),
            Some(DedupValue::Level(5.0))
        );
        assert_eq!(store.get(RuleKind::VolumeSpike, "ABC"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn first_time_fires_once() {
        let mut store = DedupStore::new();

        assert!(store.first_time(RuleKind::BidExact, "ABC"));
        assert!(!store.first_time(RuleKind::BidExact, "ABC"));
        assert!(store.first_time(RuleKind::BidExact, "XYZ"));
    }

    #[test]
    fn strict_increase_suppresses_flat_and_lower_levels() {
        let mut store = DedupStore::new();
        let p = RealertPolicy::StrictIncrease;

        assert!(store.admit_level(RuleKind::GainThreshold, "ABC", 5.0, p));
        assert!(!store.admit_level(RuleKind::GainThreshold, "ABC", 5.0, p));
        assert!(!store.admit_level(RuleKind::GainThreshold, "ABC", 4.9, p));
        assert!(store.admit_level(RuleKind::GainThreshold, "ABC", 7.5, p));

        assert_eq!(
            store.get(RuleKind::GainThreshold, "ABC"),
            Some(DedupValue::Level(7.5))
        );
    }

    #[test]
    fn any_change_realerts_on_drop() {
        let mut store = DedupStore::new();
        let p = RealertPolicy::AnyChange;

        assert!(store.admit_level(RuleKind::GainThreshold, "ABC", 7.0, p));
        assert!(!store.admit_level(RuleKind::GainThreshold, "ABC", 7.0, p));
        assert!(store.admit_level(RuleKind::GainThreshold, "ABC", 6.0, p));
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("increase".parse::<RealertPolicy>(), Ok(RealertPolicy::StrictIncrease));
        assert_eq!("CHANGE".parse::<RealertPolicy>(), Ok(RealertPolicy::AnyChange));
        assert!("sometimes".parse::<RealertPolicy>().is_err());
    }
}

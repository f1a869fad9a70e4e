use tracing::debug;

use crate::dedup::DedupStore;
use crate::types::{AlertEvent, OptionContract, RuleKind};

/// Contracts trading far above their open interest ("sweeps").
///
/// Keyed on the contract symbol; each contract alerts at most once.
pub struct UnusualOptionsRule {
    min_vol_oi_ratio: f64,
    min_volume: f64,
}

impl UnusualOptionsRule {
    pub fn new(min_vol_oi_ratio: f64, min_volume: f64) -> Self {
        Self {
            min_vol_oi_ratio,
            min_volume,
        }
    }

    pub fn evaluate(&self, contracts: &[OptionContract], dedup: &mut DedupStore) -> Vec<AlertEvent> {
        contracts
            .iter()
            .filter_map(|c| {
                let ratio = c.vol_oi_ratio?;
                let volume = c.volume?;
                if ratio < self.min_vol_oi_ratio || volume < self.min_volume {
                    return None;
                }

                if !dedup.first_time(RuleKind::UnusualOption, &c.symbol) {
                    return None;
                }

                debug!(contract = %c.symbol, ratio, volume, "unusual option contract");
                Some(AlertEvent::UnusualOption {
                    contract: c.clone(),
                    vol_oi_ratio: ratio,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(symbol: &str, volume: f64, ratio: f64) -> OptionContract {
        let mut c = OptionContract::new(symbol);
        c.volume = Some(volume);
        c.vol_oi_ratio = Some(ratio);
        c
    }

    #[test]
    fn both_conditions_are_required() {
        let rule = UnusualOptionsRule::new(30.0, 3_000.0);
        let mut dedup = DedupStore::new();

        let out = rule.evaluate(
            &[
                contract("HIT", 3_000.0, 30.0),
                contract("LOWVOL", 2_999.0, 90.0),
                contract("LOWRATIO", 50_000.0, 29.9),
            ],
            &mut dedup,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol(), "HIT");
    }

    #[test]
    fn contract_alerts_once() {
        let rule = UnusualOptionsRule::new(30.0, 3_000.0);
        let mut dedup = DedupStore::new();
        let batch = [contract("C1", 5_000.0, 40.0)];

        assert_eq!(rule.evaluate(&batch, &mut dedup).len(), 1);
        assert!(rule.evaluate(&batch, &mut dedup).is_empty());
    }

    #[test]
    fn missing_ratio_is_no_signal() {
        let rule = UnusualOptionsRule::new(30.0, 3_000.0);
        let mut dedup = DedupStore::new();

        let mut c = OptionContract::new("C1");
        c.volume = Some(10_000.0);

        assert!(rule.evaluate(&[c], &mut dedup).is_empty());
    }
}

use super::MoverRule;
use crate::dedup::RealertPolicy;
use crate::state::AlertState;
use crate::types::{AlertEvent, MoverRecord, RuleKind, round2};

/// Fires when the day change reaches the gain threshold.
///
/// Deduplicated on the percent rounded to two decimals, re-alerting per the
/// configured policy.
pub struct GainThresholdRule {
    threshold: f64,
    policy: RealertPolicy,
}

impl GainThresholdRule {
    pub fn new(threshold: f64, policy: RealertPolicy) -> Self {
        Self { threshold, policy }
    }
}

impl MoverRule for GainThresholdRule {
    fn kind(&self) -> RuleKind {
        RuleKind::GainThreshold
    }

    fn evaluate(&self, mover: &MoverRecord, state: &mut AlertState, _now_ms: u64) -> Option<AlertEvent> {
        let pct = mover.change_percent?;
        if pct < self.threshold {
            return None;
        }

        state
            .dedup
            .admit_level(self.kind(), &mover.symbol, round2(pct), self.policy)
            .then(|| AlertEvent::Gain {
                mover: mover.clone(),
                change_percent: pct,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mover(pct: f64) -> MoverRecord {
        let mut m = MoverRecord::new("ABC");
        m.change_percent = Some(pct);
        m
    }

    #[test]
    fn repeat_level_is_suppressed_and_increase_realerts() {
        let rule = GainThresholdRule::new(5.0, RealertPolicy::StrictIncrease);
        let mut state = AlertState::new();

        let fired: Vec<bool> = [5.0, 5.0, 7.5]
            .into_iter()
            .map(|pct| rule.evaluate(&mover(pct), &mut state, 0).is_some())
            .collect();

        assert_eq!(fired, vec![true, false, true]);
    }

    #[test]
    fn below_threshold_and_missing_percent_never_fire() {
        let rule = GainThresholdRule::new(5.0, RealertPolicy::StrictIncrease);
        let mut state = AlertState::new();

        assert!(rule.evaluate(&mover(4.99), &mut state, 0).is_none());
        assert!(
            rule.evaluate(&MoverRecord::new("ABC"), &mut state, 0)
                .is_none()
        );
        assert!(state.dedup.is_empty());
    }

    #[test]
    fn rounding_hides_sub_cent_noise() {
        let rule = GainThresholdRule::new(5.0, RealertPolicy::AnyChange);
        let mut state = AlertState::new();

        assert!(rule.evaluate(&mover(6.001), &mut state, 0).is_some());
        assert!(rule.evaluate(&mover(6.004), &mut state, 0).is_none());
        assert!(rule.evaluate(&mover(5.5), &mut state, 0).is_some());
    }
}

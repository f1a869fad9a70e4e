//! Periodic digest rules. No dedup: the same symbols are reported on every
//! gap scan while the condition holds.

use super::MoverRule;
use crate::state::AlertState;
use crate::types::{AlertEvent, ExtendedSession, MoverRecord, RuleKind, percent_change};

/// Regular-session price at least `threshold` percent above previous close.
pub struct GapUpRule {
    threshold: f64,
}

impl GapUpRule {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl MoverRule for GapUpRule {
    fn kind(&self) -> RuleKind {
        RuleKind::GapUp
    }

    fn evaluate(&self, mover: &MoverRecord, _state: &mut AlertState, _now_ms: u64) -> Option<AlertEvent> {
        let gap_percent = percent_change(mover.price?, mover.previous_close()?)?;

        (gap_percent >= self.threshold).then(|| AlertEvent::GapUp {
            mover: mover.clone(),
            gap_percent,
        })
    }
}

/// Pre-market or after-hours move of at least `threshold` percent either way.
pub struct ExtendedHoursRule {
    threshold: f64,
}

impl ExtendedHoursRule {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl MoverRule for ExtendedHoursRule {
    fn kind(&self) -> RuleKind {
        RuleKind::ExtendedHours
    }

    /// When both sessions qualify the larger move is reported.
    fn evaluate(&self, mover: &MoverRecord, _state: &mut AlertState, _now_ms: u64) -> Option<AlertEvent> {
        let pre = mover
            .pre_market_change_percent()
            .map(|p| (ExtendedSession::PreMarket, p));
        let post = mover
            .post_market_change_percent()
            .map(|p| (ExtendedSession::AfterHours, p));

        let (session, change_percent) = [pre, post]
            .into_iter()
            .flatten()
            .filter(|(_, p)| p.abs() >= self.threshold)
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))?;

        Some(AlertEvent::ExtendedHours {
            mover: mover.clone(),
            session,
            change_percent,
        })
    }
}

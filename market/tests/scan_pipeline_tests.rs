use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use chrono_tz::America::New_York;
use serde_json::json;

use market::normalize::{normalize_history, normalize_movers};
use market::rules::large_sale::LargeSaleRule;
use market::rules::volume::HistoryVolumeSpikeRule;
use market::rules::{RuleSet, RuleThresholds};
use market::{
    AlertEvent, AlertState, HistoryBar, MarketDataSource, MoverRecord, OptionContract,
    RealertPolicy, RuleKind, WatchReason,
};

/// In-memory source keyed by symbol.
#[derive(Default)]
struct MockSource {
    history: HashMap<String, Vec<HistoryBar>>,
    quotes: Vec<MoverRecord>,
}

#[async_trait]
impl MarketDataSource for MockSource {
    async fn movers(&self, _limit: usize) -> anyhow::Result<Vec<MoverRecord>> {
        Ok(Vec::new())
    }

    async fn day_gainers(&self) -> anyhow::Result<Vec<MoverRecord>> {
        Ok(Vec::new())
    }

    async fn unusual_options(&self) -> anyhow::Result<Vec<OptionContract>> {
        Ok(Vec::new())
    }

    async fn quotes(&self, symbols: &[String]) -> anyhow::Result<Vec<MoverRecord>> {
        Ok(self
            .quotes
            .iter()
            .filter(|q| symbols.contains(&q.symbol))
            .cloned()
            .collect())
    }

    async fn intraday_history(&self, symbol: &str) -> anyhow::Result<Vec<HistoryBar>> {
        self.history
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no history for {symbol}"))
    }
}

fn three_symbol_payload() -> serde_json::Value {
    json!({
        "results": [
            {"symbol": "HOT", "change_percent": "+12.00%", "price": "$4.10", "volume": "5,000,000", "avg_volume": "1,000,000"},
            {"symbol": "MILD", "changePercent": 2.1, "price": 30.0, "volume": 1_000_000, "averageVolume": 900_000},
            {"ticker": "FLAT", "percent_change": "0.00%", "last": "$12.00", "volume": 0, "avg_volume": 0}
        ]
    })
}

#[test]
fn one_hot_symbol_yields_exactly_three_alerts() {
    let movers = normalize_movers(&three_symbol_payload());
    assert_eq!(movers.len(), 3);

    let rules = RuleSet::scan(&RuleThresholds::default(), RealertPolicy::StrictIncrease);
    let mut state = AlertState::new();

    let events = rules.evaluate(&movers, &mut state, 1_000);

    let kinds: Vec<RuleKind> = events.iter().map(AlertEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            RuleKind::GainThreshold,
            RuleKind::VolumeSpike,
            RuleKind::UnusualActivity
        ]
    );
    assert!(events.iter().all(|e| e.symbol() == "HOT"));

    // Second identical cycle is fully suppressed.
    assert!(rules.evaluate(&movers, &mut state, 2_000).is_empty());
    assert!(state.watchlist.contains("HOT"));
}

#[test]
fn gain_sequence_alerts_on_first_and_increase_only() {
    let rules = RuleSet::scan(&RuleThresholds::default(), RealertPolicy::StrictIncrease);
    let mut state = AlertState::new();

    let gains: usize = [5.0, 5.0, 7.5]
        .into_iter()
        .map(|pct| {
            let payload = json!([{"symbol": "ABC", "changePercent": pct}]);
            rules
                .evaluate(&normalize_movers(&payload), &mut state, 0)
                .iter()
                .filter(|e| e.kind() == RuleKind::GainThreshold)
                .count()
        })
        .sum();

    assert_eq!(gains, 2);
}

#[tokio::test]
async fn history_spike_uses_injected_source() {
    let history_payload = json!({"body": {
        "a": {"date_utc": New_York.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap().timestamp(), "volume": 1_000},
        "b": {"date_utc": New_York.with_ymd_and_hms(2026, 3, 3, 10, 0, 0).unwrap().timestamp(), "volume": 2_500},
        "c": {"date_utc": New_York.with_ymd_and_hms(2026, 3, 3, 11, 0, 0).unwrap().timestamp(), "volume": 1_000}
    }});

    let mut source = MockSource::default();
    source
        .history
        .insert("SPK".into(), normalize_history(&history_payload));

    let rule = HistoryVolumeSpikeRule::new(3.0, New_York);
    let mut state = AlertState::new();

    let symbols = vec!["SPK".to_string(), "MISSING".to_string()];
    let events = rule.evaluate(&symbols, &source, &mut state.dedup).await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        AlertEvent::HistoryVolumeSpike { ratio, .. } => assert_eq!(*ratio, 3.5),
        other => panic!("unexpected {other:?}"),
    }

    assert!(rule.evaluate(&symbols, &source, &mut state.dedup).await.is_empty());
}

#[tokio::test]
async fn watchlist_delta_runs_after_halt() {
    let halted = normalize_movers(&json!([
        {"symbol": "HLT", "marketState": "HALTED", "volume": 50_000}
    ]));

    let rules = RuleSet::scan(&RuleThresholds::default(), RealertPolicy::StrictIncrease);
    let mut state = AlertState::new();
    let now = Utc::now().timestamp_millis() as u64;

    let events = rules.evaluate(&halted, &mut state, now);
    assert_eq!(events.len(), 1);
    assert_eq!(
        state.watchlist.get("HLT").map(|e| e.reason),
        Some(WatchReason::Halted)
    );

    let mut q = MoverRecord::new("HLT");
    q.volume = Some(75_000.0);
    let source = MockSource {
        quotes: vec![q],
        ..Default::default()
    };

    let quotes = source.quotes(&state.watchlist.symbols()).await.unwrap();
    let sales = LargeSaleRule::new(10_000.0).observe(&mut state.watchlist, &quotes, now);

    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].symbol(), "HLT");
}

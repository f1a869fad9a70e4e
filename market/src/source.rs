use async_trait::async_trait;

use crate::types::{HistoryBar, MoverRecord, OptionContract};

/// Read-only market data capability.
///
/// Evaluators that need extra lookups (history, watchlist quotes) receive
/// this as a parameter, so their decision logic can be tested against an
/// in-memory implementation.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Top gainers, sorted by change percent descending.
    async fn movers(&self, limit: usize) -> anyhow::Result<Vec<MoverRecord>>;

    /// Screener list of the day's gainers (carries previous close and
    /// extended-hours fields).
    async fn day_gainers(&self) -> anyhow::Result<Vec<MoverRecord>>;

    async fn unusual_options(&self) -> anyhow::Result<Vec<OptionContract>>;

    async fn quotes(&self, symbols: &[String]) -> anyhow::Result<Vec<MoverRecord>>;

    async fn intraday_history(&self, symbol: &str) -> anyhow::Result<Vec<HistoryBar>>;
}

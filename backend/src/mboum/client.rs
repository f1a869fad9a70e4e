use std::cmp::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use market::normalize::{normalize_history, normalize_movers, normalize_options};
use market::{HistoryBar, MarketDataSource, MoverRecord, OptionContract};

use crate::config::{AuthMode, MboumConfig};
use crate::mboum::errors::MboumError;

pub const MOVERS: &str = "/v1/markets/movers";
pub const SCREENER: &str = "/v1/markets/screener";
pub const UNUSUAL_OPTIONS: &str = "/v1/markets/options/unusual-options-activity";
pub const QUOTES: &str = "/v1/markets/stock/quotes";
pub const HISTORY: &str = "/v1/markets/stock/history";

/// Longest response body kept in an error.
const BODY_EXCERPT: usize = 300;

#[derive(Clone)]
pub struct MboumClient {
    http: Client,
    base_url: String,
    api_key: String,
    auth_mode: AuthMode,
}

impl MboumClient {
    pub fn new(cfg: &MboumConfig) -> Result<Self, MboumError> {
        let http = Client::builder()
            .timeout(cfg.http_timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            auth_mode: cfg.auth_mode,
        })
    }

    /// GETs `endpoint` and returns the decoded body.
    ///
    /// Every response logs its status; non-2xx bodies are logged and
    /// returned as [`MboumError::Status`].
    #[instrument(skip_all, fields(endpoint = %endpoint), level = "debug")]
    pub async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Value, MboumError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut req = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query);

        req = match self.auth_mode {
            AuthMode::Bearer => req.bearer_auth(&self.api_key),
            AuthMode::Query => req.query(&[("apikey", self.api_key.as_str())]),
        };

        let resp = req.send().await?;
        let status = resp.status();
        info!(endpoint = %endpoint, status = status.as_u16(), "mboum response");

        if !status.is_success() {
            let body = excerpt(&resp.text().await.unwrap_or_default(), BODY_EXCERPT);
            error!(
                endpoint = %endpoint,
                status = status.as_u16(),
                body = %body,
                "mboum api error"
            );
            return Err(MboumError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        debug!(endpoint = %endpoint, bytes = bytes.len(), "mboum payload decoded");

        Ok(value)
    }
}

#[async_trait]
impl MarketDataSource for MboumClient {
    async fn movers(&self, limit: usize) -> anyhow::Result<Vec<MoverRecord>> {
        let payload = self
            .get_json(
                MOVERS,
                &[("type", "gainers".to_string()), ("limit", limit.to_string())],
            )
            .await?;

        let mut movers = normalize_movers(&payload);
        if movers.is_empty() {
            warn!("no movers returned");
        }

        sort_by_change_desc(&mut movers);
        movers.truncate(limit);
        Ok(movers)
    }

    async fn day_gainers(&self) -> anyhow::Result<Vec<MoverRecord>> {
        let payload = self
            .get_json(SCREENER, &[("list", "day_gainers".to_string())])
            .await?;
        Ok(normalize_movers(&payload))
    }

    async fn unusual_options(&self) -> anyhow::Result<Vec<OptionContract>> {
        let payload = self.get_json(UNUSUAL_OPTIONS, &[]).await?;
        Ok(normalize_options(&payload))
    }

    async fn quotes(&self, symbols: &[String]) -> anyhow::Result<Vec<MoverRecord>> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let payload = self
            .get_json(QUOTES, &[("ticker", symbols.join(","))])
            .await?;
        Ok(normalize_movers(&payload))
    }

    async fn intraday_history(&self, symbol: &str) -> anyhow::Result<Vec<HistoryBar>> {
        let payload = self
            .get_json(
                HISTORY,
                &[("symbol", symbol.to_string()), ("interval", "5m".to_string())],
            )
            .await?;
        Ok(normalize_history(&payload))
    }
}

/// Largest `change_percent` first; a missing value sorts as 0.
pub fn sort_by_change_desc(movers: &mut [MoverRecord]) {
    movers.sort_by(|a, b| {
        let a = a.change_percent.unwrap_or(0.0);
        let b = b.change_percent.unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
}

fn excerpt(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mover(symbol: &str, pct: Option<f64>) -> MoverRecord {
        let mut m = MoverRecord::new(symbol);
        m.change_percent = pct;
        m
    }

    #[test]
    fn sorts_descending_with_missing_as_zero() {
        let mut movers = vec![
            mover("A", Some(3.0)),
            mover("B", None),
            mover("C", Some(12.5)),
            mover("D", Some(-1.0)),
        ];

        sort_by_change_desc(&mut movers);

        let order: Vec<&str> = movers.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("ééééé", 2), "éé…");
    }
}

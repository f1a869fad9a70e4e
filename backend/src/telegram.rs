//! Telegram Bot API notification sink.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use scheduler::Notifier;

use crate::config::TelegramConfig;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("http error: {0}")]
    Http(reqwest::Error),

    #[error("telegram returned {status}: {description}")]
    Status { status: u16, description: String },

    #[error("telegram rejected the message: {0}")]
    Api(String),
}

impl From<reqwest::Error> for TelegramError {
    /// The request URL carries the bot token; drop it before the error
    /// can reach a log line or a chat message.
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    http: Client,
    /// Includes the bot token; never log it.
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(cfg: &TelegramConfig) -> Result<Self, TelegramError> {
        let http = Client::builder()
            .timeout(cfg.http_timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                cfg.api_url.trim_end_matches('/'),
                cfg.bot_token
            ),
            chat_id: cfg.chat_id.clone(),
        })
    }

    /// Posts one Markdown message.
    pub async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        let resp = self.http.post(&self.endpoint).json(&body).send().await?;
        let status = resp.status();
        let parsed: Option<ApiResponse> = resp.json().await.ok();

        let description = parsed
            .as_ref()
            .and_then(|r| r.description.clone())
            .unwrap_or_default();

        if !status.is_success() {
            return Err(TelegramError::Status {
                status: status.as_u16(),
                description,
            });
        }

        match parsed {
            Some(r) if r.ok => Ok(()),
            _ => Err(TelegramError::Api(description)),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> anyhow::Result<()> {
        match self.send_message(text).await {
            Ok(()) => {
                info!(chars = text.chars().count(), "telegram sent");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "telegram error");
                Err(e.into())
            }
        }
    }
}

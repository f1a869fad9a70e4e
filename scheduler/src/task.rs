//! Capabilities the scheduler drives.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use market::MarketCalendar;

/// A unit of periodic work.
#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    /// Runs once and returns the number of messages delivered.
    async fn run(&self, now: DateTime<Utc>) -> anyhow::Result<usize>;
}

/// Outbound message sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> anyhow::Result<()>;
}

/// Decides whether any task may run at `at`.
pub trait MarketGate: Send + Sync {
    fn is_open(&self, at: DateTime<Utc>) -> bool;
}

impl MarketGate for MarketCalendar {
    fn is_open(&self, at: DateTime<Utc>) -> bool {
        MarketCalendar::is_open(self, at)
    }
}
